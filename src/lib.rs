//! HTTP response minification middleware for Tower.
//!
//! This crate provides a Tower layer that buffers the response produced by
//! the wrapped service, inspects its `Content-Type`, and rewrites the body to
//! a smaller equivalent when the type has a registered minifier. Responses
//! with any other content type are replayed to the client byte-for-byte.
//!
//! # Example
//!
//! ```ignore
//! use http_response_minify::MinifyLayer;
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(MinifyLayer::new())
//!     .service(my_service);
//! ```
//!
//! # Registered minifiers
//!
//! [`MinifyLayer::new`] seeds the registry with exactly three entries:
//! - `text/html` — HTML minification via `minify-html`
//! - `application/json` — whitespace removal via `serde_json`, with numeric
//!   literals and object key order reproduced exactly
//! - `image/svg+xml` — comment and inter-element whitespace removal via
//!   `quick-xml`
//!
//! # Buffering model
//!
//! The full downstream body is accumulated into a pooled buffer before any
//! part of the response is released, for every status code. This means:
//! - If the wrapped service or its body fails, the middleware fails and the
//!   client sees nothing from this layer.
//! - When a minifier runs, `Content-Length` is removed from the recorded
//!   headers; the replacement body reports an exact size hint instead.
//! - A minifier failure surfaces as a body error after status and headers
//!   have been handed to the server, matching ordinary HTTP semantics.

#![deny(missing_docs)]

mod body;
mod config;
mod error;
mod future;
mod layer;
mod minifier;
mod pool;
mod registry;
mod service;

pub use body::MinifyBody;
pub use config::DirectiveError;
pub use error::MinifyError;
pub use future::ResponseFuture;
pub use layer::MinifyLayer;
pub use minifier::Minifier;
pub use pool::{BufferPool, PooledBuffer};
pub use registry::MinifierRegistry;
pub use service::MinifyService;
