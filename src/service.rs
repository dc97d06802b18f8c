use crate::body::MinifyBody;
use crate::future::ResponseFuture;
use crate::pool::BufferPool;
use crate::registry::MinifierRegistry;
use http::{Request, Response};
use http_body::Body;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{BoxError, Service};

/// A Tower service that minifies HTTP response bodies.
///
/// Responses from the inner service are fully buffered, then either minified
/// (when the registry has an entry for the response's content type) or
/// replayed unchanged.
#[derive(Debug, Clone)]
pub struct MinifyService<S> {
    inner: S,
    registry: Arc<MinifierRegistry>,
    pool: Arc<BufferPool>,
}

impl<S> MinifyService<S> {
    /// Creates a new minification service wrapping the given inner service.
    pub fn new(inner: S, registry: MinifierRegistry) -> Self {
        Self::from_shared(inner, Arc::new(registry), Arc::new(BufferPool::new()))
    }

    /// Creates a service sharing a registry and buffer pool with its
    /// siblings, as handed out by [`crate::MinifyLayer`].
    pub(crate) fn from_shared(
        inner: S,
        registry: Arc<MinifierRegistry>,
        pool: Arc<BufferPool>,
    ) -> Self {
        Self {
            inner,
            registry,
            pool,
        }
    }

    /// Returns a reference to the inner service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner service.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes this service, returning the inner service.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MinifyService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Error: Into<BoxError>,
    ResBody: Body,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<MinifyBody>;
    type Error = BoxError;
    type Future = ResponseFuture<S::Future, ResBody>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        ResponseFuture::new(
            self.inner.call(req),
            Arc::clone(&self.registry),
            Arc::clone(&self.pool),
        )
    }
}
