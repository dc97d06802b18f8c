use crate::config::{self, DirectiveError};
use crate::pool::BufferPool;
use crate::registry::MinifierRegistry;
use crate::service::MinifyService;
use std::sync::Arc;
use tower::Layer;

/// A Tower layer that minifies HTTP response bodies.
///
/// All services produced by one layer share a single read-only
/// [`MinifierRegistry`] and a single [`BufferPool`].
#[derive(Debug, Clone)]
pub struct MinifyLayer {
    registry: Arc<MinifierRegistry>,
    pool: Arc<BufferPool>,
}

impl MinifyLayer {
    /// Creates a layer with the standard registry (`text/html`,
    /// `application/json`, `image/svg+xml`).
    pub fn new() -> Self {
        Self::with_registry(MinifierRegistry::standard())
    }

    /// Creates a layer with a custom registry.
    ///
    /// The registry is frozen here: it is shared read-only by every service
    /// this layer produces.
    pub fn with_registry(registry: MinifierRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            pool: Arc::new(BufferPool::new()),
        }
    }

    /// Creates a layer from a configuration directive line.
    ///
    /// The directive is the bare token `minify`; it takes no arguments, and
    /// any argument is rejected here, at configuration time.
    pub fn from_directive(input: &str) -> Result<Self, DirectiveError> {
        config::parse_directive(input)?;
        Ok(Self::new())
    }
}

impl Default for MinifyLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for MinifyLayer {
    type Service = MinifyService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MinifyService::from_shared(inner, Arc::clone(&self.registry), Arc::clone(&self.pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_directive_accepts_bare_minify() {
        assert!(MinifyLayer::from_directive("minify").is_ok());
    }

    #[test]
    fn test_from_directive_rejects_argument() {
        let err = MinifyLayer::from_directive("minify extra").unwrap_err();
        assert_eq!(
            err,
            DirectiveError::UnexpectedArgument("extra".to_string())
        );
    }
}
