use thiserror::Error;

/// Error produced when a registered minifier cannot process a response body.
///
/// Minification runs after the downstream response has been fully buffered,
/// so this error surfaces through the response body rather than the service
/// future: the status and headers are already committed by then.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MinifyError {
    /// The body claimed `application/json` but could not be parsed as JSON.
    #[cfg(feature = "json")]
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The body claimed `image/svg+xml` but could not be parsed as XML.
    #[cfg(feature = "svg")]
    #[error("invalid SVG body: {0}")]
    Svg(#[from] quick_xml::Error),

    /// Writing minified output failed.
    #[error("failed to write minified output: {0}")]
    Io(#[from] std::io::Error),
}
