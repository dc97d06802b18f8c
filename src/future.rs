use crate::body::MinifyBody;
use crate::pool::{BufferPool, PooledBuffer};
use crate::registry::MinifierRegistry;
use bytes::{Buf, Bytes};
use http::response::Parts;
use http::{HeaderMap, Response, header};
use http_body::Body;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use tower::BoxError;

pin_project! {
    /// Future for minification service responses.
    ///
    /// Drives the wrapped service's future, then buffers the entire response
    /// body into a pooled buffer before resolving. Nothing reaches the
    /// client until the minify-or-replay decision has been made, so the
    /// status and headers are committed at most once and only after the full
    /// body has been observed.
    pub struct ResponseFuture<F, B> {
        #[pin]
        state: State<F, B>,
        registry: Arc<MinifierRegistry>,
        pool: Arc<BufferPool>,
    }
}

pin_project! {
    #[project = StateProj]
    enum State<F, B> {
        // Waiting for the wrapped service to produce a response.
        Upstream {
            #[pin]
            future: F,
        },
        // Draining the response body into the checked-out buffer. The
        // buffer guard lives inside `Recorded`, so it is released on every
        // exit path, including errors and a dropped (cancelled) future.
        Buffering {
            #[pin]
            body: B,
            recorded: Option<Recorded>,
        },
    }
}

/// The downstream response as captured before anything is sent: status and
/// headers in `parts`, body bytes accumulating in `buffer`.
struct Recorded {
    parts: Parts,
    buffer: PooledBuffer,
    trailers: Option<HeaderMap>,
}

impl<F, B> ResponseFuture<F, B> {
    pub(crate) fn new(future: F, registry: Arc<MinifierRegistry>, pool: Arc<BufferPool>) -> Self {
        Self {
            state: State::Upstream { future },
            registry,
            pool,
        }
    }
}

impl<F, B, E> Future for ResponseFuture<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
    E: Into<BoxError>,
    B: Body,
    B::Error: Into<BoxError>,
{
    type Output = Result<Response<MinifyBody>, BoxError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let mut this = self.as_mut().project();
            let next = match this.state.as_mut().project() {
                StateProj::Upstream { future } => {
                    let response = match ready!(future.poll(cx)) {
                        Ok(response) => response,
                        Err(e) => return Poll::Ready(Err(e.into())),
                    };
                    let (parts, body) = response.into_parts();
                    let recorded = Recorded {
                        parts,
                        buffer: this.pool.checkout(),
                        trailers: None,
                    };
                    State::Buffering {
                        body,
                        recorded: Some(recorded),
                    }
                }
                StateProj::Buffering { mut body, recorded } => loop {
                    match ready!(body.as_mut().poll_frame(cx)) {
                        Some(Ok(frame)) => {
                            let recorded = recorded
                                .as_mut()
                                .expect("ResponseFuture polled after completion");
                            match frame.into_data() {
                                Ok(mut data) => {
                                    while data.has_remaining() {
                                        let chunk = data.chunk();
                                        recorded.buffer.extend_from_slice(chunk);
                                        let advanced = chunk.len();
                                        data.advance(advanced);
                                    }
                                }
                                Err(frame) => {
                                    if let Ok(trailers) = frame.into_trailers() {
                                        recorded.trailers = Some(trailers);
                                    }
                                }
                            }
                        }
                        // A failing downstream body aborts the exchange
                        // before any client-visible write.
                        Some(Err(e)) => return Poll::Ready(Err(e.into())),
                        None => {
                            let recorded = recorded
                                .take()
                                .expect("ResponseFuture polled after completion");
                            return Poll::Ready(Ok(finalize(recorded, this.registry)));
                        }
                    }
                },
            };
            this.state.set(next);
        }
    }
}

/// Turns the recorded response into the final one: replay it verbatim, or
/// run the matched minifier over the buffered bytes.
fn finalize(recorded: Recorded, registry: &MinifierRegistry) -> Response<MinifyBody> {
    let Recorded {
        mut parts,
        buffer,
        trailers,
    } = recorded;

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_owned();

    // An empty buffered body (204/304/HEAD shapes) has nothing to minify,
    // even when the content type matches.
    let matched = if buffer.is_empty() {
        None
    } else {
        registry.lookup(&content_type)
    };
    let Some((minifier, media_type)) = matched else {
        tracing::trace!(content_type, "no minifier matched, replaying response");
        let body = MinifyBody::full(Bytes::copy_from_slice(&buffer), trailers);
        return Response::from_parts(parts, body);
    };

    let mut output = Vec::with_capacity(buffer.len());
    match minifier.minify(&buffer, &mut output, &media_type) {
        Ok(()) => {
            // The recorded Content-Length describes the original body and
            // must not be replayed; the new body carries an exact size hint.
            parts.headers.remove(header::CONTENT_LENGTH);
            tracing::debug!(
                content_type,
                original_len = buffer.len(),
                minified_len = output.len(),
                "minified response body"
            );
            Response::from_parts(parts, MinifyBody::full(Bytes::from(output), trailers))
        }
        Err(error) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            tracing::debug!(content_type, %error, "minifier rejected response body");
            Response::from_parts(parts, MinifyBody::failed(error))
        }
    }
}
