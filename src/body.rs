use crate::error::MinifyError;
use bytes::Bytes;
use http::HeaderMap;
use http_body::{Body, Frame, SizeHint};
use std::pin::Pin;
use std::task::{Context, Poll};

/// The finalized response body produced by the minification middleware.
///
/// By the time this body exists the downstream response has been fully
/// buffered and the minify-or-replay decision has been made, so the body is
/// either a complete in-memory payload (with an exact size hint and any
/// trailers the downstream body produced) or a deferred minification
/// failure that errors on first poll.
#[derive(Debug)]
pub struct MinifyBody {
    state: BodyState,
}

#[derive(Debug)]
enum BodyState {
    Full {
        data: Option<Bytes>,
        trailers: Option<HeaderMap>,
    },
    Failed {
        error: Option<MinifyError>,
    },
}

impl MinifyBody {
    /// Creates a body that yields `data` followed by optional trailers.
    pub(crate) fn full(data: Bytes, trailers: Option<HeaderMap>) -> Self {
        Self {
            state: BodyState::Full {
                data: (!data.is_empty()).then_some(data),
                trailers,
            },
        }
    }

    /// Creates a body that fails on first poll.
    ///
    /// Used when a minifier rejects the buffered input: the response's
    /// status and headers are already on their way to the client, so the
    /// failure can only surface through the body.
    pub(crate) fn failed(error: MinifyError) -> Self {
        Self {
            state: BodyState::Failed { error: Some(error) },
        }
    }
}

impl Body for MinifyBody {
    type Data = Bytes;
    type Error = MinifyError;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match &mut this.state {
            BodyState::Full { data, trailers } => {
                if let Some(data) = data.take() {
                    return Poll::Ready(Some(Ok(Frame::data(data))));
                }
                if let Some(trailers) = trailers.take() {
                    return Poll::Ready(Some(Ok(Frame::trailers(trailers))));
                }
                Poll::Ready(None)
            }
            BodyState::Failed { error } => match error.take() {
                Some(error) => Poll::Ready(Some(Err(error))),
                None => Poll::Ready(None),
            },
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.state {
            BodyState::Full { data, trailers } => data.is_none() && trailers.is_none(),
            BodyState::Failed { error } => error.is_none(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.state {
            BodyState::Full { data, .. } => {
                SizeHint::with_exact(data.as_ref().map_or(0, |d| d.len()) as u64)
            }
            BodyState::Failed { .. } => SizeHint::default(),
        }
    }
}
