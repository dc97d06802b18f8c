use bytes::Bytes;
use http::{Request, Response, StatusCode, header};
use http_body::Frame;
use http_body_util::{BodyExt, Full};
use http_response_minify::{MinifyBody, MinifyLayer};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{BoxError, Layer, ServiceExt}; // for `oneshot`

/// Runs one request through the middleware against a service that returns
/// the given response.
async fn send<B>(response: Response<B>) -> Result<Response<MinifyBody>, BoxError>
where
    B: http_body::Body + Send + 'static,
    B::Error: Into<BoxError>,
{
    send_through(&MinifyLayer::new(), response).await
}

async fn send_through<B>(
    layer: &MinifyLayer,
    response: Response<B>,
) -> Result<Response<MinifyBody>, BoxError>
where
    B: http_body::Body + Send + 'static,
    B::Error: Into<BoxError>,
{
    let mut response = Some(response);
    let service = layer.layer(tower::service_fn(move |_req: Request<Full<Bytes>>| {
        let response = response.take().expect("service called once");
        async move { Ok::<_, BoxError>(response) }
    }));

    service
        .oneshot(Request::builder().body(Full::new(Bytes::new())).unwrap())
        .await
}

fn make_response(content_type: &str, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// A body that yields its frames one poll at a time, like a streaming
/// upstream would.
struct ChunkedBody {
    frames: VecDeque<Result<Frame<Bytes>, BoxError>>,
}

impl ChunkedBody {
    fn new(chunks: &[&'static str]) -> Self {
        Self {
            frames: chunks
                .iter()
                .map(|chunk| Ok(Frame::data(Bytes::from(*chunk))))
                .collect(),
        }
    }

    fn failing() -> Self {
        Self {
            frames: VecDeque::from([Err(BoxError::from("upstream body failed"))]),
        }
    }
}

impl http_body::Body for ChunkedBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.frames.pop_front())
    }
}

#[tokio::test]
async fn test_passthrough_is_byte_identical() {
    let response = Response::builder()
        .status(StatusCode::CREATED)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CONTENT_LENGTH, 9)
        .header("x-request-id", "req-42")
        .body(Full::new(Bytes::from("  hello  ")))
        .unwrap();

    let response = send(response).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "9");
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from("  hello  "));
}

#[tokio::test]
async fn test_missing_content_type_passes_through() {
    let response = Response::builder()
        .body(Full::new(Bytes::from("raw")))
        .unwrap();

    let response = send(response).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from("raw"));
}

#[tokio::test]
async fn test_malformed_content_type_passes_through() {
    let response = send(make_response("definitely not a media type", "body"))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from("body"));
}

#[tokio::test]
#[cfg(feature = "json")]
async fn test_json_is_minified_and_content_length_removed() {
    let response = send(make_response("application/json", "{\"a\":  1.50}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from("{\"a\":1.50}"));
}

#[tokio::test]
#[cfg(feature = "json")]
async fn test_json_with_charset_is_minified() {
    let response = send(make_response(
        "application/json; charset=utf-8",
        "[ 1 ,  2 ]",
    ))
    .await
    .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from("[1,2]"));
}

#[tokio::test]
#[cfg(feature = "json")]
async fn test_chunked_body_is_buffered_before_minifying() {
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .body(ChunkedBody::new(&["{\"a\": ", " 1.50", "}"]))
        .unwrap();

    let response = send(response).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from("{\"a\":1.50}"));
}

#[tokio::test]
#[cfg(feature = "html")]
async fn test_html_is_minified() {
    let input = "<html>\n  <body>\n    <p>Hello   world</p>\n  </body>\n</html>";
    let response = send(make_response("text/html", input)).await.unwrap();

    assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.len() < input.len());
    assert!(std::str::from_utf8(&body).unwrap().contains("Hello"));
}

#[tokio::test]
#[cfg(feature = "svg")]
async fn test_svg_is_minified() {
    let response = send(make_response(
        "image/svg+xml",
        "<svg>\n  <rect x=\"1\"/>\n</svg>",
    ))
    .await
    .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from("<svg><rect x=\"1\"/></svg>"));
}

#[tokio::test]
async fn test_downstream_error_short_circuits() {
    let layer = MinifyLayer::new();
    let service = layer.layer(tower::service_fn(|_req: Request<Full<Bytes>>| async {
        Err::<Response<Full<Bytes>>, BoxError>(BoxError::from("handler failed"))
    }));

    let result = service
        .oneshot(Request::builder().body(Full::new(Bytes::new())).unwrap())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_body_error_during_buffering_short_circuits() {
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/plain")
        .body(ChunkedBody::failing())
        .unwrap();

    // No response at all: the failure happened before anything was
    // committed to the client.
    assert!(send(response).await.is_err());
}

#[tokio::test]
#[cfg(feature = "json")]
async fn test_minify_failure_surfaces_through_body() {
    let response = send(make_response("application/json", "not json"))
        .await
        .unwrap();

    // Status and headers are intact; collecting the body fails.
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.into_body().collect().await.is_err());
}

#[tokio::test]
#[cfg(feature = "json")]
async fn test_sequential_requests_do_not_cross_contaminate() {
    let layer = MinifyLayer::new();

    let first = send_through(
        &layer,
        make_response("application/json", "{\"long\": \"payload with plenty of bytes\"}"),
    )
    .await
    .unwrap();
    let first_body = first.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        first_body,
        Bytes::from("{\"long\":\"payload with plenty of bytes\"}")
    );

    // The second request reuses the pooled buffer from the first.
    let second = send_through(&layer, make_response("text/plain", "ok")).await.unwrap();
    let second_body = second.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(second_body, Bytes::from("ok"));
}

#[tokio::test]
#[cfg(feature = "json")]
async fn test_no_content_response_with_json_type_passes_through() {
    let response = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = send(response).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_layer_from_directive_serves_traffic() {
    let layer = MinifyLayer::from_directive("minify").unwrap();
    let response = send_through(&layer, make_response("text/plain", "unchanged"))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from("unchanged"));
}
