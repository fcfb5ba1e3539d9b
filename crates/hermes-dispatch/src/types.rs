//! Common types used throughout the dispatch pipeline.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;

/// The HTTP response type produced by the pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Boxed error type accepted from request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Content type of every JSON response.
pub const APPLICATION_JSON: &str = "application/json";

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a response with a pre-rendered JSON body.
    fn json(status: StatusCode, body: Bytes) -> Response;

    /// Creates a plain-text response.
    fn text(status: StatusCode, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn json(status: StatusCode, body: Bytes) -> Response {
        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        response
    }

    fn text(status: StatusCode, message: &str) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::from(message.to_string())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}
