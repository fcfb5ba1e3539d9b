//! Request body collection.

use crate::types::BoxError;
use bytes::Bytes;
use hermes_core::ErrorBody;
use http::StatusCode;
use http_body::Body;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::time::Duration;
use thiserror::Error;

/// Default request body limit: 1 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Failure while receiving the request body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The body stream failed before it completed.
    #[error("request body aborted: {source}")]
    Aborted {
        /// The underlying stream error.
        #[source]
        source: BoxError,
    },

    /// The body exceeded the configured limit.
    #[error("Request body too large: limit is {limit} bytes")]
    TooLarge {
        /// The limit in bytes.
        limit: usize,
    },

    /// The body did not arrive in time.
    #[error("Request body timed out")]
    TimedOut,
}

impl BodyError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Aborted { .. } => StatusCode::BAD_REQUEST,
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::TimedOut => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// Returns `true` if the client went away mid-body.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }

    /// Converts this error into a client-facing error body.
    #[must_use]
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody::new(self.to_string(), self.status_code())
    }
}

/// Collects the full body, enforcing the size limit and optional timeout.
pub(crate) async fn collect_body<B>(
    body: B,
    limit: usize,
    timeout: Option<Duration>,
) -> Result<Bytes, BodyError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let collect = Limited::new(body, limit).collect();

    let collected = match timeout {
        Some(duration) => tokio::time::timeout(duration, collect)
            .await
            .map_err(|_| BodyError::TimedOut)?,
        None => collect.await,
    };

    collected.map(|c| c.to_bytes()).map_err(|source| {
        if source.is::<LengthLimitError>() {
            BodyError::TooLarge { limit }
        } else {
            BodyError::Aborted { source }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use http_body::Frame;
    use http_body_util::{Full, StreamBody};
    use std::io;

    #[tokio::test]
    async fn test_collects_full_body() {
        let body = Full::new(Bytes::from_static(b"{\"a\":1}"));
        let bytes = collect_body(body, 64, None).await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_limit_exceeded() {
        let body = Full::new(Bytes::from(vec![b' '; 65]));
        let err = collect_body(body, 64, None).await.unwrap_err();
        assert!(matches!(err, BodyError::TooLarge { limit: 64 }));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "Request body too large: limit is 64 bytes");
    }

    #[tokio::test]
    async fn test_stream_error_is_abort() {
        let frames: Vec<Result<Frame<Bytes>, io::Error>> = vec![
            Ok(Frame::data(Bytes::from_static(b"{\"a\""))),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let body = StreamBody::new(stream::iter(frames));

        let err = collect_body(body, 1024, None).await.unwrap_err();
        assert!(err.is_aborted());
        assert!(err.to_string().contains("reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let body = StreamBody::new(stream::pending::<Result<Frame<Bytes>, io::Error>>());

        let err = collect_body(body, 1024, Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(err, BodyError::TimedOut));
        assert_eq!(
            err.to_error_body(),
            ErrorBody::new("Request body timed out", StatusCode::REQUEST_TIMEOUT)
        );
    }
}
