//! Error types shared across the dispatch pipeline.
//!
//! This module provides:
//!
//! - [`ErrorBody`] - the `{"message": ..., "status": ...}` shape every client
//!   error is rendered as
//! - [`HandlerError`] - the opaque failure a handler raises, which the
//!   pipeline hands to an error mapper instead of resolving itself
//!
//! Decode and extraction failures live next to the code that detects them
//! (see `hermes-extract`); they never leave the pipeline and are rendered
//! straight into an [`ErrorBody`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`HandlerError`].
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Message returned to clients in place of any 5xx handler failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Client-facing error body.
///
/// Field order is significant: it serializes as
/// `{"message":"...","status":400}`.
///
/// # Example
///
/// ```
/// use hermes_core::ErrorBody;
/// use http::StatusCode;
///
/// let body = ErrorBody::new("Body must be an json object.", StatusCode::BAD_REQUEST);
/// let json = serde_json::to_string(&body).unwrap();
/// assert_eq!(json, r#"{"message":"Body must be an json object.","status":400}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code, repeated in the body.
    pub status: u16,
}

impl ErrorBody {
    /// Creates an error body for the given status.
    #[must_use]
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16(),
        }
    }

    /// Returns the status as a [`StatusCode`].
    ///
    /// Falls back to 500 if the stored code is not a valid status.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Failure raised while running a handler.
///
/// `HandlerError` is opaque to the pipeline: it carries a
/// message, the status the handler wants, and optionally the underlying
/// cause. The pipeline never inspects it beyond passing it to the
/// configured error mapper.
///
/// # Example
///
/// ```
/// use hermes_core::HandlerError;
/// use http::StatusCode;
///
/// fn find_user(id: i64) -> Result<String, HandlerError> {
///     if id < 0 {
///         return Err(HandlerError::bad_request("id must be positive"));
///     }
///     Err(HandlerError::not_found(format!("user {id} not found")))
/// }
///
/// let err = find_user(7).unwrap_err();
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    status: StatusCode,
    kind: HandlerErrorKind,
    #[source]
    source: Option<anyhow::Error>,
}

/// What produced a [`HandlerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerErrorKind {
    /// The handler returned an error value.
    Failed,
    /// The handler panicked while running.
    Panicked,
    /// The handler's return value could not be serialized.
    Serialization,
}

impl HandlerError {
    /// Creates an error with an explicit status.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            kind: HandlerErrorKind::Failed,
            source: None,
        }
    }

    /// Creates a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Creates a 500 error wrapping an underlying cause.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::internal(message).with_source(source)
    }

    /// Creates an error describing a handler panic.
    ///
    /// The panic payload is rendered when it is a string, which covers
    /// `panic!("...")` and `panic!("{}", ..)`.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self {
            message: format!("handler panicked: {detail}"),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: HandlerErrorKind::Panicked,
            source: None,
        }
    }

    /// Creates an error for a handler result that failed to serialize.
    #[must_use]
    pub fn serialization(source: serde_json::Error) -> Self {
        Self {
            message: format!("failed to serialize handler result: {source}"),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: HandlerErrorKind::Serialization,
            source: Some(source.into()),
        }
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Returns what produced this error.
    #[must_use]
    pub const fn kind(&self) -> HandlerErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the underlying cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    /// Returns `true` if this maps to a 5xx status.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Renders the client-facing body.
    ///
    /// Server errors are masked with [`INTERNAL_ERROR_MESSAGE`] so that
    /// internal details never reach the client.
    #[must_use]
    pub fn to_error_body(&self) -> ErrorBody {
        if self.is_server_error() {
            ErrorBody::new(INTERNAL_ERROR_MESSAGE, self.status)
        } else {
            ErrorBody::new(self.message.clone(), self.status)
        }
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: HandlerErrorKind::Failed,
            source: Some(err),
        }
    }
}
