//! JSON response encoding.
//!
//! The [`ResponseEncoder`] renders every body the pipeline writes. It is
//! built once at startup; the body for a non-object request is rendered
//! there and reused for every occurrence.

use crate::types::{Response, ResponseExt};
use bytes::Bytes;
use hermes_core::ErrorBody;
use hermes_extract::SHAPE_ERROR_MESSAGE;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Fallback body used if an error body itself cannot be rendered.
const FALLBACK_ERROR_BODY: &[u8] = br#"{"message":"Internal server error","status":500}"#;

/// Encoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Pretty-print response bodies instead of minifying them.
    pub pretty: bool,
}

impl EncoderConfig {
    /// Minified output.
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    /// Pretty-printed output.
    #[must_use]
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Failure rendering a fixed response body at startup.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A pre-rendered body could not be serialized.
    #[error("failed to render {what} response: {source}")]
    Render {
        /// Which body was being rendered.
        what: &'static str,
        /// The serializer error.
        #[source]
        source: serde_json::Error,
    },
}

/// Renders JSON response bodies.
///
/// # Example
///
/// ```rust
/// use hermes_dispatch::{EncoderConfig, ResponseEncoder};
/// use http::StatusCode;
///
/// let encoder = ResponseEncoder::new(&EncoderConfig::default())?;
/// let response = encoder.shape_error();
/// assert_eq!(response.status(), StatusCode::BAD_REQUEST);
/// # Ok::<(), hermes_dispatch::EncodeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResponseEncoder {
    pretty: bool,
    shape_error: Bytes,
}

impl ResponseEncoder {
    /// Creates an encoder and renders the fixed response bodies.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Render`] if a fixed body cannot be rendered.
    /// Callers should treat this as a startup failure.
    pub fn new(config: &EncoderConfig) -> Result<Self, EncodeError> {
        let shape = ErrorBody::new(SHAPE_ERROR_MESSAGE, StatusCode::BAD_REQUEST);
        let shape_error = render(config.pretty, &shape).map_err(|source| EncodeError::Render {
            what: "shape error",
            source,
        })?;

        Ok(Self {
            pretty: config.pretty,
            shape_error,
        })
    }

    /// Returns `true` if bodies are pretty-printed.
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Serializes `value` with the configured formatting.
    pub fn to_bytes<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, serde_json::Error> {
        render(self.pretty, value)
    }

    /// Builds a JSON response carrying `value`.
    pub fn json<T: Serialize + ?Sized>(
        &self,
        status: StatusCode,
        value: &T,
    ) -> Result<Response, serde_json::Error> {
        Ok(Response::json(status, self.to_bytes(value)?))
    }

    /// Builds an error response from an [`ErrorBody`].
    #[must_use]
    pub fn error(&self, body: &ErrorBody) -> Response {
        match self.to_bytes(body) {
            Ok(bytes) => Response::json(body.status_code(), bytes),
            Err(e) => {
                tracing::error!(error = %e, "failed to render error body");
                Response::json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Bytes::from_static(FALLBACK_ERROR_BODY),
                )
            }
        }
    }

    /// Returns the pre-rendered response for a non-object body.
    #[must_use]
    pub fn shape_error(&self) -> Response {
        Response::json(StatusCode::BAD_REQUEST, self.shape_error.clone())
    }
}

fn render<T: Serialize + ?Sized>(pretty: bool, value: &T) -> Result<Bytes, serde_json::Error> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    Ok(Bytes::from(bytes))
}
