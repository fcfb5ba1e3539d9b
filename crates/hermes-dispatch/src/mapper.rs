//! Response mapping.
//!
//! The [`ResponseMapper`] turns every pipeline outcome into an HTTP
//! response. Decode, extraction and body failures are rendered directly.
//! Handler failures go through a pluggable [`ErrorMapper`].

use crate::binding::ReplyResult;
use crate::body::BodyError;
use crate::encoder::ResponseEncoder;
use crate::types::Response;
use hermes_core::HandlerError;
use hermes_extract::{DecodeError, ExtractionError};
use std::fmt;
use std::sync::Arc;

/// Renders handler failures.
///
/// Closures of the form `Fn(&HandlerError, &ResponseEncoder) -> Response`
/// implement this trait.
pub trait ErrorMapper: Send + Sync + 'static {
    /// Builds the response for a handler failure.
    fn map_error(&self, error: &HandlerError, encoder: &ResponseEncoder) -> Response;
}

impl<F> ErrorMapper for F
where
    F: Fn(&HandlerError, &ResponseEncoder) -> Response + Send + Sync + 'static,
{
    fn map_error(&self, error: &HandlerError, encoder: &ResponseEncoder) -> Response {
        self(error, encoder)
    }
}

/// The default handler error mapping.
///
/// Renders `{"message": ..., "status": ...}` with the error's status. For
/// 5xx errors the message is replaced with a generic one and the cause is
/// logged instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorMapper;

impl ErrorMapper for DefaultErrorMapper {
    fn map_error(&self, error: &HandlerError, encoder: &ResponseEncoder) -> Response {
        if error.is_server_error() {
            match error.cause() {
                Some(cause) => tracing::error!(
                    error = %error,
                    cause = %cause,
                    status = error.status_code().as_u16(),
                    "handler failed"
                ),
                None => tracing::error!(
                    error = %error,
                    status = error.status_code().as_u16(),
                    "handler failed"
                ),
            }
        } else {
            tracing::debug!(
                error = %error,
                status = error.status_code().as_u16(),
                "handler rejected request"
            );
        }
        encoder.error(&error.to_error_body())
    }
}

/// Converts pipeline outcomes into responses.
#[derive(Clone)]
pub struct ResponseMapper {
    encoder: Arc<ResponseEncoder>,
    error_mapper: Arc<dyn ErrorMapper>,
}

impl ResponseMapper {
    /// Creates a mapper with the [`DefaultErrorMapper`].
    #[must_use]
    pub fn new(encoder: Arc<ResponseEncoder>) -> Self {
        Self::with_error_mapper(encoder, Arc::new(DefaultErrorMapper))
    }

    /// Creates a mapper with a custom error mapper.
    #[must_use]
    pub fn with_error_mapper(
        encoder: Arc<ResponseEncoder>,
        error_mapper: Arc<dyn ErrorMapper>,
    ) -> Self {
        Self {
            encoder,
            error_mapper,
        }
    }

    /// Returns the encoder.
    #[must_use]
    pub fn encoder(&self) -> &ResponseEncoder {
        &self.encoder
    }

    /// Renders a decode failure.
    #[must_use]
    pub fn decode_error(&self, error: &DecodeError) -> Response {
        tracing::warn!(error = %error, code = error.error_code(), "request body rejected");
        match error {
            DecodeError::Shape { .. } => self.encoder.shape_error(),
            _ => self.encoder.error(&error.to_error_body()),
        }
    }

    /// Renders an extraction failure.
    #[must_use]
    pub fn extraction_error(&self, error: &ExtractionError) -> Response {
        tracing::warn!(
            error = %error,
            code = error.error_code(),
            parameter = error.parameter(),
            "parameter extraction failed"
        );
        self.encoder.error(&error.to_error_body())
    }

    /// Renders a body collection failure.
    #[must_use]
    pub fn body_error(&self, error: &BodyError) -> Response {
        tracing::warn!(error = %error, "request body not received");
        self.encoder.error(&error.to_error_body())
    }

    /// Renders a handler failure through the error mapper.
    #[must_use]
    pub fn handler_error(&self, error: &HandlerError) -> Response {
        self.error_mapper.map_error(error, &self.encoder)
    }

    /// Renders a settled handler result.
    #[must_use]
    pub fn reply(&self, result: ReplyResult) -> Response {
        match result {
            Ok(reply) => match self.encoder.json(reply.status(), reply.body()) {
                Ok(response) => response,
                Err(e) => self.handler_error(&HandlerError::serialization(e)),
            },
            Err(error) => self.handler_error(&error),
        }
    }
}

impl fmt::Debug for ResponseMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseMapper")
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}
