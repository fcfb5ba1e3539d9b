//! Decode and extraction error types.
//!
//! Every error here is a client error. Its `Display` output is the exact
//! message written to the client, so these strings are part of the wire
//! contract and must not change.

use hermes_core::{ErrorBody, ParameterLocation};
use http::StatusCode;
use thiserror::Error;

/// Message used when the body is valid JSON but not an object.
pub const SHAPE_ERROR_MESSAGE: &str = "Body must be an json object.";

/// Failure turning the raw body into a JSON object.
///
/// # Example
///
/// ```rust
/// use hermes_extract::{Decoder, DecodeError};
///
/// let err = Decoder::new().decode(b"[1, 2]").unwrap_err();
/// assert!(matches!(err, DecodeError::Shape { found: "array" }));
/// assert_eq!(err.to_string(), "Body must be an json object.");
/// ```
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not syntactically valid JSON.
    #[error("Couldn't parse json: {source} ")]
    Parse {
        /// The parser diagnostic.
        #[source]
        source: serde_json::Error,
    },

    /// The body is valid JSON but its top level is not an object.
    #[error("Body must be an json object.")]
    Shape {
        /// Kind of the top-level value that was found instead.
        found: &'static str,
    },

    /// The object does not match the route's field schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DecodeError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Returns a stable, machine-readable code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Shape { .. } => "SHAPE_ERROR",
            Self::Schema(schema) => schema.error_code(),
        }
    }

    /// Renders the client-facing body.
    #[must_use]
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody::new(self.to_string(), self.status_code())
    }
}

/// Object does not match the expected field schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The body carries a field the route does not declare.
    #[error("Unrecognized field: {field}")]
    UnknownField {
        /// The offending field name.
        field: String,
    },

    /// A value has the wrong type or format.
    #[error("Field value couldn't validated: {diagnostic} ")]
    FormatMismatch {
        /// The parameter whose value was rejected.
        field: String,
        /// The validation diagnostic.
        diagnostic: String,
    },
}

impl SchemaError {
    /// Returns the field this error is about.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::UnknownField { field } | Self::FormatMismatch { field, .. } => field,
        }
    }

    /// Returns a stable, machine-readable code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownField { .. } => "UNKNOWN_FIELD",
            Self::FormatMismatch { .. } => "FORMAT_MISMATCH",
        }
    }
}

/// Failure extracting a handler parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// A required parameter is absent or JSON `null`.
    #[error("{name} {location} parameter is required")]
    Missing {
        /// The parameter name.
        name: String,
        /// Where the parameter was looked up.
        location: ParameterLocation,
    },

    /// A present value does not have the expected shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ExtractionError {
    /// Creates an error for a missing required parameter.
    #[must_use]
    pub fn missing(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self::Missing {
            name: name.into(),
            location,
        }
    }

    /// Creates an error for a value of the wrong shape.
    #[must_use]
    pub fn format_mismatch(field: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self::Schema(SchemaError::FormatMismatch {
            field: field.into(),
            diagnostic: diagnostic.into(),
        })
    }

    /// Returns the parameter this error is about.
    #[must_use]
    pub fn parameter(&self) -> &str {
        match self {
            Self::Missing { name, .. } => name,
            Self::Schema(schema) => schema.field(),
        }
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Returns a stable, machine-readable code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "MISSING_PARAMETER",
            Self::Schema(schema) => schema.error_code(),
        }
    }

    /// Renders the client-facing body.
    #[must_use]
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody::new(self.to_string(), self.status_code())
    }
}
