//! JSON body decoder.
//!
//! The [`Decoder`] turns the raw request body into a [`JsonObject`]. It is
//! the first stage of the pipeline and the only place where the body bytes
//! are looked at.

use crate::shape::kind_of;
use crate::{DecodeError, SchemaError};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A decoded request body. The top level is always an object.
pub type JsonObject = serde_json::Map<String, Value>;

/// Decodes request bodies into JSON objects.
///
/// A lenient decoder (the default) accepts any object. A strict decoder
/// also rejects objects carrying top-level fields outside its known set;
/// keys are checked in document order and the first unknown one is
/// reported.
///
/// # Example
///
/// ```rust
/// use hermes_extract::{Decoder, DecodeError, SchemaError};
///
/// let decoder = Decoder::new();
/// let object = decoder.decode(br#"{"a": 1}"#).unwrap();
/// assert_eq!(object["a"], 1);
///
/// let strict = Decoder::strict(["a"]);
/// let err = strict.decode(br#"{"a": 1, "b": 2}"#).unwrap_err();
/// assert!(matches!(
///     err,
///     DecodeError::Schema(SchemaError::UnknownField { ref field }) if field == "b"
/// ));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    known_fields: Option<Arc<BTreeSet<String>>>,
}

impl Decoder {
    /// Creates a lenient decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder that rejects fields outside `fields`.
    #[must_use]
    pub fn strict<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_fields: Some(Arc::new(fields.into_iter().map(Into::into).collect())),
        }
    }

    /// Returns `true` if unknown fields are rejected.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.known_fields.is_some()
    }

    /// Decodes `body` into a JSON object.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Parse`] if the body is not valid JSON (an empty
    ///   body included)
    /// - [`DecodeError::Shape`] if the top-level value is not an object
    /// - [`DecodeError::Schema`] if the decoder is strict and the object has
    ///   an undeclared field
    pub fn decode(&self, body: &[u8]) -> Result<JsonObject, DecodeError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|source| DecodeError::Parse { source })?;

        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(DecodeError::Shape {
                    found: kind_of(&other),
                })
            }
        };

        if let Some(known) = &self.known_fields {
            if let Some(field) = object.keys().find(|key| !known.contains(*key)) {
                return Err(SchemaError::UnknownField {
                    field: field.clone(),
                }
                .into());
            }
        }

        Ok(object)
    }
}
