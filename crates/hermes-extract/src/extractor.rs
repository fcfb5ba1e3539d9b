//! Parameter extraction.
//!
//! The [`ParameterExtractor`] walks a route's descriptors in declared order
//! and builds the [`Arguments`] handed to the handler.

use crate::shape::{conform, conform_bytes, conform_text};
use crate::{Argument, Arguments, ExtractionError, InboundRequest, JsonObject};
use hermes_core::{ParameterDescriptor, ParameterLocation};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Extracts handler arguments for one route.
///
/// The descriptor list is shared and immutable, so a single extractor
/// serves every concurrent request on its route.
///
/// # Example
///
/// ```rust
/// use hermes_core::{ParameterDescriptor, ValueShape};
/// use hermes_extract::{Decoder, InboundRequestBuilder, ParameterExtractor};
/// use serde_json::json;
///
/// let extractor = ParameterExtractor::new(vec![
///     ParameterDescriptor::body("a").shape(ValueShape::Integer).required(true),
///     ParameterDescriptor::header("x-tenant"),
/// ]);
///
/// let request = InboundRequestBuilder::new().header("x-tenant", "acme").build();
/// let body = Decoder::new().decode(br#"{"a": 1}"#).unwrap();
///
/// let args = extractor.extract(&body, &request).unwrap();
/// assert_eq!(args.values(), [&json!(1), &json!("acme")]);
/// ```
#[derive(Debug, Clone)]
pub struct ParameterExtractor {
    descriptors: Arc<[ParameterDescriptor]>,
}

impl ParameterExtractor {
    /// Creates an extractor for the given descriptors.
    #[must_use]
    pub fn new(descriptors: impl Into<Arc<[ParameterDescriptor]>>) -> Self {
        Self {
            descriptors: descriptors.into(),
        }
    }

    /// Returns the descriptors in declared order.
    #[must_use]
    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    /// Returns the names of all body parameters.
    ///
    /// This is the known-field set for a strict decoder.
    #[must_use]
    pub fn body_fields(&self) -> BTreeSet<String> {
        self.descriptors
            .iter()
            .filter(|d| d.location() == ParameterLocation::Body)
            .map(|d| d.name().to_string())
            .collect()
    }

    /// Extracts one slot per descriptor, in declared order.
    ///
    /// Extraction stops at the first failing descriptor.
    ///
    /// # Errors
    ///
    /// - [`ExtractionError::Missing`] if a required value is absent or `null`
    /// - [`ExtractionError::Schema`] if a present value has the wrong shape
    pub fn extract(
        &self,
        body: &JsonObject,
        request: &InboundRequest,
    ) -> Result<Arguments, ExtractionError> {
        let mut arguments = Arguments::with_capacity(self.descriptors.len());

        for descriptor in self.descriptors.iter() {
            let value = extract_one(descriptor, body, request)?;
            arguments.push(Argument::new(
                descriptor.name(),
                descriptor.location(),
                value,
            ));
        }

        Ok(arguments)
    }
}

fn extract_one(
    descriptor: &ParameterDescriptor,
    body: &JsonObject,
    request: &InboundRequest,
) -> Result<Value, ExtractionError> {
    let name = descriptor.name();
    let shape = descriptor.value_shape();

    let conformed = match descriptor.location() {
        ParameterLocation::Body => match body.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(conform(shape, value.clone())),
        },
        ParameterLocation::Header => request
            .header_bytes(name)
            .map(|bytes| conform_bytes(shape, bytes)),
        ParameterLocation::Query => request
            .query_param(name)
            .map(|text| conform_text(shape, text)),
    };

    match conformed {
        Some(Ok(value)) => Ok(value),
        Some(Err(diagnostic)) => Err(ExtractionError::format_mismatch(name, diagnostic)),
        None if descriptor.is_required() => {
            Err(ExtractionError::missing(name, descriptor.location()))
        }
        None => Ok(Value::Null),
    }
}
