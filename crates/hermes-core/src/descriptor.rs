//! Parameter descriptors.
//!
//! A [`ParameterDescriptor`] tells the extractor where one handler argument
//! comes from, what shape it must have, and whether it may be omitted.
//! Descriptors are built once when a route is registered and shared
//! read-only by every request on that route.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a parameter value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterLocation {
    /// A top-level field of the JSON body.
    Body,
    /// A request header (case-insensitive name).
    Header,
    /// A query string parameter.
    Query,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Header => write!(f, "header"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// Expected JSON shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Any JSON value is accepted.
    #[default]
    Any,
    /// A JSON string.
    String,
    /// A JSON number that deserializes as `i64` or `u64`. Literals with a
    /// fraction or exponent, and `-0`, parse as floats and are rejected.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any value",
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::Array => "an array",
            Self::Object => "an object",
        };
        f.write_str(name)
    }
}

/// Immutable rule for extracting one handler argument.
///
/// # Example
///
/// ```
/// use hermes_core::{ParameterDescriptor, ParameterLocation, ValueShape};
///
/// let id = ParameterDescriptor::body("id")
///     .shape(ValueShape::Integer)
///     .required(true);
///
/// assert_eq!(id.name(), "id");
/// assert_eq!(id.location(), ParameterLocation::Body);
/// assert!(id.is_required());
/// assert_eq!(id.required_message(), "id body parameter is required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    name: String,
    location: ParameterLocation,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    shape: ValueShape,
}

impl ParameterDescriptor {
    /// Creates an optional descriptor accepting any value.
    #[must_use]
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            required: false,
            shape: ValueShape::Any,
        }
    }

    /// Creates a descriptor for a body field.
    #[must_use]
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Body)
    }

    /// Creates a descriptor for a request header.
    #[must_use]
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Header)
    }

    /// Creates a descriptor for a query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Query)
    }

    /// Sets whether the parameter must be present and non-null.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the expected value shape.
    #[must_use]
    pub fn shape(mut self, shape: ValueShape) -> Self {
        self.shape = shape;
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the value is read from.
    #[must_use]
    pub const fn location(&self) -> ParameterLocation {
        self.location
    }

    /// Returns `true` if the parameter is mandatory.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the expected value shape.
    #[must_use]
    pub const fn value_shape(&self) -> ValueShape {
        self.shape
    }

    /// Returns the client message used when a required value is missing.
    #[must_use]
    pub fn required_message(&self) -> String {
        format!("{} {} parameter is required", self.name, self.location)
    }
}
