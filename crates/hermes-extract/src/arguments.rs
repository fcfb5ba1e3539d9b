//! Extracted handler arguments.

use hermes_core::{HandlerError, ParameterLocation};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One extracted argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    name: String,
    location: ParameterLocation,
    value: Value,
}

impl Argument {
    /// Creates an argument.
    #[must_use]
    pub fn new(name: impl Into<String>, location: ParameterLocation, value: Value) -> Self {
        Self {
            name: name.into(),
            location,
            value,
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the value came from.
    #[must_use]
    pub const fn location(&self) -> ParameterLocation {
        self.location
    }

    /// Returns the value. Absent optional parameters hold `Value::Null`.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Ordered handler arguments, one slot per parameter descriptor.
///
/// Slots are in descriptor order. Values can be read by position, by
/// name, or deserialized into a typed value.
///
/// # Example
///
/// ```rust
/// use hermes_core::ParameterLocation;
/// use hermes_extract::{Argument, Arguments};
/// use serde_json::json;
///
/// let args = Arguments::from(vec![
///     Argument::new("id", ParameterLocation::Body, json!(7)),
///     Argument::new("note", ParameterLocation::Body, json!(null)),
/// ]);
///
/// let id: i64 = args.required_as("id").unwrap();
/// assert_eq!(id, 7);
/// let note: Option<String> = args.get_as("note").unwrap();
/// assert_eq!(note, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    slots: Vec<Argument>,
}

impl Arguments {
    /// Creates an empty argument list with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Appends a slot.
    pub fn push(&mut self, argument: Argument) {
        self.slots.push(argument);
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the value of the first slot named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| &slot.value)
    }

    /// Returns the value at position `index`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).map(|slot| &slot.value)
    }

    /// Iterates over the slots in descriptor order.
    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.slots.iter()
    }

    /// Returns the values in descriptor order.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        self.slots.iter().map(|slot| &slot.value).collect()
    }

    /// Deserializes an optional argument.
    ///
    /// Returns `Ok(None)` when the slot is missing or `null`.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`HandlerError`] if the value cannot be deserialized
    /// into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, HandlerError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value).map(Some).map_err(|e| {
                HandlerError::bad_request(format!("invalid value for '{name}': {e}"))
            }),
        }
    }

    /// Deserializes a required argument.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`HandlerError`] if the slot is missing, `null`, or
    /// cannot be deserialized into `T`.
    pub fn required_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, HandlerError> {
        self.get_as(name)?
            .ok_or_else(|| HandlerError::bad_request(format!("missing argument '{name}'")))
    }
}

impl From<Vec<Argument>> for Arguments {
    fn from(slots: Vec<Argument>) -> Self {
        Self { slots }
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
