//! # Hermes Extract
//!
//! JSON body decoding and parameter extraction for Hermes.
//!
//! The first half of the request pipeline lives here:
//!
//! | Stage | Type | Output |
//! |-------|------|--------|
//! | Decode | [`Decoder`] | [`JsonObject`] or [`DecodeError`] |
//! | Extract | [`ParameterExtractor`] | [`Arguments`] or [`ExtractionError`] |
//!
//! Body parameters are read from the decoded object. Header and query
//! parameters are read from the [`InboundRequest`] and parsed from their
//! string form into the declared [`ValueShape`](hermes_core::ValueShape).
//!
//! ## Example
//!
//! ```rust
//! use hermes_core::{ParameterDescriptor, ValueShape};
//! use hermes_extract::{Decoder, InboundRequestBuilder, ParameterExtractor};
//!
//! let extractor = ParameterExtractor::new(vec![
//!     ParameterDescriptor::body("name").shape(ValueShape::String).required(true),
//!     ParameterDescriptor::query("notify").shape(ValueShape::Boolean),
//! ]);
//! let decoder = Decoder::strict(extractor.body_fields());
//!
//! let request = InboundRequestBuilder::new()
//!     .uri("/users?notify=true".parse().unwrap())
//!     .body(r#"{"name": "Alice"}"#)
//!     .build();
//!
//! let body = decoder.decode(request.body()).unwrap();
//! let args = extractor.extract(&body, &request).unwrap();
//!
//! let name: String = args.required_as("name").unwrap();
//! let notify: Option<bool> = args.get_as("notify").unwrap();
//! assert_eq!(name, "Alice");
//! assert_eq!(notify, Some(true));
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arguments;
mod context;
mod decode;
mod error;
mod extractor;
pub mod shape;

pub use arguments::{Argument, Arguments};
pub use context::{InboundRequest, InboundRequestBuilder};
pub use decode::{Decoder, JsonObject};
pub use error::{DecodeError, ExtractionError, SchemaError, SHAPE_ERROR_MESSAGE};
pub use extractor::ParameterExtractor;
