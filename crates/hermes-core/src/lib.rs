//! # Hermes Core
//!
//! Core types for the Hermes JSON request-dispatch pipeline.
//!
//! This crate provides the vocabulary shared by the other Hermes crates:
//!
//! - [`ParameterDescriptor`] - Where and how one handler argument is extracted
//! - [`HandlerError`] - Opaque failure raised by a handler
//! - [`ErrorBody`] - The `{message, status}` body of every client error
//! - [`RequestContext`] - Per-request bookkeeping (request ID, route, timing)

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod descriptor;
mod error;

pub use context::{RequestContext, RequestId, REQUEST_ID_HEADER};
pub use descriptor::{ParameterDescriptor, ParameterLocation, ValueShape};
pub use error::{ErrorBody, HandlerError, HandlerErrorKind, HandlerResult, INTERNAL_ERROR_MESSAGE};
