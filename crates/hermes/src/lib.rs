//! # Hermes
//!
//! **JSON request-dispatch pipeline**
//!
//! Hermes turns an HTTP request with a JSON object body into a typed call
//! on a service handler, and the handler's result back into a JSON
//! response:
//!
//! ```text
//! Body → Decoder → JSON preprocessors → Request preprocessors
//!      → Extractor → Dispatcher → Response mapper
//! ```
//!
//! Routing, transport and handler discovery live outside Hermes. The caller
//! resolves a route to a [`HandlerBinding`](dispatch::HandlerBinding) and a
//! list of [`ParameterDescriptor`](core::ParameterDescriptor)s, builds one
//! [`JsonRequestHandler`](dispatch::JsonRequestHandler) per route, and
//! feeds it requests.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hermes::prelude::*;
//!
//! struct Greeter;
//!
//! let config = ConfigLoader::new()
//!     .with_optional_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//! init_logging(&config.logging.to_log_config())?;
//!
//! let binding = HandlerBinding::sync(Greeter, |call: Invocation<Greeter>| {
//!     let name: String = call.arguments.required_as("name")?;
//!     Ok::<_, HandlerError>(format!("hello, {name}"))
//! });
//!
//! let handler = JsonRequestHandler::builder(
//!     binding,
//!     vec![ParameterDescriptor::body("name").shape(ValueShape::String).required(true)],
//! )
//! .route("/greet")
//! .settings(config.dispatch.pipeline_settings())
//! .build()?;
//!
//! let response = handler.handle(request).await?;
//! ```
//!
//! ## Crates
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | [`core`] | Parameter descriptors, handler errors, request context |
//! | [`extract`] | JSON decoding and parameter extraction |
//! | [`dispatch`] | Preprocessors, handler dispatch, response mapping |
//! | [`telemetry`] | Structured logging |
//! | [`config`] | Layered configuration |

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use hermes_core as core;

// Re-export decoding and extraction
pub use hermes_extract as extract;

// Re-export the pipeline
pub use hermes_dispatch as dispatch;

// Re-export logging
pub use hermes_telemetry as telemetry;

// Re-export configuration
pub use hermes_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use hermes_core::{
        ErrorBody, HandlerError, HandlerResult, ParameterDescriptor, ParameterLocation,
        RequestContext, RequestId, ValueShape,
    };

    pub use hermes_extract::{Arguments, InboundRequest, JsonObject};

    pub use hermes_dispatch::{
        BodyError, HandlerBinding, Invocation, JsonRequestHandler, PipelineSettings, Preprocessed,
        Reply, Response, ResponseExt,
    };

    pub use hermes_telemetry::{init_logging, LogConfig, LogFormat};

    pub use hermes_config::{ConfigLoader, HermesConfig};
}
