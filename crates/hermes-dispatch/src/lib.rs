//! # Hermes Dispatch
//!
//! The JSON request-dispatch pipeline.
//!
//! This crate takes a resolved route (a [`HandlerBinding`] plus its
//! parameter descriptors) and runs every request on it through a fixed
//! sequence of stages:
//!
//! ```text
//! Body → Decode → JSON preprocessors → Request preprocessors → Extract
//!                                                                 ↓
//! Response ←──────────── Response mapper ←───────────── Dispatch ←┘
//! ```
//!
//! | Stage | Type | Ends the pipeline with |
//! |-------|------|------------------------|
//! | Body collection | [`JsonRequestHandler`] | 413, 408, or [`BodyError::Aborted`] |
//! | Decode | [`Decoder`](hermes_extract::Decoder) | 400 parse / shape / unknown field |
//! | Preprocessors | [`PreprocessorChain`] | the stage's own response |
//! | Extract | [`ParameterExtractor`](hermes_extract::ParameterExtractor) | 400 missing / format mismatch |
//! | Dispatch | [`Dispatcher`] | handler failure via [`ErrorMapper`] |
//! | Map | [`ResponseMapper`] | the encoded reply |
//!
//! ## Key Features
//!
//! - **Stable messages**: every client error has a fixed, documented text
//! - **Sync and async handlers**: chosen once, when the binding is created
//! - **Panic isolation**: a panicking handler produces a 500, never a crash
//! - **Shared configuration**: one handler serves all concurrent requests
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use hermes_core::{HandlerError, ParameterDescriptor, ValueShape};
//! use hermes_dispatch::{HandlerBinding, Invocation, JsonRequestHandler, Preprocessed};
//! use hermes_dispatch::{Response, ResponseExt};
//! use http::{HeaderMap, StatusCode};
//! use http_body_util::Full;
//!
//! struct Users;
//!
//! # tokio_test::block_on(async {
//! let binding = HandlerBinding::asynchronous(Users, |call: Invocation<Users>| async move {
//!     let name: String = call.arguments.required_as("name")?;
//!     Ok::<_, HandlerError>(serde_json::json!({ "created": name }))
//! });
//!
//! let handler = JsonRequestHandler::builder(
//!     binding,
//!     vec![ParameterDescriptor::body("name").shape(ValueShape::String).required(true)],
//! )
//! .request_preprocessor(|headers: &HeaderMap, _: &hermes_extract::InboundRequest| {
//!     if headers.contains_key("authorization") {
//!         Preprocessed::Continue
//!     } else {
//!         Preprocessed::Halt(Response::text(StatusCode::UNAUTHORIZED, "unauthorized"))
//!     }
//! })
//! .build()
//! .unwrap();
//!
//! let request = http::Request::post("/users")
//!     .body(Full::new(Bytes::from_static(br#"{"name": "Alice"}"#)))
//!     .unwrap();
//! let response = handler.handle(request).await.unwrap();
//! assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod binding;
pub mod body;
pub mod dispatcher;
pub mod encoder;
pub mod handler;
pub mod mapper;
pub mod preprocess;
pub mod types;

// Re-export main types at crate root
pub use binding::{
    HandlerBinding, HandlerMode, HandlerReturn, IntoReply, Invocation, Reply, ReplyResult,
};
pub use body::{BodyError, DEFAULT_MAX_BODY_BYTES};
pub use dispatcher::Dispatcher;
pub use encoder::{EncodeError, EncoderConfig, ResponseEncoder};
pub use handler::{JsonRequestHandler, JsonRequestHandlerBuilder, PipelineSettings};
pub use mapper::{DefaultErrorMapper, ErrorMapper, ResponseMapper};
pub use preprocess::{BoxedPreprocessor, Preprocessed, PreprocessorChain, RequestPreprocessor};
pub use types::{BoxError, BoxFuture, Response, ResponseExt, APPLICATION_JSON};
