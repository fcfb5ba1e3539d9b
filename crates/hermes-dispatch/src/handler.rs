//! The JSON request handler.
//!
//! [`JsonRequestHandler`] runs the whole pipeline for one route:
//!
//! ```text
//! Body → Decoder → JSON preprocessors → Request preprocessors
//!      → Extractor → Dispatcher → Response mapper
//! ```
//!
//! Any stage may end the pipeline with a response. The handler is cheap to
//! clone and every clone shares the same immutable configuration, so one
//! handler serves all concurrent requests on its route.

use crate::binding::HandlerBinding;
use crate::body::{collect_body, BodyError, DEFAULT_MAX_BODY_BYTES};
use crate::dispatcher::Dispatcher;
use crate::encoder::{EncodeError, EncoderConfig, ResponseEncoder};
use crate::mapper::{ErrorMapper, ResponseMapper};
use crate::preprocess::{Preprocessed, PreprocessorChain, RequestPreprocessor};
use crate::types::{BoxError, Response};
use hermes_core::{ParameterDescriptor, RequestContext, REQUEST_ID_HEADER};
use hermes_extract::{Decoder, InboundRequest, JsonObject, ParameterExtractor};
use http::header::HeaderValue;
use http::Request;
use http_body::Body;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Runtime settings for a [`JsonRequestHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Response encoder settings.
    pub encoder: EncoderConfig,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
    /// How long to wait for the full body. `None` waits forever.
    pub body_timeout: Option<Duration>,
    /// Reject top-level body fields that no body parameter declares.
    pub deny_unknown_fields: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            encoder: EncoderConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            body_timeout: None,
            deny_unknown_fields: false,
        }
    }
}

/// Runs the JSON dispatch pipeline for one route.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use hermes_core::{HandlerError, ParameterDescriptor, ValueShape};
/// use hermes_dispatch::{HandlerBinding, Invocation, JsonRequestHandler};
/// use http_body_util::{BodyExt, Full};
///
/// struct Calculator;
///
/// # tokio_test::block_on(async {
/// let binding = HandlerBinding::sync(Calculator, |call: Invocation<Calculator>| {
///     let a: i64 = call.arguments.required_as("a")?;
///     let b: i64 = call.arguments.required_as("b")?;
///     Ok::<_, HandlerError>(a + b)
/// });
///
/// let handler = JsonRequestHandler::builder(
///     binding,
///     vec![
///         ParameterDescriptor::body("a").shape(ValueShape::Integer).required(true),
///         ParameterDescriptor::body("b").shape(ValueShape::Integer).required(true),
///     ],
/// )
/// .build()
/// .unwrap();
///
/// let request = http::Request::post("/add")
///     .body(Full::new(Bytes::from_static(br#"{"a": 2, "b": 3}"#)))
///     .unwrap();
///
/// let response = handler.handle(request).await.unwrap();
/// let body = response.into_body().collect().await.unwrap().to_bytes();
/// assert_eq!(&body[..], b"5");
/// # });
/// ```
pub struct JsonRequestHandler<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    route: Option<String>,
    decoder: Decoder,
    json_preprocessors: PreprocessorChain<JsonObject>,
    request_preprocessors: PreprocessorChain<InboundRequest>,
    extractor: ParameterExtractor,
    dispatcher: Dispatcher<S>,
    mapper: ResponseMapper,
    max_body_bytes: usize,
    body_timeout: Option<Duration>,
}

impl<S> JsonRequestHandler<S>
where
    S: Send + Sync + 'static,
{
    /// Starts building a handler for a resolved route.
    #[must_use]
    pub fn builder(
        binding: HandlerBinding<S>,
        descriptors: impl Into<Arc<[ParameterDescriptor]>>,
    ) -> JsonRequestHandlerBuilder<S> {
        JsonRequestHandlerBuilder::new(binding, descriptors)
    }

    /// Handles one request.
    ///
    /// Returns the response to send for every outcome of the pipeline,
    /// including client errors.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::Aborted`] if the body stream fails before it
    /// completes. No pipeline stage runs in that case and there is nothing
    /// to send.
    pub async fn handle<B>(&self, request: Request<B>) -> Result<Response, BodyError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = request.into_parts();

        let mut context = RequestContext::from_headers(&parts.headers);
        if let Some(route) = &self.inner.route {
            context = context.with_route(route.clone());
        }

        let span = tracing::info_span!(
            "json_request",
            request_id = %context.request_id(),
            http.method = %parts.method,
            http.path = %parts.uri.path(),
        );

        async move {
            let inner = &self.inner;

            let body = match collect_body(body, inner.max_body_bytes, inner.body_timeout).await {
                Ok(body) => body,
                Err(error) if error.is_aborted() => {
                    tracing::warn!(error = %error, "request body aborted");
                    return Err(error);
                }
                Err(error) => {
                    let response = inner.mapper.body_error(&error);
                    return Ok(finish(response, &context));
                }
            };

            let request = InboundRequest::from_parts(parts, body);
            let response = inner.process(&request).await;
            Ok(finish(response, &context))
        }
        .instrument(span)
        .await
    }
}

impl<S> JsonRequestHandler<S> {
    /// Returns the route name, if one was set.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.inner.route.as_deref()
    }

    /// Returns the parameter descriptors in declared order.
    #[must_use]
    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        self.inner.extractor.descriptors()
    }
}

impl<S> Inner<S>
where
    S: Send + Sync + 'static,
{
    async fn process(&self, request: &InboundRequest) -> Response {
        let object = match self.decoder.decode(request.body()) {
            Ok(object) => object,
            Err(error) => return self.mapper.decode_error(&error),
        };

        if let Preprocessed::Halt(response) =
            self.json_preprocessors.run(request.headers(), &object)
        {
            return response;
        }

        if let Preprocessed::Halt(response) =
            self.request_preprocessors.run(request.headers(), request)
        {
            return response;
        }

        let arguments = match self.extractor.extract(&object, request) {
            Ok(arguments) => arguments,
            Err(error) => return self.mapper.extraction_error(&error),
        };

        tracing::debug!(
            arguments = arguments.len(),
            mode = %self.dispatcher.mode(),
            "dispatching to handler"
        );

        let result = self.dispatcher.dispatch(arguments).await;
        self.mapper.reply(result)
    }
}

fn finish(mut response: Response, context: &RequestContext) -> Response {
    if let Ok(value) = HeaderValue::from_str(&context.request_id().to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status().as_u16();
    let duration_ms = context.elapsed().as_millis() as u64;
    if status >= 500 {
        tracing::error!(http.status_code = status, duration_ms, "request failed");
    } else {
        tracing::info!(http.status_code = status, duration_ms, "request completed");
    }
    response
}

impl<S> Clone for JsonRequestHandler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for JsonRequestHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRequestHandler")
            .field("route", &self.inner.route)
            .field("descriptors", &self.inner.extractor.descriptors().len())
            .field("json_preprocessors", &self.inner.json_preprocessors.len())
            .field(
                "request_preprocessors",
                &self.inner.request_preprocessors.len(),
            )
            .field("max_body_bytes", &self.inner.max_body_bytes)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`JsonRequestHandler`].
pub struct JsonRequestHandlerBuilder<S> {
    binding: HandlerBinding<S>,
    descriptors: Arc<[ParameterDescriptor]>,
    route: Option<String>,
    settings: PipelineSettings,
    encoder: Option<Arc<ResponseEncoder>>,
    error_mapper: Option<Arc<dyn ErrorMapper>>,
    json_preprocessors: PreprocessorChain<JsonObject>,
    request_preprocessors: PreprocessorChain<InboundRequest>,
}

impl<S> JsonRequestHandlerBuilder<S>
where
    S: Send + Sync + 'static,
{
    /// Creates a builder for a resolved route.
    #[must_use]
    pub fn new(
        binding: HandlerBinding<S>,
        descriptors: impl Into<Arc<[ParameterDescriptor]>>,
    ) -> Self {
        Self {
            binding,
            descriptors: descriptors.into(),
            route: None,
            settings: PipelineSettings::default(),
            encoder: None,
            error_mapper: None,
            json_preprocessors: PreprocessorChain::new("json"),
            request_preprocessors: PreprocessorChain::new("request"),
        }
    }

    /// Names the route, for logs and the request context.
    #[must_use]
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Replaces all runtime settings.
    #[must_use]
    pub fn settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the body size limit in bytes.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.settings.max_body_bytes = limit;
        self
    }

    /// Sets how long to wait for the full body.
    #[must_use]
    pub fn body_timeout(mut self, timeout: Duration) -> Self {
        self.settings.body_timeout = Some(timeout);
        self
    }

    /// Rejects body fields no body parameter declares.
    #[must_use]
    pub fn deny_unknown_fields(mut self, deny: bool) -> Self {
        self.settings.deny_unknown_fields = deny;
        self
    }

    /// Uses a shared, already built encoder.
    ///
    /// When set, the encoder settings in [`PipelineSettings`] are ignored.
    #[must_use]
    pub fn encoder(mut self, encoder: Arc<ResponseEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Sets the handler error mapper.
    #[must_use]
    pub fn error_mapper<M: ErrorMapper>(mut self, mapper: M) -> Self {
        self.error_mapper = Some(Arc::new(mapper));
        self
    }

    /// Appends a preprocessor over the decoded body.
    #[must_use]
    pub fn json_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: RequestPreprocessor<JsonObject>,
    {
        self.json_preprocessors.push(preprocessor);
        self
    }

    /// Appends a preprocessor over the request.
    #[must_use]
    pub fn request_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: RequestPreprocessor<InboundRequest>,
    {
        self.request_preprocessors.push(preprocessor);
        self
    }

    /// Builds the handler.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if a new encoder has to be built and its
    /// fixed bodies cannot be rendered.
    pub fn build(self) -> Result<JsonRequestHandler<S>, EncodeError> {
        let encoder = match self.encoder {
            Some(encoder) => encoder,
            None => Arc::new(ResponseEncoder::new(&self.settings.encoder)?),
        };

        let mapper = match self.error_mapper {
            Some(error_mapper) => ResponseMapper::with_error_mapper(encoder, error_mapper),
            None => ResponseMapper::new(encoder),
        };

        let extractor = ParameterExtractor::new(self.descriptors);
        let decoder = if self.settings.deny_unknown_fields {
            Decoder::strict(extractor.body_fields())
        } else {
            Decoder::new()
        };

        tracing::debug!(
            route = self.route.as_deref().unwrap_or("<unnamed>"),
            parameters = extractor.descriptors().len(),
            mode = %self.binding.mode(),
            strict = decoder.is_strict(),
            "json request handler built"
        );

        Ok(JsonRequestHandler {
            inner: Arc::new(Inner {
                route: self.route,
                decoder,
                json_preprocessors: self.json_preprocessors,
                request_preprocessors: self.request_preprocessors,
                extractor,
                dispatcher: Dispatcher::new(self.binding),
                mapper,
                max_body_bytes: self.settings.max_body_bytes,
                body_timeout: self.settings.body_timeout,
            }),
        })
    }
}

impl<S> fmt::Debug for JsonRequestHandlerBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRequestHandlerBuilder")
            .field("route", &self.route)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Invocation;
    use bytes::Bytes;
    use hermes_core::{HandlerError, ValueShape};
    use http::StatusCode;
    use http_body_util::{BodyExt, Full};
    use serde_json::{json, Value};

    struct Echo;

    fn echo_handler(settings: PipelineSettings) -> JsonRequestHandler<Echo> {
        let binding = HandlerBinding::sync(Echo, |call: Invocation<Echo>| {
            Ok::<_, HandlerError>(call.arguments.get("a").cloned().unwrap_or(Value::Null))
        });
        JsonRequestHandler::builder(
            binding,
            vec![ParameterDescriptor::body("a").shape(ValueShape::Integer)],
        )
        .route("echo")
        .settings(settings)
        .build()
        .unwrap()
    }

    fn post(body: &'static str) -> Request<Full<Bytes>> {
        Request::post("/echo")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_sets_request_id() {
        let handler = echo_handler(PipelineSettings::default());
        let response = handler.handle(post(r#"{"a": 4}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(body_json(response).await, json!(4));
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let handler = echo_handler(PipelineSettings::default());
        let id = hermes_core::RequestId::new().to_string();
        let request = Request::post("/echo")
            .header(REQUEST_ID_HEADER, id.as_str())
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();

        let response = handler.handle(request).await.unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], id.as_str());
    }

    #[tokio::test]
    async fn test_strict_rejects_unknown_field() {
        let settings = PipelineSettings {
            deny_unknown_fields: true,
            ..PipelineSettings::default()
        };
        let handler = echo_handler(settings);
        let response = handler.handle(post(r#"{"a": 1, "b": 2}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Unrecognized field: b", "status": 400})
        );
    }

    #[tokio::test]
    async fn test_lenient_ignores_unknown_field() {
        let handler = echo_handler(PipelineSettings::default());
        let response = handler.handle(post(r#"{"a": 1, "b": 2}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pretty_output() {
        let settings = PipelineSettings {
            encoder: EncoderConfig::pretty(),
            ..PipelineSettings::default()
        };
        let handler = echo_handler(settings);
        let response = handler.handle(post("[]")).await.unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("\n  \"message\""));
    }

    #[test]
    fn test_accessors() {
        let handler = echo_handler(PipelineSettings::default());
        assert_eq!(handler.route(), Some("echo"));
        assert_eq!(handler.descriptors().len(), 1);

        let clone = handler.clone();
        assert!(format!("{clone:?}").contains("JsonRequestHandler"));
    }
}
