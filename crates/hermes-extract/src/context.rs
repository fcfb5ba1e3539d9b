//! Inbound request view.
//!
//! [`InboundRequest`] is what the pipeline holds once the full body has
//! arrived: method, URI, headers and the buffered body. Request
//! preprocessors inspect it and the extractor reads header and query
//! parameters from it.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// A fully received HTTP request.
///
/// # Example
///
/// ```rust
/// use hermes_extract::InboundRequest;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let request = InboundRequest::new(
///     Method::POST,
///     Uri::from_static("/users?dry_run=true"),
///     HeaderMap::new(),
///     Bytes::from_static(br#"{"name": "Alice"}"#),
/// );
///
/// assert_eq!(request.path(), "/users");
/// assert_eq!(request.query_param("dry_run"), Some("true"));
/// ```
#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    query: Vec<(String, String)>,
}

impl InboundRequest {
    /// Creates a new inbound request.
    ///
    /// The query string is decoded once here.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let query = uri
            .query()
            .and_then(|query| serde_urlencoded::from_str(query).ok())
            .unwrap_or_default();

        Self {
            method,
            uri,
            headers,
            body,
            query,
        }
    }

    /// Creates an inbound request from request parts and a collected body.
    #[must_use]
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self::new(parts.method, parts.uri, parts.headers, body)
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the first value of a query parameter, percent-decoded.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value.as_str()))
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of a header as a string.
    ///
    /// Header names are case-insensitive. Values are decoded as UTF-8;
    /// use [`header_bytes`](Self::header_bytes) to tell a value that is
    /// not UTF-8 apart from an absent one.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_bytes(name)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Returns the raw bytes of the first value of a header.
    #[must_use]
    pub fn header_bytes(&self, name: &str) -> Option<&[u8]> {
        self.headers.get(name).map(http::HeaderValue::as_bytes)
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Builder for constructing an [`InboundRequest`], mostly in tests.
#[derive(Debug, Default)]
pub struct InboundRequestBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
}

impl InboundRequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method. Defaults to `POST`.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI. Defaults to `/`.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a single header. Invalid values are skipped.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> InboundRequest {
        InboundRequest::new(
            self.method.unwrap_or(Method::POST),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_request_creation() {
        let request = InboundRequest::new(
            Method::GET,
            Uri::from_static("/users/42?active=true"),
            HeaderMap::new(),
            Bytes::new(),
        );

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/users/42");
        assert_eq!(request.query_string(), Some("active=true"));
    }

    #[test]
    fn test_builder_defaults() {
        let request = InboundRequestBuilder::new().build();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/");
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_header_access_is_case_insensitive() {
        let request = InboundRequestBuilder::new()
            .header("content-type", "application/json")
            .header("x-request-id", "abc-123")
            .build();

        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.header("X-Request-Id"), Some("abc-123"));
        assert_eq!(request.header("missing"), None);
    }

    #[test]
    fn test_header_first_value_wins() {
        let request = InboundRequestBuilder::new()
            .header("x-tag", "first")
            .header("x-tag", "second")
            .build();

        assert_eq!(request.header("x-tag"), Some("first"));
        assert_eq!(request.headers().get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn test_query_param_decoding() {
        let request = InboundRequestBuilder::new()
            .uri(Uri::from_static("/search?q=hello%20world&page=2&page=3"))
            .build();

        assert_eq!(request.query_param("q"), Some("hello world"));
        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.query_param("missing"), None);
    }

    #[test]
    fn test_header_utf8_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-name",
            http::HeaderValue::from_bytes("café".as_bytes()).unwrap(),
        );
        headers.insert("x-latin", http::HeaderValue::from_bytes(b"caf\xe9").unwrap());
        let request =
            InboundRequest::new(Method::POST, Uri::from_static("/"), headers, Bytes::new());

        assert_eq!(request.header("x-name"), Some("café"));
        assert_eq!(request.header("x-latin"), None);
        assert_eq!(request.header_bytes("x-latin"), Some(&b"caf\xe9"[..]));
    }

    #[test]
    fn test_query_param_without_query() {
        let request = InboundRequestBuilder::new().build();
        assert_eq!(request.query_param("q"), None);
    }

    #[test]
    fn test_from_parts() {
        let (parts, ()) = http::Request::builder()
            .method(Method::PUT)
            .uri("/items/1")
            .header("x-api-key", "secret")
            .body(())
            .unwrap()
            .into_parts();

        let request = InboundRequest::from_parts(parts, Bytes::from_static(b"{}"));
        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.header("x-api-key"), Some("secret"));
        assert_eq!(request.body(), &Bytes::from_static(b"{}"));
    }
}
