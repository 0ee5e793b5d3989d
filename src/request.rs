//! Request builder and URL resolution
//!
//! A builder accumulates method, path elements, query, headers, body, and
//! deadline/timeout, then resolves them into a transport request exactly
//! once. Builder cores are pooled; building (or dropping) a builder
//! returns its core. Using a builder after it was built is a programming
//! error and panics.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::Request;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH,
    CONTENT_TYPE,
};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::codec::{Body, BodyCodec};
use crate::error::{Error, Result};
use crate::multipart::MultipartWriter;
use crate::pool::{Pool, Reuse};
use crate::values::Values;

static BUILDER_POOL: Pool<BuilderCore> = Pool::new();

#[derive(Default)]
pub(crate) struct BuilderCore {
    pub(crate) method: Method,
    pub(crate) base_url: Option<String>,
    pub(crate) path_elements: Vec<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) query: Values,
    pub(crate) timeout: Option<Duration>,
    pub(crate) deadline: Option<Instant>,
    pub(crate) body: Option<Body>,
    pub(crate) body_err: Option<serde_json::Error>,
}

impl Reuse for BuilderCore {
    fn reset(&mut self) {
        self.method = Method::GET;
        self.base_url = None;
        self.path_elements.clear();
        self.headers.clear();
        self.query.clear();
        self.timeout = None;
        self.deadline = None;
        self.body = None;
        self.body_err = None;
    }
}

/// One-shot accumulator of request parameters.
///
/// Construct with a method constructor, chain configuration, then hand to
/// a [`crate::Client`]. The client consumes the builder; its pooled core
/// is recycled whether the build succeeds or fails.
pub struct RequestBuilder {
    core: Option<BuilderCore>,
}

impl RequestBuilder {
    fn with_method(method: Method) -> Self {
        let mut core = BUILDER_POOL.acquire();
        core.method = method;
        RequestBuilder { core: Some(core) }
    }

    pub fn get() -> Self {
        Self::with_method(Method::GET)
    }

    pub fn head() -> Self {
        Self::with_method(Method::HEAD)
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn put() -> Self {
        Self::with_method(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::with_method(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn connect() -> Self {
        Self::with_method(Method::CONNECT)
    }

    pub fn options() -> Self {
        Self::with_method(Method::OPTIONS)
    }

    pub fn trace() -> Self {
        Self::with_method(Method::TRACE)
    }

    /// Bound the whole call by a timeout. Overrides the client default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.core_mut().timeout = Some(timeout);
        self
    }

    /// Bound the whole call by an absolute deadline. Combines with
    /// `timeout`: the tighter of the two applies.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.core_mut().deadline = Some(deadline);
        self
    }

    /// Replace the whole header set.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.core_mut().headers = headers;
        self
    }

    /// Set a header, replacing any previous values for the key. Invalid
    /// names or values are skipped with a warning.
    pub fn set_header(mut self, key: &str, value: &str) -> Self {
        insert_header(&mut self.core_mut().headers, key, value, true);
        self
    }

    /// Append a header value, keeping previous values for the key.
    pub fn add_header(mut self, key: &str, value: &str) -> Self {
        insert_header(&mut self.core_mut().headers, key, value, false);
        self
    }

    /// Set the `Authorization` header to HTTP basic credentials.
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let value = basic_authorization(username, password);
        self.set_header("Authorization", &value)
    }

    /// Replace the whole query multimap.
    pub fn query(mut self, query: Values) -> Self {
        self.core_mut().query = query;
        self
    }

    /// Set a query key, replacing any previous values.
    pub fn set_query(mut self, key: &str, value: &str) -> Self {
        self.core_mut().query.set(key, value);
        self
    }

    /// Append a query value, keeping previous values for the key.
    pub fn add_query(mut self, key: &str, value: &str) -> Self {
        self.core_mut().query.add(key, value);
        self
    }

    /// Replace the path elements. Elements are trimmed of surrounding
    /// whitespace; empty elements are discarded. See the URL resolution
    /// rules on [`crate::Client`].
    pub fn path<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let core = self.core_mut();
        core.path_elements.clear();
        for element in elements {
            let trimmed = element.as_ref().trim();
            if !trimmed.is_empty() {
                core.path_elements.push(trimmed.to_string());
            }
        }
        self
    }

    /// Attach a body value, captured as JSON. `None`-like and null values
    /// are valid present bodies; the codec decides how to encode them.
    pub fn body<T: Serialize>(mut self, body: T) -> Self {
        let core = self.core_mut();
        match serde_json::to_value(body) {
            Ok(value) => {
                core.body = Some(Body::Json(value));
                core.body_err = None;
            }
            Err(err) => {
                core.body = None;
                core.body_err = Some(err);
            }
        }
        self
    }

    /// Attach a form-urlencoded body.
    pub fn form(mut self, form: Values) -> Self {
        let core = self.core_mut();
        core.body = Some(Body::Form(form));
        core.body_err = None;
        self
    }

    /// Attach a multipart/form-data body.
    pub fn multipart(mut self, writer: MultipartWriter) -> Self {
        let core = self.core_mut();
        core.body = Some(Body::Multipart(writer));
        core.body_err = None;
        self
    }

    /// Resolve the builder into a transport request, consuming the core.
    ///
    /// Panics if the builder was already built.
    pub(crate) fn build(&mut self, codec: &mut dyn BodyCodec) -> Result<Request> {
        let mut core = self.core.take().expect("RequestBuilder is not reusable");
        let result = build_request(&mut core, codec);
        BUILDER_POOL.release(core);
        result
    }

    pub(crate) fn core_mut(&mut self) -> &mut BuilderCore {
        self.core.as_mut().expect("RequestBuilder is not reusable")
    }
}

impl Drop for RequestBuilder {
    fn drop(&mut self) {
        if let Some(core) = self.core.take() {
            BUILDER_POOL.release(core);
        }
    }
}

fn build_request(core: &mut BuilderCore, codec: &mut dyn BodyCodec) -> Result<Request> {
    let url = resolve_url(core)?;
    let payload = materialize_body(core, codec)?;
    let timeout = resolve_timeout(core.deadline, core.timeout);

    let mut request = Request::new(core.method.clone(), url);
    *request.timeout_mut() = timeout;
    *request.headers_mut() = core.headers.clone();
    if let Some(bytes) = payload {
        *request.body_mut() = Some(bytes.into());
    }
    Ok(request)
}

/// Resolve the target URL from (base URL presence, path-element count):
///
/// - no base, no elements: error;
/// - no base, one element: the element is the URL;
/// - no base, more: the first element is the URL root, the rest join as
///   path segments;
/// - base, no elements: the base is the URL;
/// - base with elements: an absolute first element replaces the base,
///   otherwise all elements join under the base.
///
/// Explicit query parameters then override the URL's own query at key
/// level.
fn resolve_url(core: &mut BuilderCore) -> Result<Url> {
    let base = core.base_url.as_deref().filter(|base| !base.is_empty());
    let elements = core.path_elements.as_slice();

    let mut url = match (base, elements.len()) {
        (None, 0) => return Err(Error::EmptyUrl),
        (None, 1) => join_path(&elements[0], &[])?,
        (None, _) => join_path(&elements[0], &elements[1..])?,
        (Some(base), 0) => join_path(base, &[])?,
        (Some(base), _) => match Url::parse(&elements[0]) {
            Ok(_) => join_path(&elements[0], &elements[1..])?,
            Err(url::ParseError::RelativeUrlWithoutBase) => join_path(base, elements)?,
            Err(err) => return Err(Error::build("url", err)),
        },
    };

    if !core.query.is_empty() {
        let mut merged = Values::parse(url.query().unwrap_or(""));
        for (key, values) in core.query.iter() {
            merged.set_all(key, values.to_vec());
        }
        let encoded = merged.encode();
        url.set_query(if encoded.is_empty() { None } else { Some(&encoded) });
    }

    Ok(url)
}

/// Join `elements` as path segments under `base`, with filesystem-style
/// cleaning. A query string embedded in the joined segments becomes the
/// URL's query instead of part of the path.
fn join_path(base: &str, elements: &[String]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|err| Error::build("url", err))?;
    if elements.is_empty() {
        return Ok(url);
    }
    if url.cannot_be_a_base() {
        return Err(Error::build(
            "url",
            anyhow::anyhow!("cannot join path elements onto {url}"),
        ));
    }

    let joined = clean_path(&elements.join("/"));
    let (path_part, query_part) = match joined.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (joined, None),
    };
    append_path(&mut url, &path_part);
    url.set_query(query_part.as_deref());
    Ok(url)
}

fn append_path(url: &mut Url, relative: &str) {
    if relative.is_empty() || relative == "." {
        return;
    }
    let mut merged = clean_path(&format!("{}/{}", url.path(), relative));
    if !merged.starts_with('/') {
        merged.insert(0, '/');
    }
    url.set_path(&merged);
}

/// Lexically clean a slash-separated path: collapse repeated separators,
/// drop `.` elements, resolve `..` against preceding elements.
fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    let mut cleaned = segments.join("/");
    if rooted {
        cleaned.insert(0, '/');
    }
    if cleaned.is_empty() {
        ".".to_string()
    } else {
        cleaned
    }
}

fn materialize_body(core: &mut BuilderCore, codec: &mut dyn BodyCodec) -> Result<Option<Vec<u8>>> {
    if let Some(err) = core.body_err.take() {
        return Err(Error::build("body", err));
    }
    let payload = match core.body.take() {
        Some(body) => match codec.encode(body) {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(err @ Error::UnsupportedBody { .. }) => return Err(err),
            Err(err) => return Err(Error::build("body", err)),
        },
        None => None,
    };

    // Header contributions apply whether or not a body was present.
    if let Some(length) = codec.content_length() {
        insert_typed_header(&mut core.headers, CONTENT_LENGTH, &length.to_string());
    }
    if let Some(value) = codec.content_type() {
        insert_typed_header(&mut core.headers, CONTENT_TYPE, &value);
    }
    if let Some(value) = codec.content_encoding() {
        insert_typed_header(&mut core.headers, CONTENT_ENCODING, &value);
    }
    if let Some(value) = codec.accept() {
        insert_typed_header(&mut core.headers, ACCEPT, &value);
    }
    if let Some(value) = codec.accept_encoding() {
        insert_typed_header(&mut core.headers, ACCEPT_ENCODING, &value);
    }

    Ok(payload)
}

/// The tighter of the explicit timeout and the time remaining until the
/// deadline; `None` only when neither bound is set.
fn resolve_timeout(deadline: Option<Instant>, timeout: Option<Duration>) -> Option<Duration> {
    match (deadline, timeout) {
        (None, None) => None,
        (None, Some(timeout)) => Some(timeout),
        (Some(deadline), None) => Some(deadline.saturating_duration_since(Instant::now())),
        (Some(deadline), Some(timeout)) => {
            Some(timeout.min(deadline.saturating_duration_since(Instant::now())))
        }
    }
}

pub(crate) fn insert_header(headers: &mut HeaderMap, key: &str, value: &str, replace: bool) {
    let name = match HeaderName::from_bytes(key.as_bytes()) {
        Ok(name) => name,
        Err(_) => {
            tracing::warn!(key = %key, "skipping invalid header name");
            return;
        }
    };
    match HeaderValue::from_str(value) {
        Ok(value) => {
            if replace {
                headers.insert(name, value);
            } else {
                headers.append(name, value);
            }
        }
        Err(_) => tracing::warn!(key = %key, "skipping invalid header value"),
    }
}

fn insert_typed_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "skipping invalid header value"),
    }
}

pub(crate) fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde_json::Value;

    /// Codec with no header contributions, for exercising the builder in
    /// isolation.
    #[derive(Default)]
    struct PlainCodec {
        buf: Vec<u8>,
    }

    impl BodyCodec for PlainCodec {
        fn encode(&mut self, body: Body) -> Result<&[u8]> {
            if let Body::Json(value) = body {
                self.buf = value.to_string().into_bytes();
            }
            Ok(&self.buf)
        }

        fn decode(&mut self, _bytes: &[u8]) -> Result<Value> {
            Ok(Value::Null)
        }

        fn reset(&mut self) {
            self.buf.clear();
        }
    }

    fn with_base(mut builder: RequestBuilder, base: &str) -> RequestBuilder {
        builder.core_mut().base_url = Some(base.to_string());
        builder
    }

    fn build(mut builder: RequestBuilder) -> Result<Request> {
        let mut codec = PlainCodec::default();
        builder.build(&mut codec)
    }

    fn query_of(request: &Request) -> Values {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn url_resolution_cases() {
        let example = "https://www.example.com";
        let cases: Vec<(&str, RequestBuilder, &str, Vec<(&str, &str)>)> = vec![
            (
                "has_base_1",
                with_base(RequestBuilder::get().path(["search?hello=world"]), example),
                "https://www.example.com/search",
                vec![("hello", "world")],
            ),
            (
                "has_base_2",
                with_base(
                    RequestBuilder::get().path(["text", "search?hello=world"]),
                    example,
                ),
                "https://www.example.com/text/search",
                vec![("hello", "world")],
            ),
            (
                "has_base_3",
                with_base(
                    RequestBuilder::get()
                        .path(["text", "search?q=foo&q=bar&hello=world"])
                        .set_query("hello", "bye"),
                    example,
                ),
                "https://www.example.com/text/search",
                vec![("q", "foo"), ("q", "bar"), ("hello", "bye")],
            ),
            (
                "has_base_4",
                with_base(
                    RequestBuilder::get()
                        .path(["text", "search?q=bar&hello=world"])
                        .set_query("hello", "bye"),
                    example,
                ),
                "https://www.example.com/text/search",
                vec![("q", "bar"), ("hello", "bye")],
            ),
            (
                "has_base_5",
                with_base(
                    RequestBuilder::get()
                        .path(["text", "search?q=bar&hello=world"])
                        .set_query("hello", "bye")
                        .set_query("q", "foo"),
                    example,
                ),
                "https://www.example.com/text/search",
                vec![("q", "foo"), ("hello", "bye")],
            ),
            (
                "has_base_6",
                with_base(
                    RequestBuilder::get()
                        .path(["text", "search?q=bar&hello=world"])
                        .set_query("hello", "bye")
                        .set_query("q", "bar")
                        .add_query("q", "foo"),
                    example,
                ),
                "https://www.example.com/text/search",
                vec![("q", "bar"), ("q", "foo"), ("hello", "bye")],
            ),
            (
                "has_base_7",
                with_base(
                    RequestBuilder::get().path(["test_data.json"]),
                    "https://www.example.com/search",
                ),
                "https://www.example.com/search/test_data.json",
                vec![],
            ),
            (
                "no_base_1",
                RequestBuilder::get().path(["https://www.example.com/search?q=foo&q=bar"]),
                "https://www.example.com/search",
                vec![("q", "foo"), ("q", "bar")],
            ),
            (
                "no_base_2",
                RequestBuilder::get().path(["https://www.example.com", "search?q=foo&q=bar"]),
                "https://www.example.com/search",
                vec![("q", "foo"), ("q", "bar")],
            ),
            (
                "no_base_3",
                RequestBuilder::get()
                    .path(["https://www.example.com", "search?q=foo&q=bar"])
                    .add_query("hello", "world"),
                "https://www.example.com/search",
                vec![("q", "foo"), ("q", "bar"), ("hello", "world")],
            ),
            (
                "no_base_4",
                RequestBuilder::get()
                    .path(["https://www.example.com/search", "testdata_acc.json"]),
                "https://www.example.com/search/testdata_acc.json",
                vec![],
            ),
            (
                "both_1",
                with_base(
                    RequestBuilder::get()
                        .path(["https://www.example.com", "search?q=foo&q=bar"])
                        .add_query("hello", "world"),
                    example,
                ),
                "https://www.example.com/search",
                vec![("q", "foo"), ("q", "bar"), ("hello", "world")],
            ),
            (
                "both_2",
                with_base(
                    RequestBuilder::get()
                        .path(["https://www.example.com", "text", "search?q=foo&q=bar"])
                        .add_query("hello", "world"),
                    example,
                ),
                "https://www.example.com/text/search",
                vec![("q", "foo"), ("q", "bar"), ("hello", "world")],
            ),
            (
                "both_3",
                with_base(
                    RequestBuilder::get()
                        .path(["https://pkg.go.dev/search?q=github.com%2Felectricbubble&m=package"]),
                    example,
                ),
                "https://pkg.go.dev/search",
                vec![("q", "github.com/electricbubble"), ("m", "package")],
            ),
            (
                "both_4",
                with_base(
                    RequestBuilder::get().path([
                        "https://pkg.go.dev/",
                        "search?q=github.com%2Felectricbubble&m=package",
                    ]),
                    example,
                ),
                "https://pkg.go.dev/search",
                vec![("q", "github.com/electricbubble"), ("m", "package")],
            ),
        ];

        for (name, builder, want_url, want_query) in cases {
            let request = build(builder).unwrap_or_else(|e| panic!("{name}: build failed: {e}"));
            let url = request.url().as_str();
            let without_query = url.split('?').next().unwrap();
            assert_eq!(without_query, want_url, "{name}: url mismatch");

            let want: Values = want_query.into_iter().collect();
            assert_eq!(query_of(&request), want, "{name}: query mismatch");
        }
    }

    #[test]
    fn no_base_and_no_path_fails() {
        match build(RequestBuilder::get()) {
            Err(Error::EmptyUrl) => {}
            other => panic!("expected EmptyUrl, got {other:?}"),
        }
    }

    #[test]
    fn malformed_base_is_a_build_error() {
        let builder = with_base(RequestBuilder::get(), "://notaurl");
        match build(builder) {
            Err(Error::Build { stage: "url", .. }) => {}
            other => panic!("expected Build error, got {other:?}"),
        }
    }

    #[test]
    fn host_resolution() {
        let cases = [
            ("http://www.example.com/", "www.example.com", None),
            ("http://www.example.com:8080/", "www.example.com", Some(8080)),
            ("http://192.168.0.1/", "192.168.0.1", None),
            ("http://192.168.0.1:8080/", "192.168.0.1", Some(8080)),
            ("http://192.168.0.1:/", "192.168.0.1", None),
        ];
        for (base, host, port) in cases {
            let request = build(with_base(RequestBuilder::post(), base)).unwrap();
            assert_eq!(request.url().host_str(), Some(host), "{base}");
            assert_eq!(request.url().port(), port, "{base}");
        }

        let request = build(RequestBuilder::post().path(["http://[fe80::1]:8080/"])).unwrap();
        match request.url().host() {
            Some(url::Host::Ipv6(addr)) => {
                assert_eq!(addr, "fe80::1".parse::<std::net::Ipv6Addr>().unwrap())
            }
            other => panic!("expected ipv6 host, got {other:?}"),
        }
        assert_eq!(request.url().port(), Some(8080));
    }

    #[test]
    fn basic_auth_sets_authorization_header() {
        let builder =
            with_base(RequestBuilder::put(), "https://www.example.com").basic_auth("golang", "hello");
        let request = build(builder).unwrap();
        assert_eq!(
            request.headers()["authorization"],
            "Basic Z29sYW5nOmhlbGxv"
        );
    }

    #[test]
    fn path_elements_are_trimmed_and_filtered() {
        let builder = with_base(
            RequestBuilder::get().path(["  text ", "", "   ", "search"]),
            "https://www.example.com",
        );
        let request = build(builder).unwrap();
        assert_eq!(request.url().path(), "/text/search");
    }

    #[test]
    fn set_header_replaces_and_add_header_appends() {
        let builder = with_base(RequestBuilder::get(), "https://www.example.com")
            .set_header("X-Tag", "one")
            .set_header("X-Tag", "two")
            .add_header("X-Tag", "three");
        let request = build(builder).unwrap();
        let values: Vec<_> = request
            .headers()
            .get_all("x-tag")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values, ["two", "three"]);
    }

    #[test]
    fn body_is_encoded_by_the_codec_and_headers_contributed() {
        let mut builder =
            with_base(RequestBuilder::patch().body("bye"), "https://www.example.com");
        let mut codec = JsonCodec::new();
        let request = builder.build(&mut codec).unwrap();

        assert_eq!(request.body().unwrap().as_bytes(), Some(&b"\"bye\""[..]));
        assert_eq!(request.headers()["content-type"], "application/json; charset=utf-8");
        assert_eq!(request.headers()["content-length"], "5");
        assert_eq!(request.headers()["accept"], "application/json; charset=utf-8");
    }

    #[test]
    fn contributions_apply_without_a_body() {
        let mut builder = with_base(RequestBuilder::get(), "https://www.example.com");
        let mut codec = JsonCodec::new();
        let request = builder.build(&mut codec).unwrap();

        assert!(request.body().is_none());
        assert_eq!(request.headers()["content-length"], "0");
        assert_eq!(request.headers()["accept"], "application/json; charset=utf-8");
    }

    #[test]
    fn unsupported_body_type_surfaces_directly() {
        let mut builder = with_base(
            RequestBuilder::post().multipart(MultipartWriter::new()),
            "https://www.example.com",
        );
        let mut codec = crate::codec::FormUrlencodedCodec::new();
        match builder.build(&mut codec) {
            Err(Error::UnsupportedBody { expected, .. }) => assert_eq!(expected, "form values"),
            other => panic!("expected UnsupportedBody, got {other:?}"),
        }
    }

    #[test]
    fn timeout_resolution_combinations() {
        let second = Duration::from_secs(1);

        assert_eq!(resolve_timeout(None, None), None);
        assert_eq!(resolve_timeout(None, Some(second)), Some(second));

        let far = Instant::now() + Duration::from_secs(10);
        let remaining = resolve_timeout(Some(far), None).unwrap();
        assert!(remaining > Duration::from_secs(9) && remaining <= Duration::from_secs(10));

        // The tighter bound wins in both orders.
        assert_eq!(resolve_timeout(Some(far), Some(second)), Some(second));
        let near = Instant::now() + Duration::from_millis(100);
        let both = resolve_timeout(Some(near), Some(Duration::from_secs(30))).unwrap();
        assert!(both <= Duration::from_millis(100));
    }

    #[test]
    fn built_request_carries_resolved_timeout() {
        let builder = with_base(RequestBuilder::get(), "https://www.example.com")
            .timeout(Duration::from_secs(3));
        let request = build(builder).unwrap();
        assert_eq!(request.timeout(), Some(&Duration::from_secs(3)));
    }

    #[test]
    #[should_panic(expected = "not reusable")]
    fn building_twice_panics() {
        let mut builder = RequestBuilder::get().path(["https://www.example.com"]);
        let mut codec = PlainCodec::default();
        let _ = builder.build(&mut codec);
        let _ = builder.build(&mut codec);
    }

    #[test]
    fn clean_path_rules() {
        assert_eq!(clean_path("a//b///c"), "a/b/c");
        assert_eq!(clean_path("a/./b"), "a/b");
        assert_eq!(clean_path("a/b/../c"), "a/c");
        assert_eq!(clean_path("/../a"), "/a");
        assert_eq!(clean_path("../a"), "../a");
        assert_eq!(clean_path("a/.."), ".");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path("text/"), "text");
    }
}
