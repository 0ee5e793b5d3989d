//! Client configuration and dispatch
//!
//! A client holds call defaults (base URL, headers, timeout, codec) and
//! the transport. Dispatch merges those defaults into a request builder,
//! executes the call, classifies the response through the codec, and
//! decodes into the caller's types.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Response;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::codec::{self, BodyCodec, CodecPool, ResponseHead};
use crate::error::{Error, Result};
use crate::request::{basic_authorization, insert_header, RequestBuilder};
use crate::transport::{default_client, Transport};

/// Which outcome bucket a buffered response fell into.
enum Verdict {
    NoContent,
    Success,
    Wrong,
    /// Neither classified wrong nor successful; still decoded into the
    /// wrong target, via the normal decode path.
    Ambiguous,
}

/// Decoded result of one dispatched call.
#[derive(Debug)]
pub enum Outcome<S, W> {
    /// The response classified successful and decoded into `S`.
    Success(S),
    /// The response classified wrong (or unclassified) and decoded into
    /// `W`.
    Wrong(W),
    /// A `204 No Content` response; nothing was decoded.
    NoContent,
}

impl<S, W> Outcome<S, W> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<S> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn wrong(self) -> Option<W> {
        match self {
            Outcome::Wrong(value) => Some(value),
            _ => None,
        }
    }
}

/// A classified, buffered response.
#[derive(Debug)]
pub struct Reply<S, W> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// The raw buffered body, also available when decoding succeeded.
    pub body: Vec<u8>,
    pub outcome: Outcome<S, W>,
}

/// Blocking HTTP client with per-call pooled builders and codecs.
///
/// Configuration is write-once: set base URL, default headers, timeout,
/// codec, and transport up front, then share the client freely across
/// threads. Racing configuration against in-flight calls is not
/// synchronized and is the caller's responsibility.
#[derive(Clone)]
pub struct Client {
    base_url: Option<String>,
    headers: HeaderMap,
    timeout: Option<Duration>,
    codec: &'static CodecPool,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// A client over the default transport with the JSON codec.
    pub fn new() -> Self {
        Client {
            base_url: None,
            headers: HeaderMap::new(),
            timeout: None,
            codec: &codec::JSON,
            transport: Arc::new(default_client()),
        }
    }

    /// A new client sharing this one's transport, with copied base URL
    /// and headers and the default JSON codec.
    pub fn clone_shell(&self) -> Self {
        Client {
            base_url: self.base_url.clone(),
            headers: self.headers.clone(),
            timeout: None,
            codec: &codec::JSON,
            transport: Arc::clone(&self.transport),
        }
    }

    /// Base URL that request paths resolve against.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Default timeout for requests that set none themselves.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Default codec pool for `send` and `fetch`.
    pub fn with_codec(mut self, codec: &'static CodecPool) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the default header set.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set a default header, replacing previous values for the key.
    /// Invalid names or values are skipped with a warning.
    pub fn set_header(mut self, key: &str, value: &str) -> Self {
        insert_header(&mut self.headers, key, value, true);
        self
    }

    /// Append a default header value.
    pub fn add_header(mut self, key: &str, value: &str) -> Self {
        insert_header(&mut self.headers, key, value, false);
        self
    }

    /// Set the default `Authorization` header to HTTP basic credentials.
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let value = basic_authorization(username, password);
        self.set_header("Authorization", &value)
    }

    /// Dispatch with the client's default codec, decoding the success
    /// bucket into `S` and the wrong bucket into `W`.
    pub fn send<S, W>(&self, builder: RequestBuilder) -> Result<Reply<S, W>>
    where
        S: DeserializeOwned,
        W: DeserializeOwned,
    {
        self.send_with_codec(self.codec, builder)
    }

    /// Dispatch with an explicit codec pool for this call.
    ///
    /// The cycle: acquire a codec, merge client defaults into the builder,
    /// build the request (the codec contributes headers), execute, then
    /// classify and decode. The codec instance returns to its pool on
    /// every exit path.
    pub fn send_with_codec<S, W>(
        &self,
        pool: &CodecPool,
        builder: RequestBuilder,
    ) -> Result<Reply<S, W>>
    where
        S: DeserializeOwned,
        W: DeserializeOwned,
    {
        let mut codec = pool.acquire();
        let (head, body) = self.round_trip(codec.as_mut(), builder)?;
        let verdict = classify(codec.as_mut(), &head);

        let outcome = match verdict {
            Verdict::NoContent => Outcome::NoContent,
            Verdict::Success => {
                let value = codec
                    .as_mut()
                    .decode(&body)
                    .map_err(|e| Error::decode_at(&head, e))?;
                Outcome::Success(
                    serde_json::from_value(value).map_err(|e| Error::decode_at(&head, e))?,
                )
            }
            Verdict::Wrong => {
                let value = codec
                    .as_mut()
                    .decode_wrong(&body)
                    .map_err(|e| Error::decode_at(&head, e))?;
                Outcome::Wrong(
                    serde_json::from_value(value).map_err(|e| Error::decode_at(&head, e))?,
                )
            }
            Verdict::Ambiguous => {
                let value = codec
                    .as_mut()
                    .decode(&body)
                    .map_err(|e| Error::decode_at(&head, e))?;
                Outcome::Wrong(
                    serde_json::from_value(value).map_err(|e| Error::decode_at(&head, e))?,
                )
            }
        };

        Ok(Reply {
            status: head.status,
            headers: head.headers,
            body,
            outcome,
        })
    }

    /// Dispatch with no wrong-bucket destination: a response classified
    /// wrong (or left unclassified) fails with
    /// [`Error::Classification`]. A `204 No Content` response yields
    /// `S::default()`.
    pub fn fetch<S>(&self, builder: RequestBuilder) -> Result<S>
    where
        S: DeserializeOwned + Default,
    {
        self.fetch_with_codec(self.codec, builder)
    }

    /// [`Client::fetch`] with an explicit codec pool for this call.
    pub fn fetch_with_codec<S>(&self, pool: &CodecPool, builder: RequestBuilder) -> Result<S>
    where
        S: DeserializeOwned + Default,
    {
        let mut codec = pool.acquire();
        let (head, body) = self.round_trip(codec.as_mut(), builder)?;
        match classify(codec.as_mut(), &head) {
            Verdict::NoContent => Ok(S::default()),
            Verdict::Success => {
                let value = codec
                    .as_mut()
                    .decode(&body)
                    .map_err(|e| Error::decode_at(&head, e))?;
                serde_json::from_value(value).map_err(|e| Error::decode_at(&head, e))
            }
            Verdict::Wrong | Verdict::Ambiguous => Err(Error::classification_at(&head)),
        }
    }

    /// Dispatch without buffering, classification, or decoding.
    ///
    /// Returns the live response; the caller owns draining it. Dropping
    /// the response closes the body and releases the connection back to
    /// the transport's pool.
    pub fn send_raw(&self, mut builder: RequestBuilder) -> Result<Response> {
        let mut codec = self.codec.acquire();
        self.attach(&mut builder);
        let request = builder.build(codec.as_mut())?;
        codec.as_mut().before_send(&request);
        tracing::debug!(method = %request.method(), url = %request.url(), "dispatching raw request");
        Ok(self.transport.execute(request)?)
    }

    /// Build and execute one request, buffering the response body unless
    /// the status short-circuits decoding.
    fn round_trip(
        &self,
        codec: &mut dyn BodyCodec,
        mut builder: RequestBuilder,
    ) -> Result<(ResponseHead, Vec<u8>)> {
        self.attach(&mut builder);
        let request = builder.build(codec)?;
        codec.before_send(&request);
        tracing::debug!(method = %request.method(), url = %request.url(), "dispatching request");

        let response = self.transport.execute(request)?;
        let head = ResponseHead {
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().clone(),
        };
        codec.after_receive(&head);
        tracing::debug!(status = %head.status, url = %head.url, "response received");

        if head.status == StatusCode::NO_CONTENT {
            return Ok((head, Vec::new()));
        }
        let body = response.bytes()?.to_vec();
        Ok((head, body))
    }

    /// Merge client defaults into the builder: base URL always, timeout
    /// when the builder has none, and each default header key the builder
    /// does not already set. Request-level headers always win.
    fn attach(&self, builder: &mut RequestBuilder) {
        let core = builder.core_mut();
        core.base_url = self.base_url.clone();
        if core.timeout.is_none() {
            core.timeout = self.timeout;
        }

        if self.headers.is_empty() {
            return;
        }
        if core.headers.is_empty() {
            core.headers = self.headers.clone();
            return;
        }
        for key in self.headers.keys() {
            if core.headers.contains_key(key) {
                continue;
            }
            for value in self.headers.get_all(key) {
                core.headers.append(key.clone(), value.clone());
            }
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(codec: &mut dyn BodyCodec, head: &ResponseHead) -> Verdict {
    if head.status == StatusCode::NO_CONTENT {
        return Verdict::NoContent;
    }
    // A wrong override takes precedence over the success check.
    if codec.is_wrong(head).unwrap_or(false) {
        return Verdict::Wrong;
    }
    if codec.is_successful(head) {
        return Verdict::Success;
    }
    Verdict::Ambiguous
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_values(headers: &HeaderMap, key: &str) -> Vec<String> {
        headers
            .get_all(key)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn attach_copies_defaults_into_an_empty_builder() {
        let client = Client::new()
            .with_base_url("https://api.example.com")
            .with_timeout(Duration::from_secs(5))
            .set_header("X-Env", "prod");
        let mut builder = RequestBuilder::get();
        client.attach(&mut builder);

        let core = builder.core_mut();
        assert_eq!(core.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(core.timeout, Some(Duration::from_secs(5)));
        assert_eq!(header_values(&core.headers, "x-env"), ["prod"]);
    }

    #[test]
    fn request_level_header_wins_over_client_default() {
        let client = Client::new().set_header("X-Tag", "1").set_header("X-Env", "prod");
        let mut builder = RequestBuilder::get().set_header("X-Tag", "2");
        client.attach(&mut builder);

        let core = builder.core_mut();
        assert_eq!(header_values(&core.headers, "x-tag"), ["2"]);
        assert_eq!(header_values(&core.headers, "x-env"), ["prod"]);
    }

    #[test]
    fn header_merge_is_case_insensitive() {
        let client = Client::new().set_header("x-tag", "client");
        let mut builder = RequestBuilder::get().set_header("X-TAG", "request");
        client.attach(&mut builder);
        assert_eq!(
            header_values(&builder.core_mut().headers, "x-tag"),
            ["request"]
        );
    }

    #[test]
    fn multi_valued_defaults_are_copied_whole() {
        let client = Client::new()
            .add_header("X-Multi", "a")
            .add_header("X-Multi", "b");
        let mut builder = RequestBuilder::get().set_header("X-Other", "1");
        client.attach(&mut builder);
        assert_eq!(
            header_values(&builder.core_mut().headers, "x-multi"),
            ["a", "b"]
        );
    }

    #[test]
    fn builder_timeout_overrides_client_default() {
        let client = Client::new().with_timeout(Duration::from_secs(30));
        let mut builder = RequestBuilder::get().timeout(Duration::from_secs(1));
        client.attach(&mut builder);
        assert_eq!(builder.core_mut().timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn clone_shell_copies_defaults_but_not_timeout() {
        let client = Client::new()
            .with_base_url("https://api.example.com")
            .with_timeout(Duration::from_secs(9))
            .set_header("X-Env", "prod")
            .with_codec(&codec::FORM_URLENCODED);
        let shell = client.clone_shell();

        assert_eq!(shell.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(header_values(&shell.headers, "x-env"), ["prod"]);
        assert_eq!(shell.timeout, None);
        assert!(std::ptr::eq(shell.codec, &codec::JSON));
        assert!(Arc::ptr_eq(&shell.transport, &client.transport));
    }

    #[test]
    fn basic_auth_sets_default_authorization() {
        let client = Client::new().basic_auth("x", "go");
        assert_eq!(header_values(&client.headers, "authorization"), ["Basic eDpnbw=="]);
    }
}
