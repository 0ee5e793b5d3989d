//! Body codec protocol
//!
//! A codec owns one request/response cycle's body handling: encoding the
//! request body, decoding the response body, and optionally contributing
//! negotiation headers and overriding success/failure classification.
//! Codec instances hold pooled scratch state and are acquired from a
//! [`CodecPool`] for exactly one call.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use reqwest::blocking::Request;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::multipart::MultipartWriter;
use crate::values::Values;

mod form;
mod json;
mod multipart;

pub use form::FormUrlencodedCodec;
pub use json::JsonCodec;
pub use multipart::MultipartCodec;

/// `Content-Type` value produced and accepted by the JSON codec.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
/// `Content-Type` value produced by the form-urlencoded codec.
pub const CONTENT_TYPE_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A request body value, tagged by shape.
///
/// Presence is tracked by the request builder, so `Body::Json(Value::Null)`
/// is a valid present body.
pub enum Body {
    /// Any serializable value, captured as a JSON value.
    Json(Value),
    /// A string multimap for form-urlencoded payloads.
    Form(Values),
    /// A multipart/form-data payload under construction.
    Multipart(MultipartWriter),
}

impl Body {
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Json(_) => "json value",
            Body::Form(_) => "form values",
            Body::Multipart(_) => "multipart writer",
        }
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// Response metadata handed to classification and observation hooks after
/// the transport call, before any decoding.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
}

/// Default success policy: status in `200..=299`.
pub fn is_success_2xx(head: &ResponseHead) -> bool {
    (200..=299).contains(&head.status.as_u16())
}

/// Reusable wrong policy: status `400` and above.
pub fn is_wrong_gte_400(head: &ResponseHead) -> bool {
    head.status.as_u16() >= 400
}

/// Strategy for encoding request bodies and decoding response bodies.
///
/// `encode` and `decode` are mandatory; every other method is an optional
/// capability with a default. Contributions return `None` to decline a
/// header, `is_wrong` returns `None` to decline classification, and
/// `decode_wrong` falls back to the normal decode path.
///
/// Codecs decode to a self-describing [`Value`]; the dispatch layer
/// converts into the caller's target type.
pub trait BodyCodec: Send {
    /// Encode `body` into the codec's scratch buffer and return the bytes.
    ///
    /// Fails with [`crate::Error::UnsupportedBody`] when the codec cannot
    /// represent the value's shape.
    fn encode(&mut self, body: Body) -> Result<&[u8]>;

    /// Decode a buffered response body.
    fn decode(&mut self, bytes: &[u8]) -> Result<Value>;

    /// Clear per-call scratch state before the instance returns to its
    /// pool.
    fn reset(&mut self);

    /// Byte length of the encoded body, set after `encode`.
    fn content_length(&self) -> Option<u64> {
        None
    }

    fn content_type(&self) -> Option<String> {
        None
    }

    fn content_encoding(&self) -> Option<String> {
        None
    }

    fn accept(&self) -> Option<String> {
        None
    }

    fn accept_encoding(&self) -> Option<String> {
        None
    }

    /// Whether the response belongs to the success bucket.
    fn is_successful(&self, head: &ResponseHead) -> bool {
        is_success_2xx(head)
    }

    /// Whether the response belongs to the wrong bucket; `None` declines
    /// to classify and defers to `is_successful` and the default branch.
    fn is_wrong(&self, head: &ResponseHead) -> Option<bool> {
        let _ = head;
        None
    }

    /// Decode path for the wrong bucket.
    fn decode_wrong(&mut self, bytes: &[u8]) -> Result<Value> {
        self.decode(bytes)
    }

    /// Observation hook invoked with the fully built request, before the
    /// transport call.
    fn before_send(&mut self, request: &Request) {
        let _ = request;
    }

    /// Observation hook invoked with the response head, before decoding.
    fn after_receive(&mut self, head: &ResponseHead) {
        let _ = head;
    }
}

/// Idle codec instances kept per pool.
const MAX_IDLE_CODECS: usize = 64;

/// A concurrent pool of codec instances of one concrete type.
///
/// The built-in pools are the statics [`JSON`], [`FORM_URLENCODED`], and
/// [`MULTIPART`]; custom codecs get a pool the same way:
///
/// ```
/// use courier_http::codec::{CodecPool, JsonCodec};
///
/// static MY_CODEC: CodecPool = CodecPool::new(|| Box::new(JsonCodec::new()));
/// ```
pub struct CodecPool {
    factory: fn() -> Box<dyn BodyCodec>,
    idle: Mutex<Vec<Box<dyn BodyCodec>>>,
}

impl CodecPool {
    pub const fn new(factory: fn() -> Box<dyn BodyCodec>) -> Self {
        CodecPool {
            factory,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Take a codec instance for one request/response cycle. The returned
    /// guard resets and releases the instance when dropped.
    pub fn acquire(&self) -> PooledCodec<'_> {
        let codec = self
            .idle
            .lock()
            .ok()
            .and_then(|mut idle| idle.pop())
            .unwrap_or_else(|| (self.factory)());
        PooledCodec {
            pool: self,
            codec: Some(codec),
        }
    }

    fn release(&self, mut codec: Box<dyn BodyCodec>) {
        codec.reset();
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < MAX_IDLE_CODECS {
                idle.push(codec);
            }
        }
    }
}

/// Owning handle for a pooled codec instance; releases on drop on every
/// exit path.
pub struct PooledCodec<'a> {
    pool: &'a CodecPool,
    codec: Option<Box<dyn BodyCodec>>,
}

impl PooledCodec<'_> {
    pub fn as_mut(&mut self) -> &mut dyn BodyCodec {
        &mut **self.codec.as_mut().expect("codec already released")
    }
}

impl Deref for PooledCodec<'_> {
    type Target = Box<dyn BodyCodec>;

    fn deref(&self) -> &Self::Target {
        self.codec.as_ref().expect("codec already released")
    }
}

impl DerefMut for PooledCodec<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.codec.as_mut().expect("codec already released")
    }
}

impl Drop for PooledCodec<'_> {
    fn drop(&mut self) {
        if let Some(codec) = self.codec.take() {
            self.pool.release(codec);
        }
    }
}

/// JSON request body, JSON response decode.
pub static JSON: CodecPool = CodecPool::new(|| Box::new(JsonCodec::new()));

/// Form-urlencoded request body, JSON response decode.
pub static FORM_URLENCODED: CodecPool = CodecPool::new(|| Box::new(FormUrlencodedCodec::new()));

/// Multipart/form-data request body, JSON response decode.
pub static MULTIPART: CodecPool = CodecPool::new(|| Box::new(MultipartCodec::new()));

#[cfg(test)]
mod tests {
    use super::*;

    fn head(status: u16) -> ResponseHead {
        ResponseHead {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            url: Url::parse("https://example.com/x").unwrap(),
        }
    }

    #[test]
    fn default_success_policy_is_2xx() {
        assert!(is_success_2xx(&head(200)));
        assert!(is_success_2xx(&head(299)));
        assert!(!is_success_2xx(&head(199)));
        assert!(!is_success_2xx(&head(300)));
    }

    #[test]
    fn wrong_policy_is_gte_400() {
        assert!(!is_wrong_gte_400(&head(399)));
        assert!(is_wrong_gte_400(&head(400)));
        assert!(is_wrong_gte_400(&head(500)));
    }

    #[test]
    fn pool_recycles_instances() {
        static POOL: CodecPool = CodecPool::new(|| Box::new(JsonCodec::new()));
        {
            let mut codec = POOL.acquire();
            codec
                .as_mut()
                .encode(Body::Json(serde_json::json!({"a": 1})))
                .unwrap();
        }
        let idle = POOL.idle.lock().unwrap().len();
        assert_eq!(idle, 1);

        let mut codec = POOL.acquire();
        // The recycled instance must come back reset.
        assert_eq!(codec.content_length(), Some(0));
        assert_eq!(POOL.idle.lock().unwrap().len(), 0);
    }
}
