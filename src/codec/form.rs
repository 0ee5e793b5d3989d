//! Form-urlencoded request body codec with JSON response decode

use serde_json::Value;

use super::{Body, BodyCodec, CONTENT_TYPE_FORM_URLENCODED, CONTENT_TYPE_JSON};
use crate::error::{Error, Result};
use crate::pool::BUF_POOL;

/// Encodes `Body::Form` values as `application/x-www-form-urlencoded` and
/// decodes JSON responses.
///
/// Keys are emitted in sorted order, so the encoded payload is
/// byte-identical no matter how the map was populated.
pub struct FormUrlencodedCodec {
    buf: Option<Vec<u8>>,
    content_length: u64,
}

impl FormUrlencodedCodec {
    pub const fn new() -> Self {
        FormUrlencodedCodec {
            buf: None,
            content_length: 0,
        }
    }
}

impl Default for FormUrlencodedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyCodec for FormUrlencodedCodec {
    fn encode(&mut self, body: Body) -> Result<&[u8]> {
        let buf = self.buf.get_or_insert_with(|| BUF_POOL.acquire());
        match body {
            Body::Form(values) => buf.extend_from_slice(values.encode().as_bytes()),
            // An explicit null body encodes as an empty payload.
            Body::Json(Value::Null) => {}
            other => {
                return Err(Error::UnsupportedBody {
                    expected: "form values",
                    actual: other.kind(),
                })
            }
        }
        self.content_length = buf.len() as u64;
        Ok(buf)
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(|e| Error::Malformed {
            source: anyhow::Error::new(e),
        })
    }

    fn reset(&mut self) {
        if let Some(buf) = self.buf.take() {
            BUF_POOL.release(buf);
        }
        self.content_length = 0;
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.content_length)
    }

    fn content_type(&self) -> Option<String> {
        Some(CONTENT_TYPE_FORM_URLENCODED.to_string())
    }

    fn accept(&self) -> Option<String> {
        Some(CONTENT_TYPE_JSON.to_string())
    }
}
