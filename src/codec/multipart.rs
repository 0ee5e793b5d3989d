//! Multipart/form-data request body codec with JSON response decode

use serde_json::Value;

use super::{Body, BodyCodec, CONTENT_TYPE_JSON};
use crate::error::{Error, Result};
use crate::pool::BUF_POOL;

/// Serializes a [`crate::MultipartWriter`] payload and decodes JSON
/// responses.
///
/// The content type carries the writer's boundary, so it is only known
/// after encoding.
pub struct MultipartCodec {
    buf: Option<Vec<u8>>,
    content_type: String,
    content_length: u64,
}

impl MultipartCodec {
    pub const fn new() -> Self {
        MultipartCodec {
            buf: None,
            content_type: String::new(),
            content_length: 0,
        }
    }
}

impl Default for MultipartCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyCodec for MultipartCodec {
    fn encode(&mut self, body: Body) -> Result<&[u8]> {
        let mut writer = match body {
            Body::Multipart(writer) => writer,
            other => {
                return Err(Error::UnsupportedBody {
                    expected: "multipart writer",
                    actual: other.kind(),
                })
            }
        };
        let buf = self.buf.get_or_insert_with(|| BUF_POOL.acquire());
        writer.write_to(buf).map_err(|e| Error::Encode {
            source: anyhow::Error::new(e),
        })?;
        self.content_type = writer.form_data_content_type();
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
        self.content_type.clear();
        self.content_length = 0;
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.content_length)
    }

    fn content_type(&self) -> Option<String> {
        if self.content_type.is_empty() {
            None
        } else {
            Some(self.content_type.clone())
        }
    }

    fn accept(&self) -> Option<String> {
        Some(CONTENT_TYPE_JSON.to_string())
    }
}
