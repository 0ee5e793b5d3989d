//! JSON body codec

use serde_json::Value;

use super::{Body, BodyCodec, CONTENT_TYPE_JSON};
use crate::error::{Error, Result};
use crate::pool::BUF_POOL;

/// Encodes request bodies as JSON and decodes JSON responses.
///
/// This is the client's default codec.
pub struct JsonCodec {
    buf: Option<Vec<u8>>,
    content_length: u64,
}

impl JsonCodec {
    pub const fn new() -> Self {
        JsonCodec {
            buf: None,
            content_length: 0,
        }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyCodec for JsonCodec {
    fn encode(&mut self, body: Body) -> Result<&[u8]> {
        let value = match body {
            Body::Json(value) => value,
            other => {
                return Err(Error::UnsupportedBody {
                    expected: "json value",
                    actual: other.kind(),
                })
            }
        };
        let buf = self.buf.get_or_insert_with(|| BUF_POOL.acquire());
        serde_json::to_writer(&mut *buf, &value).map_err(|e| Error::Encode {
            source: anyhow::Error::new(e),
        })?;
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
        Some(CONTENT_TYPE_JSON.to_string())
    }

    fn accept(&self) -> Option<String> {
        Some(CONTENT_TYPE_JSON.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trip_preserves_value() {
        let original = json!({"name": "hi", "tags": ["a", "b"], "count": 3, "nested": {"x": null}});
        let mut codec = JsonCodec::new();
        let bytes = codec.encode(Body::Json(original.clone())).unwrap().to_vec();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn null_is_a_valid_body() {
        let mut codec = JsonCodec::new();
        let bytes = codec.encode(Body::Json(Value::Null)).unwrap();
        assert_eq!(bytes, b"null");
    }

    #[test]
    fn tracks_content_length_and_type() {
        let mut codec = JsonCodec::new();
        assert_eq!(codec.content_length(), Some(0));
        let len = codec.encode(Body::Json(json!("bye"))).unwrap().len();
        assert_eq!(codec.content_length(), Some(len as u64));
        assert_eq!(codec.content_type().as_deref(), Some(CONTENT_TYPE_JSON));
        assert_eq!(codec.accept().as_deref(), Some(CONTENT_TYPE_JSON));
        assert_eq!(codec.content_encoding(), None);
    }

    #[test]
    fn rejects_multipart_bodies() {
        let mut codec = JsonCodec::new();
        let err = codec
            .encode(Body::Multipart(crate::multipart::MultipartWriter::new()))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedBody { .. }));
    }

    #[test]
    fn malformed_input_fails_decode() {
        let mut codec = JsonCodec::new();
        assert!(matches!(
            codec.decode(b"{not json").unwrap_err(),
            Error::Malformed { .. }
        ));
    }

    #[test]
    fn reset_clears_scratch() {
        let mut codec = JsonCodec::new();
        codec.encode(Body::Json(json!([1, 2, 3]))).unwrap();
        codec.reset();
        assert_eq!(codec.content_length(), Some(0));
        let bytes = codec.encode(Body::Json(json!(true))).unwrap();
        assert_eq!(bytes, b"true");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn encode_decode_round_trips(
            name in "[a-z]{1,12}",
            count in any::<i64>(),
            flag in any::<bool>(),
            tags in proptest::collection::vec("[a-z]{1,6}", 0..5),
        ) {
            let original = serde_json::json!({
                "name": name,
                "count": count,
                "flag": flag,
                "tags": tags,
            });
            let mut codec = JsonCodec::new();
            let bytes = codec.encode(Body::Json(original.clone())).unwrap().to_vec();
            prop_assert_eq!(codec.decode(&bytes).unwrap(), original);
        }
    }
}
