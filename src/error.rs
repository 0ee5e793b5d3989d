//! Error types for the courier-http client
//!
//! One error enum covers the whole request/response cycle, using thiserror
//! for the definitions and anyhow for heterogeneous error causes.

use reqwest::StatusCode;
use thiserror::Error;

use crate::codec::ResponseHead;

/// Main error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither a base URL nor any path element was given.
    #[error("empty url: no base url and no path elements")]
    EmptyUrl,

    /// Request assembly failed; `stage` is `"url"` or `"body"`.
    #[error("build {stage}")]
    Build {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The codec cannot represent the given body value's shape.
    #[error("unsupported body type: expected {expected}, got {actual}")]
    UnsupportedBody {
        expected: &'static str,
        actual: &'static str,
    },

    /// A body could not be encoded by the codec.
    #[error("encode body")]
    Encode {
        #[source]
        source: anyhow::Error,
    },

    /// A response byte stream did not parse in the codec's format.
    #[error("malformed body")]
    Malformed {
        #[source]
        source: anyhow::Error,
    },

    /// Decoding a classified response failed, with request context attached.
    #[error("decode response: url: {url} ({status})")]
    Decode {
        url: String,
        status: StatusCode,
        #[source]
        source: anyhow::Error,
    },

    /// The response fell in the wrong bucket and no destination was supplied.
    #[error("unexpected response: url: {url} ({status})")]
    Classification { url: String, status: StatusCode },

    /// Transport-level failure, surfaced unwrapped.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn build(stage: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Error::Build {
            stage,
            source: source.into(),
        }
    }

    pub(crate) fn decode_at(head: &ResponseHead, source: impl Into<anyhow::Error>) -> Self {
        Error::Decode {
            url: head.url.to_string(),
            status: head.status,
            source: source.into(),
        }
    }

    pub(crate) fn classification_at(head: &ResponseHead) -> Self {
        Error::Classification {
            url: head.url.to_string(),
            status: head.status,
        }
    }

    /// Whether this error is a deadline or timeout expiry from the transport.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// The response status attached to this error, if it carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Decode { status, .. } | Error::Classification { status, .. } => Some(*status),
            Error::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
