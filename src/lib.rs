//! courier-http - fluent blocking HTTP client layer
//!
//! This crate layers a fluent request builder, pluggable body codecs, and
//! a classifying dispatch routine over a [`reqwest`] blocking transport.
//!
//! # Main Components
//!
//! - **Request Builder**: one-shot accumulator of method, path elements,
//!   query, headers, deadline/timeout, and body, resolved into a
//!   transport request at build time
//! - **Body Codecs**: swappable encode/decode strategies (JSON,
//!   form-urlencoded, multipart) that also contribute negotiation headers
//!   and success/failure classification
//! - **Client**: merges call defaults, executes through an injected
//!   transport, and decodes classified responses into caller types
//! - **Pools**: builders, codecs, and scratch buffers are recycled across
//!   calls
//!
//! # Example
//!
//! ```no_run
//! use courier_http::{Client, Outcome, RequestBuilder};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Repo {
//!     name: String,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct ApiError {
//!     message: String,
//! }
//!
//! fn main() -> courier_http::Result<()> {
//!     let client = Client::new().with_base_url("https://api.example.com");
//!     let reply = client.send::<Repo, ApiError>(
//!         RequestBuilder::get().path(["repos", "courier"]),
//!     )?;
//!     match reply.outcome {
//!         Outcome::Success(repo) => println!("{}", repo.name),
//!         Outcome::Wrong(err) => eprintln!("api error: {}", err.message),
//!         Outcome::NoContent => {}
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod multipart;
pub mod pool;
pub mod request;
pub mod transport;
pub mod values;


pub use client::{Client, Outcome, Reply};
pub use codec::{Body, BodyCodec, CodecPool, PooledCodec, ResponseHead};
pub use error::{Error, Result};
pub use multipart::MultipartWriter;
pub use request::RequestBuilder;
pub use transport::Transport;
pub use values::Values;

// Commonly used transport-level types.
pub use reqwest::{Method, StatusCode};
