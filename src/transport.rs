//! Transport boundary
//!
//! The client depends on an injected HTTP-executing collaborator with a
//! single operation. Connection pooling, TLS, proxying, and redirects all
//! live behind this boundary.

use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Request, Response};

/// An HTTP-executing collaborator: one request in, one response out.
///
/// Implementations must be safe to call concurrently; the default is a
/// [`reqwest::blocking::Client`]. Test doubles can wrap one to observe or
/// count traffic.
pub trait Transport: Send + Sync {
    fn execute(&self, request: Request) -> reqwest::Result<Response>;
}

impl Transport for Client {
    fn execute(&self, request: Request) -> reqwest::Result<Response> {
        Client::execute(self, request)
    }
}

/// Build the default transport: 30 second call and connect timeouts,
/// 30 second TCP keep-alive, 90 second idle-connection lifetime, and an
/// idle cap of one connection per core plus one per host. Proxy settings
/// come from the environment.
///
/// A per-request timeout resolved by the builder overrides the call
/// timeout for that request.
pub fn default_client() -> Client {
    let parallelism = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(parallelism + 1)
        .build()
        .expect("default transport configuration is valid")
}
