//! Network side of the worker.
//!
//! [`Fetcher`] is the seam between the worker and the network. [`HttpFetcher`]
//! is the real implementation; every HTTP status comes back as a
//! [`Response`], only transport failures are errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::{PrecacheError, PrecacheResult};
use crate::types::{Request, Response};

mod http;

pub const PRECACHE_USER_AGENT: &str = concat!("precache/", env!("CARGO_PKG_VERSION"));

/// Performs network fetches on behalf of the worker.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> PrecacheResult<Response>;
}

/// `reqwest`-backed fetcher. Single attempt per request, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> PrecacheResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(PRECACHE_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| PrecacheError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> PrecacheResult<Response> {
        debug!(method = %request.method, url = %request.url, "network fetch");

        let builder = http::build_request(&self.client, request)?;
        let response = builder.send().await?;

        http::read_response(response).await
    }
}
