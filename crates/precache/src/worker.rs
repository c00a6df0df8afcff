//! Cache-first worker: the install and fetch lifecycle handlers.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::{Fetcher, HttpFetcher};
use crate::config::WorkerConfig;
use crate::error::PrecacheResult;
use crate::store::Cache;
use crate::types::{Request, Response};

/// Lifecycle entry points driven by a host adapter.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Pre-populate the store. Resolves once every seed has been handled.
    async fn on_install(&self) -> PrecacheResult<InstallReport>;

    /// Answer one intercepted request.
    async fn on_fetch(&self, request: Request) -> PrecacheResult<FetchOutcome>;
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Store the seeds were written to.
    pub cache_name: String,

    /// Seed URLs, resolved, in configuration order.
    pub urls: Vec<String>,

    /// Entries written (duplicate seeds collapse to one).
    pub stored: usize,
}

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// Response to an intercepted request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: FetchSource,
}

impl FetchOutcome {
    pub fn into_response(self) -> Response {
        self.response
    }
}

/// Serves from its store first and falls back to the network on a miss.
///
/// Holds an owned handle to one named store; fetches never write to it.
pub struct CacheFirstWorker {
    cache: Cache,
    fetcher: Arc<dyn Fetcher>,
    seeds: Vec<Request>,
}

impl CacheFirstWorker {
    pub fn new(cache: Cache, fetcher: Arc<dyn Fetcher>, seeds: Vec<Request>) -> Self {
        Self {
            cache,
            fetcher,
            seeds,
        }
    }

    /// Open the configured store and build an HTTP-backed worker.
    pub async fn from_config(config: &WorkerConfig) -> PrecacheResult<Self> {
        let seeds = config.seed_requests()?;
        let cache = config.storage()?.open(&config.cache_name).await?;
        let fetcher = HttpFetcher::new(config.timeout())?;
        Ok(Self::new(cache, Arc::new(fetcher), seeds))
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn seeds(&self) -> &[Request] {
        &self.seeds
    }
}

impl fmt::Debug for CacheFirstWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheFirstWorker")
            .field("cache", &self.cache)
            .field("seeds", &self.seeds.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Lifecycle for CacheFirstWorker {
    async fn on_install(&self) -> PrecacheResult<InstallReport> {
        debug!(cache = %self.cache.name(), seeds = self.seeds.len(), "install started");

        let stored = self.cache.add_all(self.fetcher.as_ref(), &self.seeds).await?;

        info!(cache = %self.cache.name(), stored, "install complete");
        Ok(InstallReport {
            cache_name: self.cache.name().to_string(),
            urls: self.seeds.iter().map(|r| r.url.to_string()).collect(),
            stored,
        })
    }

    async fn on_fetch(&self, request: Request) -> PrecacheResult<FetchOutcome> {
        match self.cache.match_request(&request).await {
            Ok(Some(response)) => {
                return Ok(FetchOutcome {
                    response,
                    source: FetchSource::Cache,
                })
            }
            Ok(None) => {}
            Err(e) => {
                warn!(url = %request.url, error = %e, "cache lookup failed, using network");
            }
        }

        let response = self.fetcher.fetch(&request).await?;
        debug!(url = %request.url, status = response.status, "served from network");
        Ok(FetchOutcome {
            response,
            source: FetchSource::Network,
        })
    }
}
