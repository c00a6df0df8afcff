//! Worker configuration.
//!
//! Sources, lowest priority first: defaults, a YAML file, environment
//! variables. Callers (the CLI) apply explicit overrides on top with the
//! `with_*` builders.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `PRECACHE_ORIGIN` | Origin that relative paths resolve against |
//! | `PRECACHE_CACHE_NAME` | Cache store identifier |
//! | `PRECACHE_CACHE_DIR` | Root directory for cache stores |
//! | `PRECACHE_TIMEOUT` | Network timeout in seconds |
//! | `PRECACHE_SEED_URLS` | Comma-separated seed paths |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PrecacheError, PrecacheResult};
use crate::store::CacheStorage;
use crate::types::Request;

pub const DEFAULT_CACHE_NAME: &str = "app-cache-v1";

/// Configuration for a [`CacheFirstWorker`](crate::CacheFirstWorker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Origin that root-relative paths resolve against.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Cache store identifier. Changing it starts a fresh, empty store.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Paths pre-cached on install, in order.
    #[serde(default = "default_seed_urls")]
    pub seed_urls: Vec<String>,

    /// Root directory for cache stores (platform cache dir if unset).
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Network timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_origin() -> String {
    "http://localhost:5000".to_string()
}

fn default_cache_name() -> String {
    DEFAULT_CACHE_NAME.to_string()
}

fn default_seed_urls() -> Vec<String> {
    vec![
        "/".to_string(),
        "/static/css/style.css".to_string(),
        "/static/js/main.js".to_string(),
        "/static/images/logo.png".to_string(),
    ]
}

fn default_timeout() -> u64 {
    30
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_name: default_cache_name(),
            seed_urls: default_seed_urls(),
            cache_dir: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl WorkerConfig {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Load a YAML file, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> PrecacheResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PrecacheError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Ok(Self::from_yaml(&content)?.apply_env())
    }

    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml(content: &str) -> PrecacheResult<Self> {
        serde_yaml::from_str(content).map_err(|e| PrecacheError::Config {
            message: format!("invalid config: {}", e),
        })
    }

    /// Apply `PRECACHE_*` environment variables on top of `self`.
    pub fn apply_env(mut self) -> Self {
        if let Ok(origin) = std::env::var("PRECACHE_ORIGIN") {
            self.origin = origin;
        }
        if let Ok(name) = std::env::var("PRECACHE_CACHE_NAME") {
            self.cache_name = name;
        }
        if let Ok(dir) = std::env::var("PRECACHE_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(timeout) = std::env::var("PRECACHE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.timeout_secs = timeout;
        }
        if let Ok(seeds) = std::env::var("PRECACHE_SEED_URLS") {
            self.seed_urls = seeds
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    /// Set the origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the cache identifier.
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    /// Replace the seed list.
    pub fn with_seed_urls<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_urls = seeds.into_iter().map(Into::into).collect();
        self
    }

    /// Set the cache root directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parsed origin URL.
    pub fn origin_url(&self) -> PrecacheResult<Url> {
        Url::parse(&self.origin).map_err(|e| PrecacheError::InvalidUrl {
            url: self.origin.clone(),
            reason: e.to_string(),
        })
    }

    /// Resolve an absolute URL or an origin-relative path.
    pub fn resolve(&self, target: &str) -> PrecacheResult<Url> {
        if let Ok(url) = Url::parse(target) {
            return Ok(url);
        }
        self.origin_url()?
            .join(target)
            .map_err(|e| PrecacheError::InvalidUrl {
                url: target.to_string(),
                reason: e.to_string(),
            })
    }

    /// `GET` requests for every seed path, in order.
    pub fn seed_requests(&self) -> PrecacheResult<Vec<Request>> {
        self.seed_urls
            .iter()
            .map(|seed| self.resolve(seed).map(Request::get))
            .collect()
    }

    /// Cache storage rooted at `cache_dir`, or the default location.
    pub fn storage(&self) -> PrecacheResult<CacheStorage> {
        match &self.cache_dir {
            Some(dir) => Ok(CacheStorage::with_dir(dir)),
            None => CacheStorage::new(),
        }
    }
}
