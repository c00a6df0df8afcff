//! Cache-first fetch worker with install-time pre-caching.
//!
//! This crate provides:
//!
//! - Named on-disk response stores with integrity verification on read
//! - An install step that pre-caches a fixed seed list, all or nothing
//! - A fetch step that serves from the store and falls back to the network
//! - A `reqwest`-backed network fetcher behind the [`Fetcher`] trait
//!
//! # Quick Start
//!
//! ```no_run
//! use precache::{CacheFirstWorker, Lifecycle, WorkerConfig};
//!
//! # async fn example() -> Result<(), precache::PrecacheError> {
//! let config = WorkerConfig::from_env();
//! let worker = CacheFirstWorker::from_config(&config).await?;
//!
//! // Pre-cache the seed list
//! let report = worker.on_install().await?;
//! println!("cached {} entries in {}", report.stored, report.cache_name);
//!
//! // Serve a request, cache first
//! let request = precache::Request::get(config.resolve("/")?);
//! let outcome = worker.on_fetch(request).await?;
//! println!("{} from {}", outcome.response.status, outcome.source);
//! # Ok(())
//! # }
//! ```
//!
//! # Versioning
//!
//! The cache identifier (`cache_name`, default `app-cache-v1`) is the only
//! versioning mechanism. Installing under a new identifier starts from an
//! empty store; stores under old identifiers are left in place untouched.

pub mod client;
pub mod config;
mod digest;
pub mod error;
pub mod store;
pub mod types;
pub mod worker;

// Re-export main types
pub use client::{Fetcher, HttpFetcher, PRECACHE_USER_AGENT};
pub use config::{WorkerConfig, DEFAULT_CACHE_NAME};
pub use error::{PrecacheError, PrecacheResult};
pub use store::{Cache, CacheStorage, EntryMeta};
pub use types::{Request, RequestKey, Response};
pub use worker::{CacheFirstWorker, FetchOutcome, FetchSource, InstallReport, Lifecycle};

pub use reqwest::Method;
pub use url::Url;
