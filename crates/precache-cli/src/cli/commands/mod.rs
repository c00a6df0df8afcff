mod caches;
mod delete_cache;
mod dispatch;
mod fetch;
mod install;
mod list;

pub use dispatch::dispatch;

use precache::WorkerConfig;

use super::args::GlobalArgs;

/// Build the worker config: file (or env-only defaults), then CLI flags.
pub(crate) fn load_config(global: &GlobalArgs) -> anyhow::Result<WorkerConfig> {
    let mut config = match &global.config {
        Some(path) => WorkerConfig::from_file(path)?,
        None => WorkerConfig::from_env(),
    };

    if let Some(origin) = &global.origin {
        config = config.with_origin(origin);
    }
    if let Some(name) = &global.cache_name {
        config = config.with_cache_name(name);
    }
    if let Some(dir) = &global.cache_dir {
        config = config.with_cache_dir(dir);
    }

    tracing::debug!(
        origin = %config.origin,
        cache = %config.cache_name,
        seeds = config.seed_urls.len(),
        "loaded config"
    );
    Ok(config)
}
