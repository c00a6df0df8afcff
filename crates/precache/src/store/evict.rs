//! Entry and store removal.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::{PrecacheError, PrecacheResult};
use crate::types::RequestKey;

use super::{Cache, BODY_PREFIX};

pub(crate) async fn delete_impl(cache: &Cache, key: &RequestKey) -> PrecacheResult<bool> {
    let entry_dir = cache.entry_dir(key);

    if !entry_dir.exists() {
        return Ok(false);
    }

    fs::remove_dir_all(&entry_dir)
        .await
        .map_err(|e| PrecacheError::Cache {
            message: format!("failed to delete cache entry: {}", e),
        })?;
    debug!(cache = %cache.name, url = %key.url, "deleted cache entry");

    Ok(true)
}

pub(crate) async fn delete_cache_impl(root: &Path, name: &str) -> PrecacheResult<bool> {
    let dir = root.join(name);

    if !dir.exists() {
        return Ok(false);
    }

    fs::remove_dir_all(&dir)
        .await
        .map_err(|e| PrecacheError::Cache {
            message: format!("failed to delete cache {}: {}", name, e),
        })?;
    debug!(cache = name, "deleted cache");

    Ok(true)
}

/// Remove every body file in `entry_dir` except `keep`. Failures are logged
/// and left for the next write.
pub(crate) async fn prune_bodies_impl(entry_dir: &Path, keep: &str) {
    let mut entries = match fs::read_dir(entry_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %entry_dir.display(), error = %e, "failed to scan entry for stale bodies");
            return;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(BODY_PREFIX) || name == keep {
            continue;
        }
        if let Err(e) = fs::remove_file(entry.path()).await {
            debug!(dir = %entry_dir.display(), file = %name, error = %e, "failed to remove stale body");
        }
    }
}
