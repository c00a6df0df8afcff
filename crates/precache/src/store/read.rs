//! Read path: entry lookup with integrity check, listings.

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use crate::digest::body_digest;
use crate::error::{PrecacheError, PrecacheResult};
use crate::types::{RequestKey, Response};

use super::{keys, Cache, EntryMeta, META_FILE};

pub(crate) async fn get_impl(cache: &Cache, key: &RequestKey) -> PrecacheResult<Option<Response>> {
    let entry_dir = cache.entry_dir(key);

    let meta_path = entry_dir.join(META_FILE);

    if !meta_path.exists() {
        debug!(cache = %cache.name, url = %key.url, "cache miss");
        return Ok(None);
    }

    let meta_content = fs::read_to_string(&meta_path)
        .await
        .map_err(|e| PrecacheError::Cache {
            message: format!("failed to read entry metadata: {}", e),
        })?;
    let metadata: EntryMeta =
        serde_json::from_str(&meta_content).map_err(|e| PrecacheError::Cache {
            message: format!("failed to parse entry metadata: {}", e),
        })?;

    let body_path = entry_dir.join(keys::body_file_impl(&metadata.digest)?);
    let body = match fs::read(&body_path).await {
        Ok(body) => body,
        // Pruned by a newer write between reading metadata and body.
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(cache = %cache.name, url = %key.url, "cache entry body missing, treating as miss");
            return Ok(None);
        }
        Err(e) => {
            return Err(PrecacheError::Cache {
                message: format!("failed to read cached body: {}", e),
            })
        }
    };

    let computed_digest = body_digest(&body);
    if computed_digest != metadata.digest {
        warn!(
            cache = %cache.name,
            url = %key.url,
            expected = %metadata.digest,
            actual = %computed_digest,
            "cache integrity check failed"
        );
        return Err(PrecacheError::Integrity {
            url: key.url.clone(),
            expected: metadata.digest,
            actual: computed_digest,
        });
    }

    debug!(cache = %cache.name, url = %key.url, "cache hit");
    Ok(Some(Response {
        status: metadata.status,
        headers: metadata.headers,
        body,
        url: metadata.response_url.unwrap_or(metadata.url),
    }))
}

async fn get_metadata_impl(entry_dir: &Path) -> Option<EntryMeta> {
    let content = fs::read_to_string(entry_dir.join(META_FILE)).await.ok()?;
    serde_json::from_str(&content).ok()
}

pub(crate) async fn list_impl(cache: &Cache) -> PrecacheResult<Vec<EntryMeta>> {
    let mut result = Vec::new();

    if !cache.dir.exists() {
        return Ok(result);
    }

    let mut entries = fs::read_dir(&cache.dir)
        .await
        .map_err(|e| PrecacheError::Cache {
            message: format!("failed to read cache directory: {}", e),
        })?;

    while let Some(entry) = entries.next_entry().await.map_err(|e| PrecacheError::Cache {
        message: format!("failed to read directory entry: {}", e),
    })? {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        if let Some(meta) = get_metadata_impl(&path).await {
            result.push(meta);
        }
    }

    result.sort_by(|a, b| a.url.cmp(&b.url));
    Ok(result)
}

pub(crate) async fn list_caches_impl(root: &Path) -> PrecacheResult<Vec<String>> {
    let mut names = Vec::new();

    if !root.exists() {
        return Ok(names);
    }

    let mut entries = fs::read_dir(root).await.map_err(|e| PrecacheError::Cache {
        message: format!("failed to read cache root: {}", e),
    })?;

    while let Some(entry) = entries.next_entry().await.map_err(|e| PrecacheError::Cache {
        message: format!("failed to read directory entry: {}", e),
    })? {
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with('.') {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}
