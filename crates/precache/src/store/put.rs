//! Single-entry write path.

use chrono::Utc;
use tracing::debug;

use crate::digest::body_digest;
use crate::error::{PrecacheError, PrecacheResult};
use crate::types::{RequestKey, Response};

use super::{evict, io, keys, Cache, EntryMeta, META_FILE};

pub(crate) async fn put_impl(
    cache: &Cache,
    key: &RequestKey,
    response: &Response,
) -> PrecacheResult<()> {
    if !key.is_cacheable() {
        return Err(PrecacheError::Cache {
            message: format!("only GET requests can be stored, got {}", key.method),
        });
    }

    let entry_dir = cache.entry_dir(key);
    io::ensure_dir_impl(&entry_dir).await?;

    let digest = body_digest(&response.body);
    let body_file = keys::body_file_impl(&digest)?;

    let metadata = EntryMeta {
        method: key.method.clone(),
        url: key.url.clone(),
        response_url: Some(response.url.clone()),
        status: response.status,
        headers: response.headers.clone(),
        digest,
        size: response.body.len() as u64,
        stored_at: Utc::now(),
    };

    // The metadata rename commits the entry; the body it names must already
    // be in place.
    io::write_atomic_impl(&entry_dir.join(&body_file), &response.body).await?;

    let meta_json = serde_json::to_vec_pretty(&metadata).map_err(|e| PrecacheError::Cache {
        message: format!("failed to serialize entry metadata: {}", e),
    })?;
    io::write_atomic_impl(&entry_dir.join(META_FILE), &meta_json).await?;

    evict::prune_bodies_impl(&entry_dir, &body_file).await;

    debug!(
        cache = %cache.name,
        url = %key.url,
        status = response.status,
        size = metadata.size,
        "stored response"
    );
    Ok(())
}
