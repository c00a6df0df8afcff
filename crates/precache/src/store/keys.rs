//! Store name validation and entry path derivation.

use std::path::{Path, PathBuf};

use crate::error::{PrecacheError, PrecacheResult};
use crate::types::RequestKey;

use super::BODY_PREFIX;

pub(crate) fn validate_cache_name_impl(name: &str) -> PrecacheResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(PrecacheError::Cache {
            message: format!("invalid cache name: {:?}", name),
        });
    }
    Ok(())
}

pub(crate) fn entry_dir_impl(cache_dir: &Path, key: &RequestKey) -> PathBuf {
    cache_dir.join(key.digest())
}

/// File name of the body with `digest` (`sha256:<hex>`) inside an entry.
pub(crate) fn body_file_impl(digest: &str) -> PrecacheResult<String> {
    let hex = digest
        .strip_prefix("sha256:")
        .filter(|h| h.len() == 64 && h.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| PrecacheError::Cache {
            message: format!("invalid body digest: {:?}", digest),
        })?;
    Ok(format!("{}{}", BODY_PREFIX, hex))
}
