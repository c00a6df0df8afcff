//! Filesystem helpers: default root, directory creation, atomic writes.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{PrecacheError, PrecacheResult};

pub(crate) fn default_root_impl() -> PrecacheResult<PathBuf> {
    let base = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| PrecacheError::Cache {
            message: "could not determine cache directory".to_string(),
        })?;

    Ok(base.join("precache").join("caches"))
}

pub(crate) async fn ensure_dir_impl(dir: &Path) -> PrecacheResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| PrecacheError::Cache {
            message: format!("failed to create cache directory {}: {}", dir.display(), e),
        })
}

pub(crate) async fn write_atomic_impl(path: &Path, content: &[u8]) -> PrecacheResult<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)
        .await
        .map_err(|e| PrecacheError::Cache {
            message: format!("failed to write temp file: {}", e),
        })?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| PrecacheError::Cache {
            message: format!("failed to rename temp file: {}", e),
        })?;

    Ok(())
}
