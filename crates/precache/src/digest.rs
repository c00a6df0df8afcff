//! SHA-256 helpers shared by the store.

use sha2::{Digest, Sha256};

/// Digest of a response body in `sha256:<hex>` form.
pub(crate) fn body_digest(body: &[u8]) -> String {
    format!("sha256:{}", sha256_hex(body))
}

/// Lowercase hex SHA-256 of raw bytes.
pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
