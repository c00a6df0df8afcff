//! Named response stores on disk.
//!
//! A [`CacheStorage`] owns a root directory; each named [`Cache`] is a
//! sub-directory of it. Opening a name that does not exist yet creates an
//! empty store, so renaming the cache identifier starts from nothing.
//!
//! # Layout
//!
//! ```text
//! {root}/{cache_name}/{sha256("METHOD url")}/
//!   response.json    # Entry metadata (status, headers, body digest)
//!   body-{sha256}    # Raw body bytes, named by digest
//! ```
//!
//! A body file is written before the metadata naming it, so replacing
//! `response.json` is the single point where an entry switches over. Bodies
//! are verified against the recorded digest on every read.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Fetcher;
use crate::error::PrecacheResult;
use crate::types::{Request, RequestKey, Response};

mod batch;
mod evict;
mod headers;
mod io;
mod keys;
mod put;
mod read;

const META_FILE: &str = "response.json";
const BODY_PREFIX: &str = "body-";

/// Metadata stored alongside a cached body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Request method the entry was stored under.
    pub method: String,

    /// Request URL the entry was stored under (fragment removed).
    pub url: String,

    /// Final URL of the stored response, after redirects.
    #[serde(default)]
    pub response_url: Option<String>,

    /// HTTP status of the stored response.
    pub status: u16,

    /// Response headers in wire order.
    #[serde(default, with = "headers")]
    pub headers: Vec<(String, Vec<u8>)>,

    /// Body digest (sha256:...).
    pub digest: String,

    /// Body size in bytes.
    pub size: u64,

    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
}

/// Root of all named stores.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    /// Storage at the default location.
    ///
    /// Default: `{platform cache dir}/precache/caches`
    pub fn new() -> PrecacheResult<Self> {
        let root = io::default_root_impl()?;
        Ok(Self { root })
    }

    /// Storage rooted at a custom directory.
    pub fn with_dir(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open the store named `name`, creating it if missing.
    pub async fn open(&self, name: &str) -> PrecacheResult<Cache> {
        keys::validate_cache_name_impl(name)?;
        let dir = self.root.join(name);
        io::ensure_dir_impl(&dir).await?;
        Ok(Cache {
            name: name.to_string(),
            dir,
        })
    }

    /// Whether a store named `name` exists.
    pub async fn has(&self, name: &str) -> bool {
        keys::validate_cache_name_impl(name).is_ok() && self.root.join(name).is_dir()
    }

    /// Delete the store named `name`. Returns `false` if it did not exist.
    pub async fn delete(&self, name: &str) -> PrecacheResult<bool> {
        keys::validate_cache_name_impl(name)?;
        evict::delete_cache_impl(&self.root, name).await
    }

    /// Names of all stores, sorted.
    pub async fn keys(&self) -> PrecacheResult<Vec<String>> {
        read::list_caches_impl(&self.root).await
    }
}

/// Handle to one named store.
#[derive(Debug, Clone)]
pub struct Cache {
    name: String,
    dir: PathBuf,
}

impl Cache {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_dir(&self, key: &RequestKey) -> PathBuf {
        keys::entry_dir_impl(&self.dir, key)
    }

    /// Look up the stored response for `request`.
    ///
    /// Returns `None` for misses and for any non-`GET` request.
    /// Returns `Err` if the stored body fails its integrity check.
    pub async fn match_request(&self, request: &Request) -> PrecacheResult<Option<Response>> {
        let key = RequestKey::from_request(request);
        if !key.is_cacheable() {
            return Ok(None);
        }
        read::get_impl(self, &key).await
    }

    /// Store `response` under `request`, replacing any existing entry.
    pub async fn put(&self, request: &Request, response: &Response) -> PrecacheResult<()> {
        put::put_impl(self, &RequestKey::from_request(request), response).await
    }

    /// Fetch every request and store all responses, or none of them.
    ///
    /// All fetches must succeed with a 2xx status before anything is
    /// written. If a write fails, entries written by this call are rolled
    /// back to their previous state. Returns the number of entries written.
    pub async fn add_all(&self, fetcher: &dyn Fetcher, requests: &[Request]) -> PrecacheResult<usize> {
        batch::add_all_impl(self, fetcher, requests).await
    }

    /// Remove the entry for `request`. Returns `false` if there was none.
    pub async fn delete(&self, request: &Request) -> PrecacheResult<bool> {
        evict::delete_impl(self, &RequestKey::from_request(request)).await
    }

    /// Metadata of every stored entry, sorted by URL.
    pub async fn keys(&self) -> PrecacheResult<Vec<EntryMeta>> {
        read::list_impl(self).await
    }

    /// Number of stored entries.
    pub async fn len(&self) -> PrecacheResult<usize> {
        Ok(self.keys().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::body_digest;
    use crate::error::PrecacheError;
    use reqwest::Method;
    use tempfile::TempDir;
    use tokio::fs;
    use url::Url;

    async fn create_test_cache(name: &str) -> (CacheStorage, Cache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = CacheStorage::with_dir(temp_dir.path().join("caches"));
        let cache = storage.open(name).await.unwrap();
        (storage, cache, temp_dir)
    }

    fn request(path: &str) -> Request {
        Request::get(Url::parse("http://localhost:5000").unwrap().join(path).unwrap())
    }

    fn response(body: &str) -> Response {
        Response {
            status: 200,
            headers: vec![("content-type".to_string(), b"text/plain".to_vec())],
            body: body.as_bytes().to_vec(),
            url: "http://localhost:5000/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;

        cache.put(&request("/"), &response("index")).await.unwrap();

        let hit = cache.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "index");
        assert_eq!(hit.status, 200);
        assert_eq!(hit.header("content-type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_match_miss() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;

        let miss = cache.match_request(&request("/unknown.png")).await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_match_ignores_fragment() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;

        cache.put(&request("/"), &response("index")).await.unwrap();

        let hit = cache.match_request(&request("/#section")).await.unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn test_non_get_never_matches() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        let mut post = request("/");
        post.method = Method::POST;
        assert!(cache.match_request(&post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_rejects_non_get() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;

        let mut post = request("/login");
        post.method = Method::POST;
        let err = cache.put(&post, &response("ok")).await.unwrap_err();
        assert!(matches!(err, PrecacheError::Cache { .. }));
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_put_replaces_entry() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;

        cache.put(&request("/"), &response("old")).await.unwrap();
        cache.put(&request("/"), &response("new")).await.unwrap();

        let hit = cache.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "new");
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_body_fails_integrity() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        let key = RequestKey::from_request(&request("/"));
        let body_file = keys::body_file_impl(&body_digest(b"index")).unwrap();
        fs::write(cache.entry_dir(&key).join(body_file), "tampered")
            .await
            .unwrap();

        let err = cache.match_request(&request("/")).await.unwrap_err();
        assert!(
            matches!(err, PrecacheError::Integrity { .. }),
            "Should detect corruption: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_corrupt_metadata_is_cache_error() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        let key = RequestKey::from_request(&request("/"));
        let meta_path = cache.entry_dir(&key).join(META_FILE);
        fs::write(&meta_path, "not json").await.unwrap();

        let result = cache.match_request(&request("/")).await;
        assert!(matches!(result, Err(PrecacheError::Cache { .. })));
    }

    #[tokio::test]
    async fn test_metadata_digest_cannot_escape_entry() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        let key = RequestKey::from_request(&request("/"));
        let meta_path = cache.entry_dir(&key).join(META_FILE);
        let mut meta: serde_json::Value =
            serde_json::from_slice(&fs::read(&meta_path).await.unwrap()).unwrap();
        meta["digest"] = serde_json::json!("sha256:../../../etc/passwd");
        fs::write(&meta_path, serde_json::to_vec(&meta).unwrap())
            .await
            .unwrap();

        let result = cache.match_request(&request("/")).await;
        assert!(matches!(result, Err(PrecacheError::Cache { .. })));
    }

    #[tokio::test]
    async fn test_hit_returns_stored_response_unchanged() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;

        // Served from a redirect target, with a non-ASCII and a non-UTF-8 value.
        let stored = Response {
            status: 200,
            headers: vec![
                ("content-type".to_string(), b"application/pdf".to_vec()),
                (
                    "content-disposition".to_string(),
                    "attachment; filename=\"résumé.pdf\"".as_bytes().to_vec(),
                ),
                ("x-legacy".to_string(), vec![0xe9, 0x74, 0xe9]),
                ("set-cookie".to_string(), b"a=1".to_vec()),
                ("set-cookie".to_string(), b"b=2".to_vec()),
            ],
            body: b"%PDF-1.7".to_vec(),
            url: "http://localhost:5000/login".to_string(),
        };
        cache.put(&request("/"), &stored).await.unwrap();

        let hit = cache.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit, stored);

        let meta = &cache.keys().await.unwrap()[0];
        assert_eq!(meta.url, "http://localhost:5000/");
        assert_eq!(meta.response_url.as_deref(), Some("http://localhost:5000/login"));
    }

    #[tokio::test]
    async fn test_metadata_without_response_url_falls_back_to_key() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        let key = RequestKey::from_request(&request("/"));
        let meta_path = cache.entry_dir(&key).join(META_FILE);
        let mut meta: serde_json::Value =
            serde_json::from_slice(&fs::read(&meta_path).await.unwrap()).unwrap();
        meta.as_object_mut().unwrap().remove("response_url");
        fs::write(&meta_path, serde_json::to_vec(&meta).unwrap())
            .await
            .unwrap();

        let hit = cache.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit.url, "http://localhost:5000/");
    }

    #[tokio::test]
    async fn test_overwrite_keeps_one_body_file() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("old")).await.unwrap();
        cache.put(&request("/"), &response("new")).await.unwrap();

        let entry_dir = cache.entry_dir(&RequestKey::from_request(&request("/")));
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&entry_dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();

        assert_eq!(
            names,
            vec![
                keys::body_file_impl(&body_digest(b"new")).unwrap(),
                META_FILE.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_uncommitted_body_does_not_replace_entry() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("old")).await.unwrap();

        // A writer that stopped after the body and before the metadata.
        let entry_dir = cache.entry_dir(&RequestKey::from_request(&request("/")));
        let next_body = keys::body_file_impl(&body_digest(b"new")).unwrap();
        fs::write(entry_dir.join(next_body), "new").await.unwrap();

        let hit = cache.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "old");

        // The next committed write clears the leftover.
        cache.put(&request("/"), &response("newer")).await.unwrap();
        let hit = cache.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "newer");
        assert_eq!(std::fs::read_dir(&entry_dir).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_committed_metadata_with_missing_body_is_miss() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        let entry_dir = cache.entry_dir(&RequestKey::from_request(&request("/")));
        let body_file = keys::body_file_impl(&body_digest(b"index")).unwrap();
        fs::remove_file(entry_dir.join(body_file)).await.unwrap();

        assert!(cache.match_request(&request("/")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        assert!(cache.delete(&request("/")).await.unwrap());
        assert!(!cache.delete(&request("/")).await.unwrap());
        assert!(cache.match_request(&request("/")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_sorted_by_url() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache
            .put(&request("/static/js/main.js"), &response("js"))
            .await
            .unwrap();
        cache.put(&request("/"), &response("index")).await.unwrap();

        let urls: Vec<String> = cache
            .keys()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.url)
            .collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:5000/".to_string(),
                "http://localhost:5000/static/js/main.js".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_temp_files_after_put() {
        let (_storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        let entry_dir = cache.entry_dir(&RequestKey::from_request(&request("/")));
        let mut entries = fs::read_dir(&entry_dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            assert!(
                !name_str.ends_with(".tmp"),
                "Temp file should not remain: {}",
                name_str
            );
        }
    }

    #[tokio::test]
    async fn test_renamed_cache_starts_empty() {
        let (storage, v1, _temp_dir) = create_test_cache("app-cache-v1").await;
        v1.put(&request("/"), &response("index")).await.unwrap();

        let v2 = storage.open("app-cache-v2").await.unwrap();
        assert_eq!(v2.len().await.unwrap(), 0);
        assert!(v2.match_request(&request("/")).await.unwrap().is_none());

        // The old store is orphaned, not merged or removed.
        assert_eq!(v1.len().await.unwrap(), 1);
        assert_eq!(
            storage.keys().await.unwrap(),
            vec!["app-cache-v1".to_string(), "app-cache-v2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_reopen_sees_existing_entries() {
        let (storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        let reopened = storage.open("app-cache-v1").await.unwrap();
        assert!(reopened.match_request(&request("/")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_cache() {
        let (storage, cache, _temp_dir) = create_test_cache("app-cache-v1").await;
        cache.put(&request("/"), &response("index")).await.unwrap();

        assert!(storage.has("app-cache-v1").await);
        assert!(storage.delete("app-cache-v1").await.unwrap());
        assert!(!storage.has("app-cache-v1").await);
        assert!(!storage.delete("app-cache-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_rejects_path_names() {
        let temp_dir = TempDir::new().unwrap();
        let storage = CacheStorage::with_dir(temp_dir.path());

        for name in ["", ".", "..", "a/b", "a\\b"] {
            let err = storage.open(name).await.unwrap_err();
            assert!(matches!(err, PrecacheError::Cache { .. }), "{name:?}");
        }
    }

    #[tokio::test]
    async fn test_keys_on_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let storage = CacheStorage::with_dir(temp_dir.path().join("missing"));
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
