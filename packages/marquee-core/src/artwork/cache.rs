//! Content-addressed on-disk artwork cache.
//!
//! Each media item owns one directory named after the SHA-224 digest of its
//! guid, holding a single `thumb.jpg`. Entries are published atomically: the
//! bytes are written into a private staging directory which is then renamed
//! into place, so concurrent creators for the same key never observe a
//! half-written entry and the loser simply discards its copy.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha224};
use thiserror::Error;
use uuid::Uuid;

use crate::protocol_constants::{STAGING_DIR_PREFIX, THUMBNAIL_FILE_NAME};

/// Errors raised while reading or writing cache entries.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenient Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Deterministic cache key derived from a media guid.
///
/// Lowercase hex SHA-224, so it is always 56 characters and safe to use as a
/// directory name whatever the guid contains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn from_guid(guid: &str) -> Self {
        Self(format!("{:x}", Sha224::digest(guid.as_bytes())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of [`ThumbnailCache::fetch_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// An entry already existed; the supplied bytes (if any) were not written.
    Found(PathBuf),
    /// The supplied bytes were stored as a new entry.
    Created(PathBuf),
    /// No entry exists and no bytes were supplied.
    NotAvailable,
}

impl CacheLookup {
    /// Path of the stored artwork, if there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            CacheLookup::Found(path) | CacheLookup::Created(path) => Some(path),
            CacheLookup::NotAvailable => None,
        }
    }
}

/// On-disk store of one artwork image per media item.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    root: PathBuf,
}

impl ThumbnailCache {
    /// Opens (creating if needed) the cache rooted at `root`.
    ///
    /// Staging directories left behind by an interrupted write are removed.
    pub async fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| CacheError::io("create cache root", &root, e))?;

        let cache = Self { root };
        cache.sweep_staging().await;
        log::info!("[Cache] Using artwork cache at {}", cache.root.display());
        Ok(cache)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the entry for `key`.
    #[must_use]
    pub fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Path of the stored artwork for `key` (whether or not it exists yet).
    #[must_use]
    pub fn thumbnail_path(&self, key: &CacheKey) -> PathBuf {
        self.entry_dir(key).join(THUMBNAIL_FILE_NAME)
    }

    /// Returns the stored artwork for `key`, storing `image` first if absent.
    ///
    /// Existing entries are returned untouched, so repeated playback of
    /// cached media never rewrites artwork. If two callers race to create the
    /// same key, exactly one publishes its bytes and both get the same path.
    ///
    /// Contents are not validated: artwork that later fails to decode keeps
    /// being returned until [`evict`](Self::evict) removes it. An entry
    /// directory without artwork in it is replaced.
    pub async fn fetch_or_create(
        &self,
        key: &CacheKey,
        image: Option<&[u8]>,
    ) -> CacheResult<CacheLookup> {
        let path = self.thumbnail_path(key);
        if self.is_published(&path).await? {
            log::debug!("[Cache] Hit for {}", key);
            return Ok(CacheLookup::Found(path));
        }

        let Some(bytes) = image else {
            log::info!("[Cache] No artwork cached for {} and none attached", key);
            return Ok(CacheLookup::NotAvailable);
        };

        let staging = self
            .root
            .join(format!("{STAGING_DIR_PREFIX}{}", Uuid::new_v4()));
        if let Err(e) = self.stage(&staging, bytes).await {
            discard(&staging).await;
            return Err(e);
        }

        let entry = self.entry_dir(key);
        let mut published = tokio::fs::rename(&staging, &entry).await;
        if published.is_err() && self.clear_entry_without_artwork(key, &entry, &path).await {
            published = tokio::fs::rename(&staging, &entry).await;
        }
        match published {
            Ok(()) => {
                log::debug!(
                    "[Cache] Stored {} bytes of artwork for {}",
                    bytes.len(),
                    key
                );
                Ok(CacheLookup::Created(path))
            }
            Err(e) => {
                discard(&staging).await;
                if self.is_published(&path).await? {
                    log::debug!("[Cache] Lost creation race for {}; using stored artwork", key);
                    Ok(CacheLookup::Found(path))
                } else {
                    Err(CacheError::io("publish cache entry", &entry, e))
                }
            }
        }
    }

    /// Removes the entry for `key`.
    ///
    /// A missing entry is not an error, and other I/O failures are logged
    /// and swallowed so a stop notification always completes. Returns
    /// whether an entry was actually removed.
    pub async fn evict(&self, key: &CacheKey) -> bool {
        let entry = self.entry_dir(key);
        match tokio::fs::remove_dir_all(&entry).await {
            Ok(()) => {
                log::debug!("[Cache] Evicted {}", key);
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("[Cache] Nothing to evict for {}", key);
                false
            }
            Err(e) => {
                log::warn!("[Cache] Failed to evict {}: {}", entry.display(), e);
                false
            }
        }
    }

    async fn is_published(&self, path: &Path) -> CacheResult<bool> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| CacheError::io("stat", path, e))
    }

    /// Moves aside an entry directory that exists but holds no artwork.
    /// Returns whether one was cleared.
    async fn clear_entry_without_artwork(
        &self,
        key: &CacheKey,
        entry: &Path,
        path: &Path,
    ) -> bool {
        let entry_exists = tokio::fs::try_exists(entry).await.unwrap_or(false);
        let artwork_exists = tokio::fs::try_exists(path).await.unwrap_or(true);
        if !entry_exists || artwork_exists {
            return false;
        }

        let aside = self
            .root
            .join(format!("{STAGING_DIR_PREFIX}{}", Uuid::new_v4()));
        match tokio::fs::rename(entry, &aside).await {
            Ok(()) => {
                log::warn!("[Cache] Replacing entry without artwork for {}", key);
                discard(&aside).await;
                true
            }
            Err(e) => {
                log::warn!("[Cache] Failed to clear {}: {}", entry.display(), e);
                false
            }
        }
    }

    async fn stage(&self, staging: &Path, bytes: &[u8]) -> CacheResult<()> {
        tokio::fs::create_dir(staging)
            .await
            .map_err(|e| CacheError::io("create staging directory", staging, e))?;
        let file = staging.join(THUMBNAIL_FILE_NAME);
        tokio::fs::write(&file, bytes)
            .await
            .map_err(|e| CacheError::io("write artwork", &file, e))
    }

    async fn sweep_staging(&self) {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("[Cache] Failed to scan {}: {}", self.root.display(), e);
                return;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with(STAGING_DIR_PREFIX)
            {
                log::debug!(
                    "[Cache] Removing stale staging directory {}",
                    entry.path().display()
                );
                discard(&entry.path()).await;
            }
        }
    }
}

async fn discard(staging: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(staging).await {
        if e.kind() != ErrorKind::NotFound {
            log::warn!("[Cache] Failed to remove {}: {}", staging.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn cache_in(dir: &TempDir) -> ThumbnailCache {
        ThumbnailCache::open(dir.path().join("tmp")).await.unwrap()
    }

    fn entries(cache: &ThumbnailCache) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(cache.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn cache_key_is_sha224_hex() {
        let key = CacheKey::from_guid("plex://movie/5d776b59ad5437001f79c6f8");
        assert_eq!(key.as_str().len(), 56);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            CacheKey::from_guid("").as_str(),
            "d14a028c2a3a2bc9476102bb288234c415a2b01f828ea62ac5b3e42f"
        );
    }

    #[test]
    fn cache_key_is_deterministic() {
        let a = CacheKey::from_guid("com.plexapp.agents.imdb://tt0111161");
        let b = CacheKey::from_guid("com.plexapp.agents.imdb://tt0111161");
        let c = CacheKey::from_guid("com.plexapp.agents.imdb://tt0068646");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn missing_entry_without_bytes_is_not_available() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let key = CacheKey::from_guid("guid");

        let lookup = cache.fetch_or_create(&key, None).await.unwrap();
        assert_eq!(lookup, CacheLookup::NotAvailable);
        assert!(entries(&cache).is_empty());
    }

    #[tokio::test]
    async fn creates_entry_from_bytes() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let key = CacheKey::from_guid("guid");

        let lookup = cache.fetch_or_create(&key, Some(&b"jpeg"[..])).await.unwrap();
        assert_eq!(lookup, CacheLookup::Created(cache.thumbnail_path(&key)));
        assert_eq!(std::fs::read(cache.thumbnail_path(&key)).unwrap(), b"jpeg");
        assert_eq!(entries(&cache), vec![key.to_string()]);
    }

    #[tokio::test]
    async fn existing_entry_is_never_rewritten() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let key = CacheKey::from_guid("guid");

        let first = cache.fetch_or_create(&key, Some(&b"first"[..])).await.unwrap();
        let second = cache.fetch_or_create(&key, Some(&b"second"[..])).await.unwrap();
        let third = cache.fetch_or_create(&key, None).await.unwrap();

        assert!(matches!(first, CacheLookup::Created(_)));
        assert!(matches!(second, CacheLookup::Found(_)));
        assert_eq!(first.path(), second.path());
        assert_eq!(second, third);
        assert_eq!(std::fs::read(cache.thumbnail_path(&key)).unwrap(), b"first");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creators_share_one_entry() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(cache_in(&dir).await);
        let key = CacheKey::from_guid("plex://episode/race");

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                tokio::spawn(async move {
                    let bytes = vec![i; 1024];
                    cache.fetch_or_create(&key, Some(bytes.as_slice())).await.unwrap()
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            let lookup = handle.await.unwrap();
            if matches!(lookup, CacheLookup::Created(_)) {
                created += 1;
            }
            assert_eq!(lookup.path(), Some(cache.thumbnail_path(&key).as_path()));
        }

        assert_eq!(created, 1);
        assert_eq!(entries(&cache), vec![key.to_string()]);
        let stored = std::fs::read(cache.thumbnail_path(&key)).unwrap();
        assert_eq!(stored.len(), 1024);
        assert!(stored.iter().all(|b| *b == stored[0]));
    }

    #[tokio::test]
    async fn entry_without_artwork_is_replaced() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let key = CacheKey::from_guid("guid");
        std::fs::create_dir_all(cache.entry_dir(&key)).unwrap();
        std::fs::write(cache.entry_dir(&key).join("leftover"), b"x").unwrap();

        let lookup = cache.fetch_or_create(&key, Some(&b"jpeg"[..])).await.unwrap();
        assert_eq!(lookup, CacheLookup::Created(cache.thumbnail_path(&key)));
        assert_eq!(std::fs::read(cache.thumbnail_path(&key)).unwrap(), b"jpeg");
        assert!(!cache.entry_dir(&key).join("leftover").exists());
        assert_eq!(entries(&cache), vec![key.to_string()]);
    }

    #[tokio::test]
    async fn evict_removes_entry() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let key = CacheKey::from_guid("guid");
        cache.fetch_or_create(&key, Some(&b"jpeg"[..])).await.unwrap();

        assert!(cache.evict(&key).await);
        assert!(!cache.entry_dir(&key).exists());
        assert_eq!(
            cache.fetch_or_create(&key, None).await.unwrap(),
            CacheLookup::NotAvailable
        );
    }

    #[tokio::test]
    async fn evict_of_unknown_key_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        assert!(!cache.evict(&CacheKey::from_guid("never-played")).await);
    }

    #[tokio::test]
    async fn open_sweeps_stale_staging_directories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tmp");
        std::fs::create_dir_all(root.join(".staging-leftover")).unwrap();
        std::fs::write(root.join(".staging-leftover").join("thumb.jpg"), b"x").unwrap();
        std::fs::create_dir_all(root.join("keep")).unwrap();

        let cache = ThumbnailCache::open(&root).await.unwrap();
        assert_eq!(entries(&cache), vec!["keep".to_string()]);
    }
}
