//! Local cache implementations.
//!
//! [`FsLocalCache`] stores one directory per key:
//!
//! ```text
//! <root>/<key>/metadata.json
//! <root>/<key>/files/<bundle path>
//! ```
//!
//! Saves are written to a staging directory first and then swapped in, so a
//! reader never sees a half-written entry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use uuid::Uuid;
use walkdir::WalkDir;

use super::LocalCache;
use crate::error::{ProjectError, Result};
use crate::files::{validate_path, File, Files};
use crate::project::{Metadata, Snapshot};

/// Metadata file inside a cache entry.
const METADATA_FILE: &str = "metadata.json";

/// Directory holding the bundle inside a cache entry.
const FILES_DIR: &str = "files";

/// Directory-backed local cache.
#[derive(Debug, Clone)]
pub struct FsLocalCache {
    root: PathBuf,
}

impl FsLocalCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys with a stored entry, sorted.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys: Vec<String> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .filter(|entry| entry.path().join(METADATA_FILE).is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|key| !key.starts_with('.'))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Delete the entry under `key`. Returns false when there was none.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let dir = self.entry_dir(key)?;
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir).map_err(|e| ProjectError::CacheWriteError { path: dir, source: e })?;
        info!("Removed local cache entry {}", key);
        Ok(true)
    }

    fn entry_dir(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn read_entry(dir: &Path) -> Result<Option<Snapshot>> {
        let metadata_path = dir.join(METADATA_FILE);
        if !metadata_path.is_file() {
            return Ok(None);
        }
        let content = fs::read(&metadata_path).map_err(|e| ProjectError::CacheReadError {
            path: metadata_path.clone(),
            source: e,
        })?;
        let metadata: Metadata = serde_json::from_slice(&content)?;

        let files_dir = dir.join(FILES_DIR);
        let mut files = Files::new();
        if files_dir.is_dir() {
            for entry in WalkDir::new(&files_dir).min_depth(1) {
                let entry = entry.map_err(|e| ProjectError::CacheReadError {
                    path: files_dir.clone(),
                    source: e.into(),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let rel = entry
                    .path()
                    .strip_prefix(&files_dir)
                    .map_err(|e| ProjectError::Internal(e.to_string()))?;
                let rel = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let bytes = fs::read(entry.path()).map_err(|e| ProjectError::CacheReadError {
                    path: entry.path().to_path_buf(),
                    source: e,
                })?;
                files.insert(rel, File::from_bytes(bytes));
            }
        }
        Ok(Some(Snapshot::new(metadata, files)))
    }

    fn write_entry(root: &Path, key: &str, metadata: &Metadata, files: &Files) -> Result<()> {
        let staging = root.join(format!(".{}.{}", key, Uuid::new_v4()));
        let write = |path: &Path, content: &[u8]| -> Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| ProjectError::CacheWriteError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            fs::write(path, content).map_err(|e| ProjectError::CacheWriteError {
                path: path.to_path_buf(),
                source: e,
            })
        };

        let staged = (|| -> Result<()> {
            write(&staging.join(METADATA_FILE), &serde_json::to_vec_pretty(metadata)?)?;
            for (path, file) in files {
                validate_path(path)?;
                write(&staging.join(FILES_DIR).join(path), file.bytes())?;
            }
            Ok(())
        })();
        if let Err(e) = staged {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        let target = root.join(key);
        if target.exists() {
            fs::remove_dir_all(&target).map_err(|e| ProjectError::CacheWriteError {
                path: target.clone(),
                source: e,
            })?;
        }
        fs::rename(&staging, &target).map_err(|e| ProjectError::CacheWriteError { path: target, source: e })
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) {
        return Err(ProjectError::InvalidCacheKey { key: key.to_string() });
    }
    Ok(())
}

fn join_error(e: tokio::task::JoinError) -> ProjectError {
    ProjectError::Internal(format!("local cache task failed: {}", e))
}

impl LocalCache for FsLocalCache {
    async fn load(&self, key: &str) -> Result<Option<Snapshot>> {
        let dir = self.entry_dir(key)?;
        let snapshot = tokio::task::spawn_blocking(move || Self::read_entry(&dir))
            .await
            .map_err(join_error)??;
        if snapshot.is_none() {
            debug!("No local cache entry for {}", key);
        }
        Ok(snapshot)
    }

    async fn save(&self, key: &str, metadata: &Metadata, files: &Files) -> Result<()> {
        validate_key(key)?;
        let root = self.root.clone();
        let key_owned = key.to_string();
        let metadata = metadata.clone();
        let files = files.clone();
        tokio::task::spawn_blocking(move || Self::write_entry(&root, &key_owned, &metadata, &files))
            .await
            .map_err(join_error)??;
        debug!("Wrote local cache entry {}", key);
        Ok(())
    }
}

/// Local cache kept in process memory. Counts saves, which makes it handy
/// for observing the debounced sync.
#[derive(Debug, Default)]
pub struct MemoryLocalCache {
    entries: Mutex<HashMap<String, Snapshot>>,
    saves: AtomicUsize,
}

impl MemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Option<Snapshot> {
        self.entries().get(key).cloned()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Snapshot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocalCache for MemoryLocalCache {
    async fn load(&self, key: &str) -> Result<Option<Snapshot>> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, metadata: &Metadata, files: &Files) -> Result<()> {
        self.entries()
            .insert(key.to_string(), Snapshot::new(metadata.clone(), files.clone()));
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn snapshot() -> Snapshot {
        let mut files = Files::new();
        files.insert("main.spx".into(), File::from_text("onStart => {}"));
        files.insert("assets/index.json".into(), File::from_text("{}"));
        files.insert("assets/sprites/Ball/index.json".into(), File::from_text("{}"));
        Snapshot::new(Metadata::named("Pong"), files)
    }

    #[tokio::test]
    async fn test_fs_cache_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = FsLocalCache::new(dir.path());
        let expected = snapshot();

        cache.save("draft", &expected.metadata, &expected.files).await.unwrap();
        let loaded = cache.load("draft").await.unwrap();
        assert_eq!(loaded, Some(expected));
        assert_eq!(cache.list_keys().unwrap(), vec!["draft".to_string()]);
    }

    #[tokio::test]
    async fn test_fs_cache_overwrite_drops_stale_files() {
        let dir = TempDir::new().unwrap();
        let cache = FsLocalCache::new(dir.path());
        let first = snapshot();
        cache.save("draft", &first.metadata, &first.files).await.unwrap();

        let mut files = Files::new();
        files.insert("main.spx".into(), File::from_text("// empty"));
        cache.save("draft", &Metadata::named("Pong"), &files).await.unwrap();

        let loaded = cache.load("draft").await.unwrap().unwrap();
        assert_eq!(loaded.files, files);
        assert_eq!(cache.list_keys().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fs_cache_missing_key() {
        let dir = TempDir::new().unwrap();
        let cache = FsLocalCache::new(dir.path());
        assert_eq!(cache.load("nothing").await.unwrap(), None);
        assert!(!cache.remove("nothing").unwrap());
    }

    #[tokio::test]
    async fn test_fs_cache_rejects_bad_keys() {
        let dir = TempDir::new().unwrap();
        let cache = FsLocalCache::new(dir.path());
        for key in ["", "../up", ".hidden", "a/b"] {
            let err = cache.load(key).await.unwrap_err();
            assert_eq!(err.error_code(), "INVALID_CACHE_KEY");
        }
    }

    #[tokio::test]
    async fn test_fs_cache_remove() {
        let dir = TempDir::new().unwrap();
        let cache = FsLocalCache::new(dir.path());
        let s = snapshot();
        cache.save("draft", &s.metadata, &s.files).await.unwrap();
        assert!(cache.remove("draft").unwrap());
        assert_eq!(cache.load("draft").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_cache_counts_saves() {
        let cache = MemoryLocalCache::new();
        let s = snapshot();
        cache.save("a", &s.metadata, &s.files).await.unwrap();
        cache.save("a", &s.metadata, &s.files).await.unwrap();
        assert_eq!(cache.save_count(), 2);
        assert_eq!(cache.load("a").await.unwrap(), Some(s));
        assert_eq!(cache.load("b").await.unwrap(), None);
    }
}
