//! Whole-file JSON collection store.
//!
//! Every mutation is a read-modify-write cycle over the complete file.
//! Cycles are serialized through a per-store async mutex, so two writers
//! in the same process can never interleave and lose each other's
//! updates. New content is written to a sibling temp file and renamed
//! into place; readers see either the old or the new collection, never a
//! partial one.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Disk or format failure in the backing file.
///
/// The message names the file for operators; the HTTP layer logs it and
/// returns a generic message so the path never reaches callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed collection file {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn serialization(path: &Path, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A collection of `T` persisted as one JSON array.
#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole collection. A missing or blank file is empty.
    pub async fn load(&self) -> Result<Vec<T>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| StoreError::serialization(&self.path, e))
    }

    /// Run one read-modify-write cycle.
    ///
    /// `apply` returns `None` to leave the file untouched (e.g. the target
    /// record does not exist) or `Some(result)` to persist the modified
    /// collection and hand `result` back.
    pub async fn mutate<R, F>(&self, apply: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Option<R>,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let Some(result) = apply(&mut items) else {
            return Ok(None);
        };
        self.persist(&items).await?;
        Ok(Some(result))
    }

    async fn persist(&self, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(items)
            .map_err(|e| StoreError::serialization(&self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(&json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(&tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), records = items.len(), "Collection written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        name: String,
    }

    fn store_in(dir: &Path) -> JsonStore<Item> {
        JsonStore::new(dir.join("items.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_file_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        std::fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mutate_persists_changes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());

        let added = store
            .mutate(|items| {
                items.push(Item { id: 1, name: "one".into() });
                Some(items.len())
            })
            .await
            .unwrap();
        assert_eq!(added, Some(1));

        let reopened = store_in(tmp.path());
        assert_eq!(
            reopened.load().await.unwrap(),
            vec![Item { id: 1, name: "one".into() }]
        );
        assert!(!tmp.path().join("items.json.tmp").exists());
    }

    #[tokio::test]
    async fn mutate_returning_none_skips_write() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());

        let result: Option<()> = store.mutate(|_| None).await.unwrap();
        assert!(result.is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert_matches!(store.load().await, Err(StoreError::Serialization { .. }));
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_updates() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(tmp.path()));

        let mut handles = Vec::new();
        for id in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .mutate(move |items| {
                        items.push(Item { id, name: format!("item-{id}") });
                        Some(())
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.load().await.unwrap().len(), 20);
    }
}
