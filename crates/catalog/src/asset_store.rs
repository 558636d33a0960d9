//! Content directory for uploaded images.
//!
//! Every upload is stored as a pair sharing one generated base name:
//!
//! ```text
//! 1718000000000-042137554.png       original, byte-identical to the upload
//! 1718000000000-042137554-opt.jpg   optimized, transcoded for display
//! ```
//!
//! Files are created with `create_new`, so an existing name is never
//! overwritten. No other component writes to this directory.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use rioframe_core::image_ref::{AssetRef, ImageRef};
use rioframe_core::transcode::{self, OUTPUT_EXTENSION};
use rioframe_db::StoreError;
use tokio::io::AsyncWriteExt;

/// Fallback extension when neither the name hint nor the bytes reveal one.
const FALLBACK_EXTENSION: &str = "bin";

/// Suffix distinguishing the optimized file from its original.
const OPTIMIZED_SUFFIX: &str = "-opt";

/// Fresh base names tried before giving up on a collision.
const MAX_NAME_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    url_prefix: String,
}

impl AssetStore {
    /// `url_prefix` is the public path the directory is served under,
    /// e.g. `/uploads`.
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Persist `raw` and `optimized` under a fresh name pair and return
    /// their public URLs. Both files are flushed to disk before returning;
    /// if the second write fails the first file is removed again.
    pub async fn store(
        &self,
        raw: &[u8],
        optimized: &[u8],
        name_hint: &str,
    ) -> Result<AssetRef, StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;

        let extension = original_extension(name_hint, raw);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let base = generate_base_name();
            let original_name = format!("{base}.{extension}");
            let optimized_name = format!("{base}{OPTIMIZED_SUFFIX}.{OUTPUT_EXTENSION}");

            match self.write_pair(&original_name, raw, &optimized_name, optimized).await {
                Ok(()) => {
                    tracing::debug!(
                        original = %original_name,
                        optimized = %optimized_name,
                        original_bytes = raw.len(),
                        optimized_bytes = optimized.len(),
                        "Stored asset pair"
                    );
                    return Ok(AssetRef {
                        optimized_url: self.url_for(&optimized_name),
                        original_url: self.url_for(&original_name),
                    });
                }
                Err(StoreError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::AlreadyExists
                        && attempt < MAX_NAME_ATTEMPTS =>
                {
                    tracing::debug!(base = %base, "Asset name collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Delete every stored file `image` refers to.
    ///
    /// Handles both legacy bare URLs and full asset pairs. Paths that do
    /// not exist, or URLs that do not point into this store, are skipped.
    /// Every path is attempted; the first error is returned after all
    /// attempts. Returns how many files were removed.
    pub async fn delete(&self, image: &ImageRef) -> Result<usize, StoreError> {
        let mut removed = 0;
        let mut first_error = None;
        for url in image.normalize().stored_urls() {
            match self.delete_url(url).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    /// Delete the file behind one URL. `Ok(false)` when there is nothing
    /// to delete.
    pub async fn delete_url(&self, url: &str) -> Result<bool, StoreError> {
        let Some(path) = self.resolve(url) else {
            tracing::debug!(url, "Skipping URL outside the asset store");
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Map a public URL back to a file inside the content directory.
    ///
    /// Accepts a bare path (`/uploads/x.jpg`) or an absolute URL whose path
    /// starts with the prefix. Only a single plain file name is accepted
    /// after the prefix.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = strip_origin(url);
        let name = path
            .strip_prefix(self.url_prefix.as_str())?
            .strip_prefix('/')?;
        let name = name.split(['?', '#']).next().unwrap_or_default();

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Some(self.root.join(file)),
            _ => None,
        }
    }

    fn url_for(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.url_prefix)
    }

    async fn write_pair(
        &self,
        original_name: &str,
        raw: &[u8],
        optimized_name: &str,
        optimized: &[u8],
    ) -> Result<(), StoreError> {
        let original_path = self.root.join(original_name);
        write_new(&original_path, raw).await?;

        let optimized_path = self.root.join(optimized_name);
        if let Err(e) = write_new(&optimized_path, optimized).await {
            if let Err(cleanup) = tokio::fs::remove_file(&original_path).await {
                tracing::warn!(error = %cleanup, "Failed to remove orphaned original");
            }
            return Err(e);
        }
        Ok(())
    }
}

async fn write_new(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    let written = async {
        file.write_all(bytes).await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
        return Err(StoreError::io(path, e));
    }
    Ok(())
}

/// `{unix_millis}-{9 random digits}`.
fn generate_base_name() -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("{}-{suffix:09}", Utc::now().timestamp_millis())
}

/// Extension for the original file: taken from the upload's file name
/// when it looks sane, otherwise from the detected image format.
fn original_extension(name_hint: &str, raw: &[u8]) -> String {
    let from_hint = Path::new(name_hint)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    from_hint
        .or_else(|| {
            transcode::detect_format(raw)
                .and_then(|f| f.extensions_str().first())
                .map(|e| (*e).to_string())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

fn strip_origin(url: &str) -> &str {
    let Some(rest) = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
    else {
        return url;
    };
    rest.find('/').map_or("", |i| &rest[i..])
}
