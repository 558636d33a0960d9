//! Flat-file persistence for the portfolio catalog.
//!
//! Each collection is one pretty-printed JSON array on disk, read in full
//! and rewritten in full on every mutation (see [`store::JsonStore`]).

use std::io::Write;
use std::path::Path;

pub mod models;
pub mod repositories;
pub mod store;

pub use store::{JsonStore, StoreError};

/// File name of the project collection inside the data directory.
pub const PROJECTS_FILE: &str = "projects.json";
/// File name of the contact collection inside the data directory.
pub const CONTACTS_FILE: &str = "contacts.json";

/// Verify that `dir` exists (creating it if needed) and is writable.
///
/// The scratch file gets a unique random name, so concurrent checks never
/// touch each other's file.
pub async fn health_check(dir: &Path) -> Result<(), StoreError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| StoreError::io(dir, source))?;

    let owned = dir.to_path_buf();
    tokio::task::spawn_blocking(move || write_scratch_file(&owned))
        .await
        .map_err(|e| StoreError::io(dir, std::io::Error::other(e)))?
}

fn write_scratch_file(dir: &Path) -> Result<(), StoreError> {
    let mut scratch = tempfile::Builder::new()
        .prefix(".health-")
        .tempfile_in(dir)
        .map_err(|source| StoreError::io(dir, source))?;
    scratch
        .write_all(b"ok")
        .map_err(|source| StoreError::io(scratch.path(), source))?;
    scratch.close().map_err(|source| StoreError::io(dir, source))
}
