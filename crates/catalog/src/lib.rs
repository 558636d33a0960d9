//! Project catalog service and image asset pipeline.
//!
//! - [`AssetStore`] -- owns the content directory holding original and
//!   optimized image files.
//! - [`CatalogService`] -- the only write path into the project
//!   collection: order assignment, sanitization, visibility toggling,
//!   reordering, cascade deletion, and upload orchestration.
//! - [`views`] -- the public and admin read projections.

pub mod asset_store;
pub mod error;
pub mod service;
pub mod views;

pub use asset_store::AssetStore;
pub use error::CatalogError;
pub use service::{BatchUpload, CascadeReport, CatalogService, UploadItem};
