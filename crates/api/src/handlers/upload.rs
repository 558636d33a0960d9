//! Handlers for image uploads.
//!
//! Both endpoints accept `multipart/form-data`. Files are transcoded and
//! stored through the catalog; the response carries the public URLs to
//! attach to a project.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use rioframe_catalog::UploadItem;
use rioframe_core::image_ref::AssetRef;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Field name for the single-file endpoint.
const SINGLE_FIELD: &str = "image";
/// Field name (repeated) for the batch endpoint.
const BATCH_FIELD: &str = "images";
/// Name hint used when the client sends no file name.
const DEFAULT_NAME_HINT: &str = "upload";

#[derive(Debug, Serialize)]
pub struct BatchUploadResponse {
    pub data: Vec<AssetRef>,
    /// Entries that could not be transcoded or stored.
    pub failed: usize,
}

/// POST /api/v1/admin/uploads
///
/// Accepts a multipart form with exactly one `image` field.
pub async fn upload_image(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<AssetRef>>)> {
    let item = single_file(multipart, SINGLE_FIELD).await?;

    let asset = state.catalog.upload_asset(item).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

/// POST /api/v1/admin/uploads/batch
///
/// Accepts a multipart form with one or more `images` fields. Entries
/// that fail are left out of `data` and counted in `failed`.
pub async fn upload_image_batch(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<BatchUploadResponse>)> {
    let items = collect_files(multipart, BATCH_FIELD).await?;
    if items.is_empty() {
        return Err(AppError::BadRequest(format!(
            "At least one '{BATCH_FIELD}' field is required"
        )));
    }

    let outcome = state.catalog.upload_asset_batch(items).await;
    Ok((
        StatusCode::CREATED,
        Json(BatchUploadResponse {
            data: outcome.assets,
            failed: outcome.failed,
        }),
    ))
}

/// Read the one file field named `field_name`. Other fields are ignored;
/// a second `field_name` field is rejected rather than dropped.
async fn single_file(mut multipart: Multipart, field_name: &str) -> AppResult<UploadItem> {
    let mut found = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        if found.is_some() {
            return Err(AppError::BadRequest(format!(
                "Only one '{field_name}' field is allowed; use the batch endpoint for more"
            )));
        }
        found = Some(read_item(field).await?);
    }
    found.ok_or_else(|| AppError::BadRequest(format!("Missing required '{field_name}' field")))
}

/// Read every file field named `field_name`; other fields are ignored.
async fn collect_files(mut multipart: Multipart, field_name: &str) -> AppResult<Vec<UploadItem>> {
    let mut items = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(field_name) {
            items.push(read_item(field).await?);
        }
    }
    Ok(items)
}

async fn read_item(field: Field<'_>) -> AppResult<UploadItem> {
    let name_hint = field.file_name().unwrap_or(DEFAULT_NAME_HINT).to_string();
    let bytes = field.bytes().await?;
    Ok(UploadItem {
        bytes: bytes.to_vec(),
        name_hint,
    })
}
