//! Handlers for the project catalog.
//!
//! Public handlers read through the query views; admin handlers require
//! [`RequireAdmin`] and write only through [`CatalogService`].
//!
//! [`CatalogService`]: rioframe_catalog::CatalogService

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rioframe_db::models::project::{CreateProject, Project, UpdateProject};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/projects/reorder`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub ordered_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleActiveResponse {
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
pub async fn list_public(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.catalog.public_list().await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
///
/// Inactive projects stay reachable by direct id.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.catalog.get_detail(&id).await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/projects
pub async fn list_admin(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.catalog.admin_list().await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/admin/projects
pub async fn create_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let project = state.catalog.create_project(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// PUT /api/v1/admin/projects/{id}
pub async fn update_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.catalog.update_project(&id, input).await?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/admin/projects/{id}
///
/// Removes the record and, best-effort, its image files.
pub async fn delete_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.catalog.delete_project(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/admin/projects/{id}/toggle-active
pub async fn toggle_active(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<ToggleActiveResponse>>> {
    let is_active = state.catalog.toggle_active(&id).await?;
    Ok(Json(DataResponse {
        data: ToggleActiveResponse { is_active },
    }))
}

/// PUT /api/v1/admin/projects/reorder
pub async fn reorder(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    state.catalog.reorder(&input.ordered_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}
