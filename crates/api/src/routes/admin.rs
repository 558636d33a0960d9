//! Route definitions for the `/admin` resources.
//!
//! Every handler here takes the `RequireAdmin` extractor.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::config::ServerConfig;
use crate::handlers::{contact, project, upload};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /projects                      -> list_admin
/// POST   /projects                      -> create_project
/// PUT    /projects/reorder              -> reorder
/// PUT    /projects/{id}                 -> update_project
/// DELETE /projects/{id}                 -> delete_project
/// PATCH  /projects/{id}/toggle-active   -> toggle_active
///
/// POST   /uploads                       -> upload_image
/// POST   /uploads/batch                 -> upload_image_batch
///
/// GET    /contacts                      -> list
/// PATCH  /contacts/{id}/read            -> mark_read
/// DELETE /contacts/{id}                 -> delete
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    let projects = Router::new()
        .route(
            "/",
            get(project::list_admin).post(project::create_project),
        )
        .route("/reorder", put(project::reorder))
        .route(
            "/{id}",
            put(project::update_project).delete(project::delete_project),
        )
        .route("/{id}/toggle-active", patch(project::toggle_active));

    let uploads = Router::new()
        .route("/", post(upload::upload_image))
        .route("/batch", post(upload::upload_image_batch))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    let contacts = Router::new()
        .route("/", get(contact::list))
        .route("/{id}/read", patch(contact::mark_read))
        .route("/{id}", delete(contact::delete));

    Router::new()
        .nest("/projects", projects)
        .nest("/uploads", uploads)
        .nest("/contacts", contacts)
}
