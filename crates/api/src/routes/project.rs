//! Route definitions for the public `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET /       -> list_public
/// GET /{id}   -> get_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list_public))
        .route("/{id}", get(project::get_project))
}
