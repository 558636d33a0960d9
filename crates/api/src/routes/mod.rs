pub mod admin;
pub mod auth;
pub mod contact;
pub mod health;
pub mod project;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                   login (public, rate limited)
/// /auth/session                                 session info (admin)
///
/// /projects                                     list active projects (public)
/// /projects/{id}                                project detail (public)
///
/// /contact                                      submit contact message (public, rate limited)
///
/// /admin/projects                               list all, create
/// /admin/projects/reorder                       reorder (PUT)
/// /admin/projects/{id}                          update (PUT), delete
/// /admin/projects/{id}/toggle-active            flip visibility (PATCH)
/// /admin/uploads                                upload one image (POST)
/// /admin/uploads/batch                          upload several images (POST)
/// /admin/contacts                               list contact messages
/// /admin/contacts/{id}/read                     mark read (PATCH)
/// /admin/contacts/{id}                          delete
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
        .nest("/contact", contact::router())
        .nest("/admin", admin::router(config))
}
