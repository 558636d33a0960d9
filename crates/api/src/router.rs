//! Application router: health, uploaded assets, the `/api/v1` tree, and
//! the shared middleware stack.
//!
//! [`build_app_router`] is used by both `main.rs` and the integration
//! tests, so tests exercise the same layers as production.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::Response;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Stored asset names are never reused, so a served file never changes.
const ASSET_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Build the full application [`Router`].
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let app = Router::new()
        // Root-level health check, outside /api/v1.
        .merge(routes::health::router())
        .nest_service(&config.uploads_url_prefix, asset_service(config))
        .nest("/api/v1", routes::api_routes(config));

    with_middleware(app, config).with_state(state)
}

/// Read-only file service over the content directory. Directories are
/// never listed; a missing file is a plain 404 and is not cached.
fn asset_service(config: &ServerConfig) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(&config.uploads_dir))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            |response: &Response| {
                response
                    .status()
                    .is_success()
                    .then(|| HeaderValue::from_static(ASSET_CACHE_CONTROL))
            },
        ))
}

/// Wrap `app` in the request-scoped layers. The last layer added is the
/// outermost, so a request passes through them bottom to top.
fn with_middleware(app: Router<AppState>, config: &ServerConfig) -> Router<AppState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    app
        // Innermost: a panicking handler becomes a 500.
        .layer(CatchPanicLayer::new())
        // Slow requests (large transcodes included) are cut off with a 408.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Echo the request id on the response.
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        // One span per request, carrying the id set below.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Assign an id to requests that arrive without one.
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        // Outermost: CORS for the dashboard origin(s).
        .layer(build_cors_layer(config))
}

/// CORS for the dashboard and public site origins.
///
/// Panics at startup if any configured origin is invalid.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
