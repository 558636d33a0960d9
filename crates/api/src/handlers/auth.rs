//! Handlers for the `/auth` resource (admin login and session info).

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use rioframe_core::error::CoreError;
use rioframe_core::roles::ROLE_ADMIN;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_admin_login;
use crate::error::{AppError, AppResult};
use crate::middleware::client::ClientKey;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Same message for every credential failure so callers cannot tell
/// which half was wrong.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub email: String,
    pub role: String,
    pub expires_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Exchange the admin email and password for an access token. Failed
/// attempts count against the caller's login window.
pub async fn login(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    // Every attempt holds a slot while the password is verified; only a
    // successful login gives the window back.
    state.login_limiter.try_acquire(&client)?;

    let admin = &state.config.admin;
    if admin.password_hash.is_none() {
        tracing::warn!("Login attempted but ADMIN_PASSWORD_HASH is not configured");
    }

    let accepted = verify_admin_login(admin, &input.email, &input.password)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !accepted {
        tracing::warn!(client = %client, "Failed admin login");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    state.login_limiter.reset(&client);

    let access_token = generate_access_token(&admin.email, ROLE_ADMIN, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(client = %client, "Admin logged in");
    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            expires_in: state.config.jwt.expires_in_secs(),
        },
    }))
}

/// GET /api/v1/auth/session
///
/// Describe the caller's admin session.
pub async fn session(
    RequireAdmin(user): RequireAdmin,
) -> AppResult<Json<DataResponse<SessionResponse>>> {
    Ok(Json(DataResponse {
        data: SessionResponse {
            email: user.subject,
            role: user.role,
            expires_at: DateTime::from_timestamp(user.expires_at, 0),
        },
    }))
}
