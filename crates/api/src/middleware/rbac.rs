//! The admin gate in front of every mutating or admin-only route.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rioframe_core::error::CoreError;
use rioframe_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An [`AuthUser`] holding the admin role.
///
/// Rejects with 401 when there is no valid session and 403 when the session
/// carries another role. It runs before the handler body, so a rejected
/// request changes nothing.
#[derive(Debug)]
pub struct RequireAdmin(pub AuthUser);

impl RequireAdmin {
    fn authorize(user: AuthUser) -> Result<Self, CoreError> {
        if user.role == ROLE_ADMIN {
            Ok(Self(user))
        } else {
            Err(CoreError::Forbidden("Admin role required".into()))
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(Self::authorize(user)?)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            subject: "owner@example.com".into(),
            role: role.into(),
            expires_at: 0,
        }
    }

    #[test]
    fn admin_passes() {
        let RequireAdmin(admin) = RequireAdmin::authorize(user(ROLE_ADMIN)).unwrap();
        assert_eq!(admin.subject, "owner@example.com");
    }

    #[test]
    fn other_roles_are_forbidden() {
        assert_matches!(
            RequireAdmin::authorize(user("viewer")),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            RequireAdmin::authorize(user("Admin")),
            Err(CoreError::Forbidden(_))
        );
    }
}
