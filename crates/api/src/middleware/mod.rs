//! Request extractors shared by handlers.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`client::ClientKey`] -- Identifies the caller for rate limiting.

pub mod auth;
pub mod client;
pub mod rbac;
