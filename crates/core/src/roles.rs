//! Well-known role name constants embedded in session tokens.

pub const ROLE_ADMIN: &str = "admin";
