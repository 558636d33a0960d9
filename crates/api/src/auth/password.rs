//! Admin credential checks backed by Argon2id.
//!
//! The admin password is never stored in plain text: `ADMIN_PASSWORD_HASH`
//! holds a PHC string, produced with `rioframe-api hash-password <pw>`.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::config::AdminConfig;

/// Hash `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check a login attempt against the configured admin.
///
/// The email is compared case-insensitively. The password is verified even
/// when the email is wrong, so both failures cost the same. With no hash
/// configured nobody can log in.
pub fn verify_admin_login(admin: &AdminConfig, email: &str, password: &str) -> Result<bool, Error> {
    let Some(hash) = admin.password_hash.as_deref() else {
        return Ok(false);
    };
    let email_matches = email.trim().eq_ignore_ascii_case(admin.email.trim());
    let password_matches = verify_password(password, hash)?;
    Ok(email_matches && password_matches)
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;

    const PASSWORD: &str = "correct-horse-battery-staple";

    static HASH: LazyLock<String> =
        LazyLock::new(|| hash_password(PASSWORD).expect("hashing should succeed"));

    fn admin(hash: Option<&str>) -> AdminConfig {
        AdminConfig {
            email: "Owner@Example.com".into(),
            password_hash: hash.map(str::to_string),
        }
    }

    #[test]
    fn hash_is_argon2id_and_verifies() {
        assert!(HASH.starts_with("$argon2id$"), "expected argon2id PHC prefix");
        assert!(verify_password(PASSWORD, &HASH).unwrap());
        assert!(!verify_password("wrong-password", &HASH).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn admin_login_matches_email_case_insensitively() {
        let admin = admin(Some(&HASH));
        assert!(verify_admin_login(&admin, " owner@example.COM ", PASSWORD).unwrap());
        assert!(!verify_admin_login(&admin, "someone@else.com", PASSWORD).unwrap());
        assert!(!verify_admin_login(&admin, "owner@example.com", "nope").unwrap());
    }

    #[test]
    fn login_is_disabled_without_a_hash() {
        assert!(!verify_admin_login(&admin(None), "owner@example.com", PASSWORD).unwrap());
    }
}
