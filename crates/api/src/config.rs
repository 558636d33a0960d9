use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rioframe_core::rate_limit::RateLimitPolicy;
use rioframe_core::transcode::{TranscodeConstraints, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY};

use crate::auth::jwt::JwtConfig;

/// Default request body limit on the upload routes (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// The single admin identity allowed to log in.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    /// Argon2id PHC string. `None` disables login entirely.
    pub password_hash: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding `projects.json` and `contacts.json`.
    pub data_dir: PathBuf,
    /// Content directory for uploaded images.
    pub uploads_dir: PathBuf,
    /// Public URL prefix the content directory is served under.
    pub uploads_url_prefix: String,
    /// Request body limit on the upload routes.
    pub max_upload_bytes: usize,
    /// Bounds for the optimized image representation.
    pub transcode: TranscodeConstraints,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    /// Minimum seconds between accepted contact submissions per client.
    pub contact_rate_limit_secs: u64,
    /// Failed logins allowed per client inside `login_window_secs`.
    pub login_max_attempts: u32,
    pub login_window_secs: u64,
    /// Take the client identity from `x-forwarded-for`. Only safe behind a
    /// reverse proxy that overwrites the header.
    pub trust_proxy: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `DATA_DIR`                | `data`                  |
    /// | `UPLOADS_DIR`             | `uploads`               |
    /// | `UPLOADS_URL_PREFIX`      | `/uploads`              |
    /// | `MAX_UPLOAD_BYTES`        | `26214400`              |
    /// | `IMAGE_MAX_WIDTH`         | `1920`                  |
    /// | `IMAGE_MAX_HEIGHT`        | unset                   |
    /// | `IMAGE_QUALITY`           | `80`                    |
    /// | `ADMIN_EMAIL`             | `admin@localhost`       |
    /// | `ADMIN_PASSWORD_HASH`     | unset (login disabled)  |
    /// | `CONTACT_RATE_LIMIT_SECS` | `30`                    |
    /// | `LOGIN_MAX_ATTEMPTS`      | `5`                     |
    /// | `LOGIN_WINDOW_SECS`       | `900`                   |
    /// | `TRUST_PROXY`             | `false`                 |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on any unparsable value or invalid image constraints, so a
    /// misconfigured server never starts.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into()));
        let uploads_dir =
            PathBuf::from(std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into()));
        let uploads_url_prefix =
            std::env::var("UPLOADS_URL_PREFIX").unwrap_or_else(|_| "/uploads".into());
        assert!(
            uploads_url_prefix.starts_with('/') && uploads_url_prefix.len() > 1,
            "UPLOADS_URL_PREFIX must be an absolute path such as /uploads"
        );

        let max_upload_bytes: usize = env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES);

        let max_width: u32 = env_or("IMAGE_MAX_WIDTH", DEFAULT_MAX_WIDTH);
        let max_height: Option<u32> = std::env::var("IMAGE_MAX_HEIGHT").ok().map(|v| {
            v.parse()
                .expect("IMAGE_MAX_HEIGHT must be a valid u32")
        });
        let quality: u8 = env_or("IMAGE_QUALITY", DEFAULT_QUALITY);
        let transcode = TranscodeConstraints::new(max_width, max_height, quality)
            .unwrap_or_else(|e| panic!("Invalid image settings: {e}"));

        let jwt = JwtConfig::from_env();

        let admin = AdminConfig {
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".into()),
            password_hash: std::env::var("ADMIN_PASSWORD_HASH")
                .ok()
                .filter(|h| !h.trim().is_empty()),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_dir,
            uploads_dir,
            uploads_url_prefix,
            max_upload_bytes,
            transcode,
            jwt,
            admin,
            contact_rate_limit_secs: env_or("CONTACT_RATE_LIMIT_SECS", 30),
            login_max_attempts: env_or("LOGIN_MAX_ATTEMPTS", 5),
            login_window_secs: env_or("LOGIN_WINDOW_SECS", 900),
            trust_proxy: env_or("TRUST_PROXY", false),
        }
    }

    /// One accepted contact submission per window.
    pub fn contact_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(1, Duration::from_secs(self.contact_rate_limit_secs))
    }

    pub fn login_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(
            self.login_max_attempts,
            Duration::from_secs(self.login_window_secs),
        )
    }
}

/// Read `key` and parse it, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is invalid ({raw:?}): {e}")),
        Err(_) => default,
    }
}
