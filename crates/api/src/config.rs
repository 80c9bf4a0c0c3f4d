use std::fmt::Display;
use std::str::FromStr;

use axum::http::HeaderValue;
use snapfeed_core::error::CoreError;

use crate::auth::jwt::JwtConfig;
use crate::media::CloudinaryConfig;

/// Source of configuration values, keyed by environment variable name.
///
/// Production passes a closure over `std::env::var`; tests pass a map.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Server configuration loaded from environment variables.
///
/// Built once in `main` and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body, uploads included (default: 50 MiB).
    pub max_upload_bytes: usize,
    pub database_url: String,
    /// Pool size (default: `20`).
    pub database_max_connections: u32,
    /// Token secrets and lifetimes.
    pub jwt: JwtConfig,
    /// Image host credentials; `None` disables image uploads.
    pub cloudinary: Option<CloudinaryConfig>,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `DATABASE_URL`             | **required**               |
    /// | `DATABASE_MAX_CONNECTIONS` | `20`                       |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `MAX_UPLOAD_BYTES`         | `52428800`                 |
    ///
    /// Token and image host variables are documented on [`JwtConfig`] and
    /// [`CloudinaryConfig`].
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, CoreError> {
        let host = optional(lookup, "HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(lookup, "PORT", 3000u16)?;

        let cors_origins = optional(lookup, "CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| {
                    CoreError::Config(format!("Invalid CORS origin '{origin}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: parse_or(lookup, "REQUEST_TIMEOUT_SECS", 30u64)?,
            max_upload_bytes: parse_or(lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            database_url: required(lookup, "DATABASE_URL")?,
            database_max_connections: parse_or(lookup, "DATABASE_MAX_CONNECTIONS", 20u32)?,
            jwt: JwtConfig::from_lookup(lookup)?,
            cloudinary: CloudinaryConfig::from_lookup(lookup)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A set, non-blank value. Blank counts as unset.
pub(crate) fn optional(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn required(lookup: Lookup<'_>, key: &str) -> Result<String, CoreError> {
    optional(lookup, key).ok_or_else(|| CoreError::Config(format!("{key} must be set")))
}

pub(crate) fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional(lookup, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| CoreError::Config(format!("{key} is invalid ('{raw}'): {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    /// The minimal environment a server can start with.
    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/snapfeed"),
            ("ACCESS_TOKEN_SECRET", "access-secret"),
            ("REFRESH_TOKEN_SECRET", "refresh-secret"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<ServerConfig, CoreError> {
        ServerConfig::from_lookup(&|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_upload_bytes, 52_428_800);
        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.jwt.access_token_expiry_mins, 15);
        assert_eq!(config.jwt.refresh_token_expiry_days, 7);
        assert!(config.cloudinary.is_none());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let mut env = base_env();
        env.insert("CORS_ORIGINS", "https://a.example, https://b.example,,");
        let config = load(&env).unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn missing_database_url_is_a_config_error() {
        let mut env = base_env();
        env.remove("DATABASE_URL");
        assert_matches!(load(&env), Err(CoreError::Config(msg)) if msg.contains("DATABASE_URL"));
    }

    #[test]
    fn unparsable_port_is_a_config_error() {
        let mut env = base_env();
        env.insert("PORT", "eighty");
        assert_matches!(load(&env), Err(CoreError::Config(msg)) if msg.contains("PORT"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let mut env = base_env();
        env.insert("HOST", "   ");
        assert_eq!(load(&env).unwrap().host, "0.0.0.0");
    }
}
