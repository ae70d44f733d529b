//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use chatas_shared::constants::{DEFAULT_HTTP_PORT, DEFAULT_PROFILE_IMAGE};
use chatas_store::Database;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:5500`
    pub http_addr: SocketAddr,

    /// SQLite database file. Every request opens its own connection to it.
    /// Env: `DATABASE_PATH`
    /// Default: `chatas.db` in the platform data directory.
    pub database_path: PathBuf,

    /// Front-end origin allowed by CORS.
    /// Env: `CORS_ORIGIN` (e.g. `http://localhost:5173`)
    /// Default: unset, any origin allowed.
    pub cors_origin: Option<String>,

    /// Image assigned to users who register without one.
    /// Env: `DEFAULT_PROFILE_IMAGE`
    /// Default: `default-profile.png`
    pub default_profile_image: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: PathBuf::from("chatas.db"),
            cors_origin: None,
            default_profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok());

        if std::env::var_os("DATABASE_PATH").is_none() {
            match Database::default_path() {
                Ok(path) => config.database_path = path,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %config.database_path.display(),
                        "No platform data directory, using working directory"
                    );
                }
            }
        }

        config
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH").filter(|p| !p.is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(origin) = lookup("CORS_ORIGIN").filter(|o| !o.is_empty()) {
            config.cors_origin = Some(origin);
        }

        if let Some(image) = lookup("DEFAULT_PROFILE_IMAGE").filter(|i| !i.is_empty()) {
            config.default_profile_image = image;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 5500).into());
        assert_eq!(config.default_profile_image, "default-profile.png");
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_lookup_overrides() {
        let env: HashMap<&str, &str> = [
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("DATABASE_PATH", "/tmp/x.db"),
            ("CORS_ORIGIN", "http://localhost:5173"),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn test_invalid_addr_keeps_default() {
        let config = ServerConfig::from_lookup(|k| (k == "HTTP_ADDR").then(|| "nope".to_string()));
        assert_eq!(config.http_addr, ServerConfig::default().http_addr);
    }
}
