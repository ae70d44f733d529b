//! Client configuration loaded from environment variables.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{ClientError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:5500/api";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the JSON API, including the `/api` prefix.
    /// Env: `CHATAS_API_URL`
    /// Default: `http://localhost:5500/api`
    pub base_url: String,

    /// File holding the persisted session snapshot.
    /// Env: `CHATAS_SESSION_PATH`
    /// Default: `session.json` in the platform config directory.
    pub session_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok());
        if std::env::var_os("CHATAS_SESSION_PATH").is_none() {
            config.session_path = default_session_path()?;
        }
        Ok(config)
    }

    /// Build a configuration from an arbitrary key lookup. The session path
    /// falls back to `session.json` in the working directory.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("CHATAS_API_URL")
            .filter(|u| !u.is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let session_path = lookup("CHATAS_SESSION_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("session.json"));

        Self {
            base_url,
            session_path,
        }
    }
}

/// `<config dir>/session.json` for the current platform.
pub fn default_session_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("lt", "chatas", "chatas").ok_or(ClientError::NoConfigDir)?;
    Ok(dirs.config_dir().join("session.json"))
}
