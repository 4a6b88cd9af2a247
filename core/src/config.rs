//! Client configuration from the environment.

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://bloodlinkdemo-production.up.railway.app/api";
pub const DEFAULT_SESSION_FILE: &str = ".bloodlink-session.json";

pub const BASE_URL_VAR: &str = "BLOODLINK_API_URL";
pub const SESSION_FILE_VAR: &str = "BLOODLINK_SESSION_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin every catalog path is appended to.
    pub base_url: String,
    /// Where a persistent session is kept.
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl ClientConfig {
    /// Read `BLOODLINK_API_URL` and `BLOODLINK_SESSION_FILE`, loading a
    /// `.env` file first when one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: var(BASE_URL_VAR).unwrap_or(defaults.base_url),
            session_file: var(SESSION_FILE_VAR).map(PathBuf::from).unwrap_or(defaults.session_file),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
