//! Client configuration management.
//!
//! Consolidates all environment variable reads. Command-line flags
//! override individual values afterwards.

use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

/// Default backend URL
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const CREDENTIALS_FILE: &str = "credentials.json";
const LOG_FILE: &str = "sq_client.log";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_url: String,
    /// Directory holding credentials and the TUI log file
    pub data_dir: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `STUDY_QUEST_API_URL`: backend URL (default: http://localhost:5000)
    /// - `STUDY_QUEST_DATA_DIR`: data directory (default: $HOME/.study_quest)
    /// - `STUDY_QUEST_TIMEOUT_SECS`: request timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("STUDY_QUEST_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_dir = match lookup("STUDY_QUEST_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => lookup("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".study_quest"),
        };

        let timeout_secs = match lookup("STUDY_QUEST_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&secs| secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: "STUDY_QUEST_TIMEOUT_SECS",
                    expected: "a positive number of seconds",
                    value,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url: normalize_url(&api_url),
            data_dir,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Override the backend URL.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = normalize_url(api_url);
        self
    }

    /// Path of the credential store file.
    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIALS_FILE)
    }

    /// Path of the log file used while the TUI owns the terminal.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from(".study_quest"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
