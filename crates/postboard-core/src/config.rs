//! Configuration management for postboard.
//!
//! Loads configuration from ${POSTBOARD_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `base_url`.
pub const BASE_URL_ENV: &str = "POSTBOARD_BASE_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for postboard configuration and client state.
    //!
    //! POSTBOARD_HOME resolution order:
    //! 1. POSTBOARD_HOME environment variable (if set)
    //! 2. ~/.config/postboard (default)

    use std::path::PathBuf;

    /// Returns the postboard home directory.
    pub fn postboard_home() -> PathBuf {
        if let Ok(home) = std::env::var("POSTBOARD_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".postboard"),
            |h| h.join(".config").join("postboard"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        postboard_home().join("config.toml")
    }

    /// Returns the path to the cached session document.
    pub fn session_path() -> PathBuf {
        postboard_home().join("session.json")
    }

    /// Returns the path to the persisted cookie jar.
    pub fn cookies_path() -> PathBuf {
        postboard_home().join("cookies.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        postboard_home().join("logs")
    }
}

/// Fixed pauses the flows take so a notice can be read before navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub login_redirect: Duration,
    pub expiry_redirect: Duration,
}

impl Timings {
    /// No pauses at all. Used by tests and non-interactive runs.
    pub const IMMEDIATE: Timings = Timings {
        login_redirect: Duration::ZERO,
        expiry_redirect: Duration::ZERO,
    };
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            login_redirect: Duration::from_millis(Config::DEFAULT_LOGIN_REDIRECT_DELAY_MS),
            expiry_redirect: Duration::from_millis(Config::DEFAULT_EXPIRY_REDIRECT_DELAY_MS),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the content service API
    pub base_url: String,

    /// Request timeout in seconds (0 keeps the transport default)
    pub request_timeout_secs: u32,

    /// Delay between a successful login and navigation to the posts page
    pub login_redirect_delay_ms: u64,

    /// Delay between a "session expired" notice and navigation to the entry page
    pub expiry_redirect_delay_ms: u64,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_LOGIN_REDIRECT_DELAY_MS: u64 = 1000;
    const DEFAULT_EXPIRY_REDIRECT_DELAY_MS: u64 = 2000;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the base URL with precedence: env > config.
    ///
    /// Trailing slashes are stripped so endpoint paths can be appended.
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not well-formed.
    pub fn effective_base_url(&self) -> Result<String> {
        let from_env = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        let raw = from_env.as_deref().unwrap_or(&self.base_url).trim();

        url::Url::parse(raw).with_context(|| format!("Invalid service base URL: {raw}"))?;
        Ok(raw.trim_end_matches('/').to_string())
    }

    /// Returns the request timeout, or None when disabled (0).
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }

    pub fn timings(&self) -> Timings {
        Timings {
            login_redirect: Duration::from_millis(self.login_redirect_delay_ms),
            expiry_redirect: Duration::from_millis(self.expiry_redirect_delay_ms),
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            login_redirect_delay_ms: Self::DEFAULT_LOGIN_REDIRECT_DELAY_MS,
            expiry_redirect_delay_ms: Self::DEFAULT_EXPIRY_REDIRECT_DELAY_MS,
        }
    }
}
