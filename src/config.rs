//! Configuration management for Supaplay.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named credential profiles for Supabase projects.

use crate::error::{PlayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure for Supaplay.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Named credential profiles.
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// A named set of Supabase project credentials.
///
/// Both fields are optional in the file; whatever is missing can be filled
/// in from the environment, the command line, or a deep link.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    /// Project URL (e.g. `https://xyzcompany.supabase.co`).
    pub url: Option<String>,

    /// API key (not recommended to store in config).
    pub key: Option<String>,
}

impl ProfileConfig {
    /// Merges another profile into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ProfileConfig) {
        if other.url.is_some() {
            self.url = other.url.clone();
        }
        if other.key.is_some() {
            self.key = other.key.clone();
        }
    }

    /// Applies environment variables (SUPABASE_URL, SUPABASE_KEY) as defaults.
    pub fn apply_env_defaults(&mut self) {
        if self.url.is_none() {
            self.url = std::env::var("SUPABASE_URL").ok().filter(|s| !s.is_empty());
        }
        if self.key.is_none() {
            self.key = std::env::var("SUPABASE_KEY").ok().filter(|s| !s.is_empty());
        }
    }

    /// Returns a display-safe string (redacted key) for UI purposes.
    pub fn display_string(&self) -> String {
        let url = self.url.as_deref().unwrap_or("<no url>");
        match self.key.as_deref() {
            Some(key) => format!("{url} (key {})", redact(key)),
            None => format!("{url} (no key)"),
        }
    }
}

/// Redacts an API key down to a recognizable prefix.
fn redact(key: &str) -> String {
    if key.len() <= 6 {
        "******".to_string()
    } else {
        format!("{}…", &key[..6])
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("supaplay")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PlayError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            PlayError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named profile, or the default profile if name is None.
    pub fn get_profile(&self, name: Option<&str>) -> Option<&ProfileConfig> {
        let key = name.unwrap_or("default");
        self.profiles.get(key)
    }
}
