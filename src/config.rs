//! Navigator configuration file.
//!
//! Settings shared by every navigator a program builds can be kept in
//! `~/.halnav/config.toml` instead of being repeated in code. Every field is
//! optional; values given explicitly to a
//! [`NavigatorBuilder`](crate::navigator::NavigatorBuilder) take precedence.
//!
//! # File Format
//!
//! ```toml
//! api_name = "Haltalk"
//! curie = "ht"
//! cache = true
//! timeout_secs = 10
//! user_agent = "my-client/1.0"
//!
//! [headers]
//! X-Client = "reporting"
//!
//! # Basic authentication
//! [auth]
//! username = "alice"
//! password = "secret"
//!
//! # or a bearer token
//! # [auth]
//! # token = "..."
//! ```
//!
//! # Security
//!
//! The file may hold credentials. It is read only from the user's home
//! directory (or an explicit path) and never written by this crate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::Auth;

/// Directory under the home directory holding the configuration file.
pub const CONFIG_DIR: &str = ".halnav";

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Defaults applied to navigators built with
/// [`NavigatorBuilder::config`](crate::navigator::NavigatorBuilder::config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Name shown when navigators are displayed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,

    /// CURIE prefix tried for relations given without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curie: Option<String>,

    /// Headers added to every request
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Credentials for every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,

    /// Cache fresh GET responses in memory
    pub cache: bool,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// `User-Agent` header replacing the default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl NavigatorConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse navigator configuration")
    }

    /// Load configuration from `path`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the configuration from the default location.
    ///
    /// A missing file yields the defaults.
    pub async fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("No navigator config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path).await
    }

    /// `~/.halnav/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize navigator configuration")
    }

    /// The configured timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
