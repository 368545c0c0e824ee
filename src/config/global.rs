//! User-wide resolver configuration (`~/.castle/metadata.toml`).
//!
//! The file is optional. Missing keys take their defaults, and a missing file
//! is the same as an empty one.
//!
//! ```toml
//! user_agent = "my-portal/2.0"
//! max_redirects = 5
//! allow_private_urls = false
//! include_source_code = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{DEFAULT_MAX_REDIRECTS, default_user_agent};

/// Settings for building a [`MetadataResolver`](crate::resolver::MetadataResolver)
/// and default options for the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// `User-Agent` header sent with every fetch.
    pub user_agent: String,

    /// Redirect hops followed per fetch before giving up.
    pub max_redirects: usize,

    /// Default for `--allow-private-urls`.
    ///
    /// Only affects the CLI; library callers pass options per request.
    pub allow_private_urls: bool,

    /// Default for `--include-source-code`.
    pub include_source_code: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            allow_private_urls: false,
            include_source_code: false,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from the default location, or defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The home directory cannot be determined
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML syntax
    pub async fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_with_optional(Some(path)).await
    }

    /// Load from `path` if given, else from the default location.
    ///
    /// A path that does not exist yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Write configuration to `path`, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Platform path of the configuration file.
    ///
    /// - **Windows**: `%LOCALAPPDATA%\castle\metadata.toml`
    /// - **Unix/macOS**: `~/.castle/metadata.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("castle")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".castle")
        };

        Ok(config_dir.join("metadata.toml"))
    }
}
