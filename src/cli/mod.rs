//! Command-line interface for castle-metadata.
//!
//! ```bash
//! castle-metadata https://example.com/game.castle
//! castle-metadata --format yaml https://example.com/main.lua --include-source-code
//! castle-metadata --allow-private-urls http://localhost:8080/game.castle
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--config` - Use an alternative configuration file
//!
//! Flags are combined with the defaults from
//! [`ResolverConfig`]: a behaviour enabled in either place is enabled.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::ResolverConfig;
use crate::metadata::types::{ResolveOptions, ResolvedMetadata};
use crate::resolver::MetadataResolver;

/// Runtime settings derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can drive execution without touching
/// the process-wide logger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`, then `info`.
    pub log_level: Option<String>,

    /// Alternative configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global `tracing` subscriber writing to stderr.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Output encoding of the resolved metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// Resolve the metadata of a Castle package URL.
#[derive(Debug, Parser)]
#[command(
    name = "castle-metadata",
    about = "Resolve Castle package metadata from a URL",
    version,
    long_about = "Fetches a Castle descriptor or Lua entry point, reads its metadata and prints it \
                  together with the computed main and canonical URLs."
)]
pub struct Cli {
    /// URL of a `.castle` descriptor or a Lua entry point
    url: String,

    /// Allow the initial fetch to target private or loopback addresses.
    ///
    /// The main URL of a public package and any declared canonical URL must
    /// still be public.
    #[arg(long)]
    allow_private_urls: bool,

    /// Include the fetched body when the URL is itself the entry point
    #[arg(long)]
    include_source_code: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Path to an alternative configuration file (default `~/.castle/metadata.toml`)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Parse-time configuration, then run.
    ///
    /// # Errors
    ///
    /// Fails if the configuration cannot be loaded, resolution fails or the
    /// result cannot be encoded.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Flags OR-ed with the configured defaults.
    #[must_use]
    pub fn resolve_options(&self, defaults: &ResolverConfig) -> ResolveOptions {
        ResolveOptions {
            allow_private_urls: self.allow_private_urls || defaults.allow_private_urls,
            include_source_code: self.include_source_code || defaults.include_source_code,
        }
    }

    /// Run with an explicit configuration; logging is left untouched.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let resolver_config = ResolverConfig::load_with_optional(config.config_path).await?;
        debug!("Using configuration: {:?}", resolver_config);

        let options = self.resolve_options(&resolver_config);
        let resolver = MetadataResolver::new(&resolver_config)?;
        let metadata = resolver
            .resolve_url(&self.url, options)
            .await
            .with_context(|| format!("Failed to resolve metadata for {}", self.url))?;

        println!("{}", render(&metadata, self.format)?);
        Ok(())
    }
}

/// Encode `metadata` for printing.
///
/// # Errors
///
/// Fails only if serialization fails.
pub fn render(metadata: &ResolvedMetadata, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(metadata).context("Failed to encode metadata as JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(metadata).context("Failed to encode metadata as YAML")
        }
    }
}
