//! Configuration for the resolver and the command-line tool.
//!
//! # Modules
//!
//! - `global` - the optional user-wide config file
//!
//! # Configuration File
//!
//! **Location:**
//! - Unix/macOS: `~/.castle/metadata.toml`
//! - Windows: `%LOCALAPPDATA%\castle\metadata.toml`
//!
//! The CLI's `--config` flag points at a different file. Library callers
//! usually build a [`ResolverConfig`] in code instead of loading one.

pub mod global;

pub use global::ResolverConfig;
