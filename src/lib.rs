//! castle-metadata - resolve Castle package metadata from a URL
//!
//! Given a URL that points either at a package descriptor (`.castle`,
//! `.castle.json`, `.castle.yaml`) or directly at a Lua entry point, this crate
//! fetches it, reads the metadata it carries and returns a flat mapping of
//! package fields plus computed `$__` fields (main URL, canonical URL, whether
//! each URL is public).
//!
//! The input URL is untrusted. Every outbound request and every URL derived
//! from fetched content is checked against the address policy so a public
//! package can never steer a server towards loopback, link-local or other
//! private addresses.
//!
//! # Core Modules
//!
//! - [`resolver`] - the end-to-end [`MetadataResolver`] and [`resolve_metadata`]
//! - [`net`] - address classification and the gated HTTP fetch
//! - [`metadata`] - comment extraction, format parsing, dispatch and assembly
//! - [`config`] - `~/.castle/metadata.toml` settings
//! - [`core`] - [`MetadataError`] and user-facing error rendering
//! - [`cli`] - the `castle-metadata` command
//!
//! # Metadata Formats
//!
//! A descriptor is a JSON or YAML document:
//!
//! ```yaml
//! name: My Game
//! main: src/main.lua
//! ```
//!
//! A Lua entry point carries the same document in its first comments:
//!
//! ```lua
//! --[[
//! #castle
//! name: My Game
//! ]]
//! function love.draw() end
//! ```
//!
//! Response headers named `x-castle-<field>` override fields from the body.

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod metadata;
pub mod net;
pub mod resolver;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::core::MetadataError;
pub use crate::metadata::{ResolutionRequest, ResolveOptions, ResolvedMetadata};
pub use crate::resolver::{MetadataResolver, resolve_metadata};
