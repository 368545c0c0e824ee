//! Reading Castle metadata out of fetched content.
//!
//! - [`extractor`] finds the `#castle` block in leading Lua comments
//! - [`format`] parses JSON/YAML text into a field mapping
//! - [`dispatch`] decides how a response body is read
//! - [`headers`] maps `x-castle-*` headers to field names
//! - [`assembler`] merges everything and computes the `$__` fields

pub mod assembler;
pub mod dispatch;
pub mod extractor;
pub mod format;
pub mod headers;
pub mod types;

pub use assembler::{AssemblyInput, assemble};
pub use dispatch::ContentRoute;
pub use extractor::{RawMetadataBlock, extract_comment_metadata};
pub use format::{ParsedMetadata, parse_metadata};
pub use headers::metadata_key_for_header;
pub use types::{ResolutionRequest, ResolveOptions, ResolvedMetadata};
