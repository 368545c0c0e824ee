//! Constants shared across the resolver.
//!
//! The marker, prefixes and content-type tables below define the Castle
//! metadata wire format. Keeping them in one place makes the microformat
//! discoverable without reading the parsing code.

/// Token that opens an embedded metadata block in a Lua comment.
///
/// May be followed by `/<format>`, e.g. `#castle/json`.
pub const METADATA_MARKER: &str = "#castle";

/// Format tag selecting strict JSON parsing (`#castle/json`).
pub const FORMAT_JSON: &str = "json";

/// Format tag selecting YAML parsing (`#castle/yaml`).
pub const FORMAT_YAML: &str = "yaml";

/// Prefix reserved for fields computed by the assembler.
///
/// Keys with this prefix coming from fetched content or headers are dropped.
pub const INTERNAL_KEY_PREFIX: &str = "$__";

/// Response header prefix whose headers are merged into the metadata.
pub const METADATA_HEADER_PREFIX: &str = "x-castle-";

/// Entry point assumed when a descriptor does not declare `main`.
pub const DEFAULT_MAIN_PATH: &str = "main.lua";

/// Default number of redirect hops followed for a single fetch.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Content type of a descriptor whose format must be detected.
pub const CONTENT_TYPE_DESCRIPTOR: &str = "app/castle";

/// Content type of a JSON descriptor.
pub const CONTENT_TYPE_DESCRIPTOR_JSON: &str = "app/castle+json";

/// Content type of a YAML descriptor.
pub const CONTENT_TYPE_DESCRIPTOR_YAML: &str = "app/castle+yaml";

/// Content types whose body is Lua source and the package entry point.
pub const SOURCE_CONTENT_TYPES: &[&str] = &[
    "app/castle+lua",
    "text/lua",
    "text/love2d",
    "app/castle+main",
    "app/castle+source",
];

/// URL suffix of a descriptor whose format must be detected.
pub const SUFFIX_DESCRIPTOR: &str = ".castle";

/// URL suffix of a JSON descriptor.
pub const SUFFIX_DESCRIPTOR_JSON: &str = ".castle.json";

/// URL suffix of a YAML descriptor.
pub const SUFFIX_DESCRIPTOR_YAML: &str = ".castle.yaml";

/// User agent sent with every fetch unless configured otherwise.
pub fn default_user_agent() -> String {
    format!("castle-metadata/{}", env!("CARGO_PKG_VERSION"))
}
