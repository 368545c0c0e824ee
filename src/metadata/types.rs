//! Request and result types of a resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::format::ParsedMetadata;

/// Per-request options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolveOptions {
    /// Allow the initial fetch (and its redirects) to target private addresses.
    ///
    /// Does not relax the main-URL or canonical-URL checks.
    pub allow_private_urls: bool,

    /// Attach the fetched body when it is itself the entry point.
    pub include_source_code: bool,
}

/// A URL to resolve together with its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    /// The URL as given by the caller.
    pub url: String,
    /// See [`ResolveOptions::allow_private_urls`].
    pub allow_private_urls: bool,
    /// See [`ResolveOptions::include_source_code`].
    pub include_source_code: bool,
}

impl ResolutionRequest {
    /// Create a request for `url`.
    pub fn new(url: impl Into<String>, options: ResolveOptions) -> Self {
        Self {
            url: url.into(),
            allow_private_urls: options.allow_private_urls,
            include_source_code: options.include_source_code,
        }
    }
}

/// Metadata of a package, as returned to callers.
///
/// Holds the fields read from the package (headers included) and the fields
/// computed during resolution. Serializes to one flat object in which the
/// computed fields carry the reserved `$__` prefix:
///
/// ```json
/// {
///   "name": "My Game",
///   "$__requestedFromUrl": "https://example.com/game.castle",
///   "$__requestedUrlIsAlsoMainEntryPoint": false,
///   "$__mainUrl": "https://example.com/main.lua",
///   "$__urlIsPublic": true,
///   "$__mainUrlIsPublic": true,
///   "$__canonicalUrl": "https://example.com/game.castle"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMetadata {
    #[serde(flatten)]
    pub(crate) fields: ParsedMetadata,

    #[serde(rename = "$__requestedFromUrl")]
    pub(crate) requested_from_url: String,

    #[serde(rename = "$__requestedUrlIsAlsoMainEntryPoint")]
    pub(crate) requested_url_is_also_main_entry_point: bool,

    #[serde(rename = "$__mainUrl")]
    pub(crate) main_url: String,

    #[serde(rename = "$__urlIsPublic")]
    pub(crate) url_is_public: bool,

    #[serde(rename = "$__mainUrlIsPublic")]
    pub(crate) main_url_is_public: bool,

    #[serde(rename = "$__canonicalUrl", skip_serializing_if = "Option::is_none")]
    pub(crate) canonical_url: Option<String>,

    #[serde(rename = "$__sourceCode", skip_serializing_if = "Option::is_none")]
    pub(crate) source_code: Option<String>,
}

impl ResolvedMetadata {
    /// Fields read from the package content and headers.
    #[must_use]
    pub const fn fields(&self) -> &ParsedMetadata {
        &self.fields
    }

    /// A single content field, e.g. `name`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The URL the caller asked for.
    #[must_use]
    pub fn requested_from_url(&self) -> &str {
        &self.requested_from_url
    }

    /// Whether the requested URL is the entry point itself.
    #[must_use]
    pub const fn requested_url_is_also_main_entry_point(&self) -> bool {
        self.requested_url_is_also_main_entry_point
    }

    /// Absolute URL of the entry point.
    #[must_use]
    pub fn main_url(&self) -> &str {
        &self.main_url
    }

    /// Whether the requested URL is public.
    #[must_use]
    pub const fn url_is_public(&self) -> bool {
        self.url_is_public
    }

    /// Whether the main URL is public.
    #[must_use]
    pub const fn main_url_is_public(&self) -> bool {
        self.main_url_is_public
    }

    /// Authoritative URL of the package; always public when set.
    #[must_use]
    pub fn canonical_url(&self) -> Option<&str> {
        self.canonical_url.as_deref()
    }

    /// Body of the entry point, when requested and self-hosting.
    #[must_use]
    pub fn source_code(&self) -> Option<&str> {
        self.source_code.as_deref()
    }

    /// The flat JSON object described on the type.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
