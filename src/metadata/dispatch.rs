//! Choose how a fetched body is interpreted.
//!
//! The `content-type` decides first. When it is not one of the Castle types,
//! the URL's path suffix decides, and anything unrecognised is treated as Lua
//! source that is its own entry point.

use tracing::debug;
use url::Url;

use crate::constants::{
    CONTENT_TYPE_DESCRIPTOR, CONTENT_TYPE_DESCRIPTOR_JSON, CONTENT_TYPE_DESCRIPTOR_YAML,
    FORMAT_JSON, FORMAT_YAML, SOURCE_CONTENT_TYPES, SUFFIX_DESCRIPTOR, SUFFIX_DESCRIPTOR_JSON,
    SUFFIX_DESCRIPTOR_YAML,
};
use crate::core::Result;
use crate::metadata::extractor::extract_comment_metadata;
use crate::metadata::format::{ParsedMetadata, parse_metadata};

/// How the body of a fetched resource is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRoute {
    /// The body is a metadata document, parsed whole.
    Descriptor {
        /// Format hint for [`parse_metadata`]
        hint: Option<&'static str>,
    },
    /// The body is Lua source; metadata comes from its leading comments.
    Source,
}

impl ContentRoute {
    /// Route for a response with `content_type` fetched from `url`.
    #[must_use]
    pub fn select(content_type: Option<&str>, url: &Url) -> Self {
        let short = content_type.map(short_content_type).unwrap_or_default();
        let route = match short.as_str() {
            CONTENT_TYPE_DESCRIPTOR => Self::Descriptor { hint: None },
            CONTENT_TYPE_DESCRIPTOR_JSON => Self::Descriptor {
                hint: Some(FORMAT_JSON),
            },
            CONTENT_TYPE_DESCRIPTOR_YAML => Self::Descriptor {
                hint: Some(FORMAT_YAML),
            },
            ct if SOURCE_CONTENT_TYPES.contains(&ct) => Self::Source,
            _ => Self::from_suffix(url.path()),
        };
        debug!("Content type {:?} at {} routed as {:?}", content_type, url, route);
        route
    }

    fn from_suffix(path: &str) -> Self {
        if path.ends_with(SUFFIX_DESCRIPTOR) {
            Self::Descriptor { hint: None }
        } else if path.ends_with(SUFFIX_DESCRIPTOR_JSON) {
            Self::Descriptor {
                hint: Some(FORMAT_JSON),
            }
        } else if path.ends_with(SUFFIX_DESCRIPTOR_YAML) {
            Self::Descriptor {
                hint: Some(FORMAT_YAML),
            }
        } else {
            Self::Source
        }
    }

    /// Whether the fetched URL is itself the package entry point.
    #[must_use]
    pub const fn is_self_hosting(&self) -> bool {
        matches!(self, Self::Source)
    }

    /// Parse `body` the way this route prescribes.
    ///
    /// # Errors
    ///
    /// Only for invalid JSON under an explicit JSON hint.
    pub fn parse(&self, body: &str) -> Result<Option<ParsedMetadata>> {
        match self {
            Self::Descriptor { hint } => parse_metadata(body, *hint),
            Self::Source => match extract_comment_metadata(body) {
                Some(block) => parse_metadata(&block.text, block.format_hint.as_deref()),
                None => {
                    debug!("No metadata comment in source");
                    Ok(None)
                }
            },
        }
    }
}

/// Media type without parameters, lower-cased.
#[must_use]
pub fn short_content_type(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
