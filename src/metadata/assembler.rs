//! Build [`ResolvedMetadata`] from parsed content and the fetch context.
//!
//! Steps, in order:
//! 1. Merge `x-castle-*` headers over the parsed fields.
//! 2. Drop fields with the reserved `$__` prefix.
//! 3. Derive the main URL (the requested URL itself for source files,
//!    otherwise `main` or `main.lua` resolved against it).
//! 4. Classify the requested and main URLs; a public package may not have a
//!    private main URL.
//! 5. Validate a declared `canonicalUrl`, or default it for public packages.

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::constants::{DEFAULT_MAIN_PATH, INTERNAL_KEY_PREFIX};
use crate::core::{MetadataError, Result};
use crate::metadata::format::ParsedMetadata;
use crate::metadata::headers::metadata_key_for_header;
use crate::metadata::types::{ResolutionRequest, ResolvedMetadata};
use crate::net::address::AddressClassifier;
use crate::net::fetch::FetchedResource;

/// Everything the assembler needs from earlier stages.
#[derive(Debug)]
pub struct AssemblyInput<'a> {
    /// The caller's request.
    pub request: &'a ResolutionRequest,
    /// The fetched response.
    pub resource: &'a FetchedResource,
    /// Parsed content fields, `None` when nothing was found.
    pub parsed: Option<ParsedMetadata>,
    /// Whether the body is the entry point itself.
    pub self_hosting: bool,
}

/// Produce the final metadata, enforcing the public/private invariants.
///
/// # Errors
///
/// - [`MetadataError::PolicyViolation`] when a public package points at a
///   private main URL, declares a non-public `canonicalUrl`, or declares
///   `main`/`canonicalUrl` with a non-string value
/// - classification errors ([`MetadataError::DnsResolution`],
///   [`MetadataError::InvalidUrl`])
pub async fn assemble(
    input: AssemblyInput<'_>,
    classifier: &AddressClassifier,
) -> Result<ResolvedMetadata> {
    let AssemblyInput {
        request,
        resource,
        parsed,
        self_hosting,
    } = input;

    let mut fields = parsed.unwrap_or_default();
    merge_header_fields(&mut fields, &resource.metadata_headers);
    strip_reserved_keys(&mut fields);

    let requested_from_url = request.url.clone();
    let requested = Url::parse(&requested_from_url).map_err(|source| {
        MetadataError::InvalidUrl {
            url: requested_from_url.clone(),
            source,
        }
    })?;

    let (main_url, source_code) = if self_hosting {
        let source_code = request.include_source_code.then(|| resource.body.clone());
        (requested_from_url.clone(), source_code)
    } else {
        let main = declared_url(&fields, "main")?.unwrap_or(DEFAULT_MAIN_PATH);
        let main_url = requested.join(main).map_err(|source| MetadataError::InvalidUrl {
            url: main.to_string(),
            source,
        })?;
        (main_url.to_string(), None)
    };
    debug!("Main URL for {} is {}", requested_from_url, main_url);

    let url_is_public = classifier.is_public_url(&requested).await?;
    let main_url_is_public = if main_url == requested_from_url {
        url_is_public
    } else {
        classifier.is_public(&main_url).await?
    };

    if url_is_public && !main_url_is_public {
        return Err(MetadataError::policy(format!(
            "Cannot have a private URL be the main URL for a public URL ({main_url})"
        )));
    }

    let canonical_url = match declared_url(&fields, "canonicalUrl")? {
        Some(declared) => {
            let public = match Url::parse(declared) {
                Ok(canonical) => classifier.is_public_url(&canonical).await?,
                Err(_) => false,
            };
            if !public {
                return Err(MetadataError::policy(format!(
                    "Canonical URL must be a public URL ({declared})"
                )));
            }
            Some(declared.to_string())
        }
        None => url_is_public.then(|| requested_from_url.clone()),
    };

    Ok(ResolvedMetadata {
        fields,
        requested_from_url,
        requested_url_is_also_main_entry_point: self_hosting,
        main_url,
        url_is_public,
        main_url_is_public,
        canonical_url,
        source_code,
    })
}

/// Set a field for every `x-castle-*` header; headers overwrite file fields.
pub fn merge_header_fields(fields: &mut ParsedMetadata, headers: &[(String, String)]) {
    for (name, value) in headers {
        if let Some(key) = metadata_key_for_header(name) {
            if fields.contains_key(&key) {
                debug!("Header {} overrides '{}' from the file", name, key);
            }
            fields.insert(key, Value::String(value.clone()));
        }
    }
}

/// Remove top-level keys that could be mistaken for computed fields.
pub fn strip_reserved_keys(fields: &mut ParsedMetadata) {
    fields.retain(|key, _| {
        let reserved = key.starts_with(INTERNAL_KEY_PREFIX);
        if reserved {
            warn!(
                "Got a `{}`-prefixed key in metadata ({}); discarding it",
                INTERNAL_KEY_PREFIX, key
            );
        }
        !reserved
    });
}

/// A URL-valued field: absent, null and `""` all mean "not declared".
fn declared_url<'a>(fields: &'a ParsedMetadata, key: &str) -> Result<Option<&'a str>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(MetadataError::policy(format!("`{key}` must be a URL string"))),
    }
}
