//! Single-attempt HTTP fetching behind the address gate.
//!
//! Redirects are followed here rather than inside `reqwest` so that every hop
//! goes through [`ensure_fetchable`] before a connection is made. No retries
//! and no timeouts are applied; callers wrap the whole resolution instead.

use reqwest::header::{CONTENT_TYPE, HeaderMap, LOCATION};
use tracing::{debug, warn};
use url::Url;

use crate::config::ResolverConfig;
use crate::constants::METADATA_HEADER_PREFIX;
use crate::core::{MetadataError, Result};
use crate::net::address::AddressClassifier;

/// A fetched response, captured once and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// URL the fetch was started for.
    pub url: String,
    /// URL that produced the body, after redirects.
    pub final_url: String,
    /// HTTP status of the final response.
    pub status: u16,
    /// Raw `content-type` header, if any.
    pub content_type: Option<String>,
    /// `x-castle-*` headers in response order; repeated headers joined with `", "`.
    pub metadata_headers: Vec<(String, String)>,
    /// Response body decoded as text.
    pub body: String,
}

/// Refuse `url` unless it is public or private targets were allowed.
///
/// Returns whether the URL is public so the caller can reuse the verdict.
///
/// # Errors
///
/// [`MetadataError::PolicyViolation`] when the URL is private and
/// `allow_private_urls` is false; classification errors are passed through.
pub async fn ensure_fetchable(
    classifier: &AddressClassifier,
    url: &Url,
    allow_private_urls: bool,
) -> Result<bool> {
    let public = classifier.is_public_url(url).await?;
    if !public && !allow_private_urls {
        return Err(MetadataError::policy(format!(
            "Not a public URL; won't get metadata for it: {url}"
        )));
    }
    Ok(public)
}

/// HTTP client wrapper that performs the metadata GET.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_redirects: usize,
}

impl Fetcher {
    /// Wrap an existing client.
    ///
    /// The client should be built with `redirect::Policy::none()`; otherwise
    /// `reqwest` follows redirects itself and intermediate hops skip the gate.
    pub fn new(client: reqwest::Client, max_redirects: usize) -> Self {
        Self {
            client,
            max_redirects,
        }
    }

    /// Build a client from configuration.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let client = build_client(reqwest::Client::builder(), config)?;
        Ok(Self::new(client, config.max_redirects))
    }

    /// GET `url`, following redirects through the address gate.
    ///
    /// `url` itself must already have passed [`ensure_fetchable`].
    pub async fn fetch(
        &self,
        url: &Url,
        classifier: &AddressClassifier,
        allow_private_urls: bool,
    ) -> Result<FetchedResource> {
        let mut current = url.clone();
        let mut hops = 0;

        loop {
            debug!("Fetching {}", current);
            let response = self.client.get(current.clone()).send().await.map_err(|source| {
                MetadataError::Fetch {
                    url: current.to_string(),
                    source,
                }
            })?;
            let status = response.status();

            let location = if status.is_redirection() {
                response.headers().get(LOCATION).and_then(|value| value.to_str().ok())
            } else {
                None
            };
            if let Some(location) = location {
                if hops >= self.max_redirects {
                    return Err(MetadataError::TooManyRedirects {
                        url: url.to_string(),
                        limit: self.max_redirects,
                    });
                }
                let next = current.join(location).map_err(|source| MetadataError::InvalidUrl {
                    url: location.to_string(),
                    source,
                })?;
                ensure_fetchable(classifier, &next, allow_private_urls).await?;
                debug!("Following redirect {} -> {}", current, next);
                current = next;
                hops += 1;
                continue;
            }

            if !status.is_success() {
                warn!("Fetching {} returned HTTP {}; using the body anyway", current, status);
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let metadata_headers = collect_metadata_headers(response.headers());
            let body = response.text().await.map_err(|source| MetadataError::Fetch {
                url: current.to_string(),
                source,
            })?;

            return Ok(FetchedResource {
                url: url.to_string(),
                final_url: current.to_string(),
                status: status.as_u16(),
                content_type,
                metadata_headers,
                body,
            });
        }
    }
}

/// Apply the resolver's client settings to `builder`.
///
/// Exposed so tests can add DNS overrides before building.
pub fn build_client(
    builder: reqwest::ClientBuilder,
    config: &ResolverConfig,
) -> Result<reqwest::Client> {
    builder
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|source| MetadataError::HttpClient { source })
}

fn collect_metadata_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    let mut collected = Vec::new();
    for name in headers.keys() {
        if !name.as_str().starts_with(METADATA_HEADER_PREFIX) {
            continue;
        }
        let mut values = Vec::new();
        for value in headers.get_all(name) {
            match value.to_str() {
                Ok(text) => values.push(text),
                Err(_) => warn!("Ignoring non-text value of header {}", name),
            }
        }
        if !values.is_empty() {
            collected.push((name.as_str().to_string(), values.join(", ")));
        }
    }
    collected
}
