//! End-to-end metadata resolution for a package URL.
//!
//! # Resolution Process
//!
//! 1. **Gate**: the requested URL must be public unless private URLs were
//!    allowed for this request
//! 2. **Fetch**: one GET, following redirects through the same gate
//! 3. **Route**: pick descriptor or source reading from `content-type`, then
//!    from the URL suffix
//! 4. **Parse**: JSON/YAML, either the whole body or the `#castle` comment
//! 5. **Assemble**: merge headers, strip reserved keys, compute the main and
//!    canonical URLs and check them
//!
//! Each call is independent. There is no caching, retrying or internal
//! timeout; wrap the future in `tokio::time::timeout` for a deadline.
//!
//! # Example
//!
//! ```rust,no_run
//! use castle_metadata::{ResolveOptions, resolve_metadata};
//!
//! # async fn example() -> Result<(), castle_metadata::MetadataError> {
//! let metadata =
//!     resolve_metadata("https://example.com/game.castle", ResolveOptions::default()).await?;
//! println!("entry point: {}", metadata.main_url());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::config::ResolverConfig;
use crate::core::{MetadataError, Result};
use crate::metadata::assembler::{AssemblyInput, assemble};
use crate::metadata::dispatch::ContentRoute;
use crate::metadata::types::{ResolutionRequest, ResolveOptions, ResolvedMetadata};
use crate::net::address::{AddressClassifier, HostResolver};
use crate::net::fetch::{Fetcher, ensure_fetchable};

/// Resolves package URLs into [`ResolvedMetadata`].
///
/// Cheap to clone; one value can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    fetcher: Fetcher,
    classifier: AddressClassifier,
}

impl MetadataResolver {
    /// Build a resolver from configuration, using the system DNS resolver.
    ///
    /// # Errors
    ///
    /// [`MetadataError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::from_config(config)?,
            classifier: AddressClassifier::default(),
        })
    }

    /// Assemble a resolver from an HTTP client and a host resolver.
    ///
    /// `client` must not follow redirects itself (see [`crate::net::build_client`]).
    pub fn with_parts(
        client: reqwest::Client,
        resolver: Arc<dyn HostResolver>,
        max_redirects: usize,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(client, max_redirects),
            classifier: AddressClassifier::new(resolver),
        }
    }

    /// The classifier used for every public/private decision.
    #[must_use]
    pub const fn classifier(&self) -> &AddressClassifier {
        &self.classifier
    }

    /// Resolve the metadata of `request.url`.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::PolicyViolation`] for any address policy breach
    /// - [`MetadataError::InvalidJson`] for a broken explicit JSON document
    /// - network and URL errors from fetching and classification
    pub async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedMetadata> {
        let url = Url::parse(&request.url).map_err(|source| MetadataError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;

        ensure_fetchable(&self.classifier, &url, request.allow_private_urls).await?;

        let resource = self.fetcher.fetch(&url, &self.classifier, request.allow_private_urls).await?;

        let route = ContentRoute::select(resource.content_type.as_deref(), &url);
        let parsed = route.parse(&resource.body)?;
        debug!(
            "Parsed {} field(s) from {}",
            parsed.as_ref().map_or(0, serde_json::Map::len),
            resource.final_url
        );

        let metadata = assemble(
            AssemblyInput {
                request,
                resource: &resource,
                parsed,
                self_hosting: route.is_self_hosting(),
            },
            &self.classifier,
        )
        .await?;

        info!("Resolved metadata for {} (main: {})", request.url, metadata.main_url());
        Ok(metadata)
    }

    /// Shorthand for [`resolve`](Self::resolve) with a URL and options.
    pub async fn resolve_url(&self, url: &str, options: ResolveOptions) -> Result<ResolvedMetadata> {
        self.resolve(&ResolutionRequest::new(url, options)).await
    }
}

/// Resolve `url` with a default [`MetadataResolver`].
///
/// # Errors
///
/// See [`MetadataResolver::resolve`].
pub async fn resolve_metadata(url: &str, options: ResolveOptions) -> Result<ResolvedMetadata> {
    MetadataResolver::new(&ResolverConfig::default())?.resolve_url(url, options).await
}
