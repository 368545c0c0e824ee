//! Public/private address classification.
//!
//! [`AddressClassifier::is_public`] is the only gate between an untrusted URL
//! and an outbound request. It is consulted before every fetch (including
//! redirect hops) and again for every URL derived from fetched content.
//!
//! Hostnames are resolved through the [`HostResolver`] trait so the lookup can
//! be replaced, e.g. by [`crate::test_utils::StaticResolver`] in tests.

use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use tracing::debug;
use url::{Host, Url};

use crate::core::{MetadataError, Result};

/// Resolves a hostname to the addresses a client would connect to.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Look up `host`. An empty result is treated as a failure by the caller.
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// [`HostResolver`] backed by the operating system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Decides whether URLs point at publicly routable Internet addresses.
#[derive(Clone)]
pub struct AddressClassifier {
    resolver: Arc<dyn HostResolver>,
}

impl std::fmt::Debug for AddressClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressClassifier").finish_non_exhaustive()
    }
}

impl Default for AddressClassifier {
    fn default() -> Self {
        Self::new(Arc::new(SystemResolver))
    }
}

impl AddressClassifier {
    /// Create a classifier using the given resolver.
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self { resolver }
    }

    /// Whether `url` denotes a public Internet host.
    ///
    /// URLs without a host (`file:`, `data:`, ...) are never public. IP
    /// literals are classified without a lookup. A domain is public only if
    /// every address it resolves to is public.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::InvalidUrl`] if `url` does not parse
    /// - [`MetadataError::DnsResolution`] if the lookup fails or is empty
    pub async fn is_public(&self, url: &str) -> Result<bool> {
        let parsed = Url::parse(url).map_err(|source| MetadataError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        self.is_public_url(&parsed).await
    }

    /// Same as [`is_public`](Self::is_public) for an already parsed URL.
    pub async fn is_public_url(&self, url: &Url) -> Result<bool> {
        let public = match url.host() {
            None => false,
            Some(Host::Ipv4(addr)) => is_public_ip(IpAddr::V4(addr)),
            Some(Host::Ipv6(addr)) => is_public_ip(IpAddr::V6(addr)),
            Some(Host::Domain(domain)) => {
                let addrs = self.resolver.resolve(domain).await.map_err(|source| {
                    MetadataError::DnsResolution {
                        host: domain.to_string(),
                        source,
                    }
                })?;
                if addrs.is_empty() {
                    return Err(MetadataError::DnsResolution {
                        host: domain.to_string(),
                        source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
                    });
                }
                addrs.into_iter().all(is_public_ip)
            }
        };

        debug!("Classified {} as {}", url, if public { "public" } else { "private" });
        Ok(public)
    }
}

/// Whether an address is routable on the public Internet.
#[must_use]
pub fn is_public_ip(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_public_ipv4(v4),
        IpAddr::V6(v6) => is_public_ipv6(v6),
    }
}

fn is_public_ipv4(addr: Ipv4Addr) -> bool {
    let [a, b, ..] = addr.octets();
    !(addr.is_unspecified()
        || addr.is_loopback()
        || addr.is_private()
        || addr.is_link_local()
        || addr.is_broadcast()
        || addr.is_documentation()
        || addr.is_multicast()
        // 0.0.0.0/8 "this network"
        || a == 0
        // 100.64.0.0/10 shared address space (carrier-grade NAT)
        || (a == 100 && (b & 0b1100_0000) == 64)
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && addr.octets()[2] == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240)
}

fn is_public_ipv6(addr: Ipv6Addr) -> bool {
    if let Some(v4) = addr.to_ipv4_mapped() {
        return is_public_ipv4(v4);
    }
    let segments = addr.segments();
    // ::a.b.c.d (deprecated IPv4-compatible form)
    if segments[..6].iter().all(|s| *s == 0) && !addr.is_unspecified() && !addr.is_loopback() {
        return is_public_ipv4(Ipv4Addr::new(
            (segments[6] >> 8) as u8,
            segments[6] as u8,
            (segments[7] >> 8) as u8,
            segments[7] as u8,
        ));
    }
    !(addr.is_unspecified()
        || addr.is_loopback()
        || addr.is_multicast()
        || addr.is_unique_local()
        || addr.is_unicast_link_local()
        // 2001:db8::/32 documentation
        || (segments[0] == 0x2001 && segments[1] == 0x0db8))
}
