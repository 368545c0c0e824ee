//! Network boundary: address classification and fetching.
//!
//! Everything that touches DNS or HTTP lives here so the SSRF rules are
//! enforced in one place.

pub mod address;
pub mod fetch;

pub use address::{AddressClassifier, HostResolver, SystemResolver, is_public_ip};
pub use fetch::{FetchedResource, Fetcher, build_client, ensure_fetchable};
