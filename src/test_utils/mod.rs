//! Test utilities for castle-metadata
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use castle_metadata::test_utils::StaticResolver;
//!
//! // Make a local mock server reachable as a "public" host.
//! let resolver = StaticResolver::new().with_host("games.test", "93.184.216.34".parse().unwrap());
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::net::address::HostResolver;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise
/// `RUST_LOG`; with neither, no subscriber is installed.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// [`HostResolver`] answering from a fixed table.
///
/// Unknown hosts fail with `NotFound`, like a real lookup would.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address for `host`; may be called repeatedly for the same host.
    #[must_use]
    pub fn with_host(mut self, host: &str, addr: IpAddr) -> Self {
        self.hosts.entry(host.to_ascii_lowercase()).or_default().push(addr);
        self
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.hosts.get(&host.to_ascii_lowercase()).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no test address for {host}"))
        })
    }
}
