//! Integration test suite for castle-metadata
//!
//! End-to-end tests against a local `wiremock` server. The mock server is
//! reached through fake host names: `reqwest` is told to connect to the mock
//! for them, and a [`StaticResolver`] tells the address classifier which of
//! them are "public".
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolve**: descriptors, Lua sources, headers, redirects
//! - **policy**: public/private address enforcement
//! - **cli**: the `castle-metadata` binary

mod cli;
mod policy;
mod resolve;
