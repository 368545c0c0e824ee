//! Core types shared by every stage of a resolution.
//!
//! - [`MetadataError`] - the library's typed error
//! - [`ErrorContext`] and [`user_friendly_error`] - CLI error rendering

pub mod error;

pub use error::{ErrorContext, MetadataError, user_friendly_error};

/// Result alias used throughout the library.
pub type Result<T, E = MetadataError> = std::result::Result<T, E>;
