//! Error handling for castle-metadata
//!
//! The library reports every failure through [`MetadataError`]. Variants fall
//! into three families that callers usually need to tell apart:
//!
//! - **Policy**: [`MetadataError::PolicyViolation`], a security decision about
//!   which addresses may be touched. Client-facing.
//! - **Parse**: [`MetadataError::InvalidJson`], raised only when the content
//!   explicitly declared itself as JSON. Every other parse failure is
//!   recovered and logged.
//! - **Network**: [`MetadataError::DnsResolution`], [`MetadataError::Fetch`],
//!   [`MetadataError::TooManyRedirects`]. Infrastructure trouble, never a
//!   policy outcome.
//!
//! For the command line, [`ErrorContext`] wraps an error with details and a
//! suggestion, and [`user_friendly_error`] builds one from any
//! [`anyhow::Error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use castle_metadata::core::{MetadataError, user_friendly_error};
//!
//! let error = MetadataError::policy("Not a public URL; won't get metadata for it");
//! assert!(error.is_policy_violation());
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The error type of every resolution operation.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A URL was refused by the public/private address policy.
    ///
    /// Raised when the requested URL is private without permission, when a
    /// public package points its main or canonical URL at a private address,
    /// or when a URL-valued field has the wrong shape.
    #[error("metadata policy violation: {reason}")]
    PolicyViolation {
        /// Human readable explanation
        reason: String,
    },

    /// Content that declared itself as JSON did not parse.
    #[error("invalid JSON metadata: {source}")]
    InvalidJson {
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// A URL could not be parsed or joined.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The offending URL (or relative reference)
        url: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },

    /// A hostname could not be resolved.
    #[error("failed to resolve host '{host}': {source}")]
    DnsResolution {
        /// Host that was looked up
        host: String,
        /// Resolver error
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request or reading its body failed.
    #[error("failed to fetch '{url}': {source}")]
    Fetch {
        /// Requested URL
        url: String,
        /// Transport error
        #[source]
        source: reqwest::Error,
    },

    /// A fetch kept redirecting past the configured limit.
    #[error("too many redirects fetching '{url}' (limit {limit})")]
    TooManyRedirects {
        /// URL the fetch started from
        url: String,
        /// Configured hop limit
        limit: usize,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    HttpClient {
        /// Builder error
        #[source]
        source: reqwest::Error,
    },
}

impl MetadataError {
    /// Shorthand for [`MetadataError::PolicyViolation`].
    pub fn policy(reason: impl Into<String>) -> Self {
        Self::PolicyViolation {
            reason: reason.into(),
        }
    }

    /// Whether this is a policy decision rather than a fault.
    #[must_use]
    pub const fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation { .. })
    }

    /// Whether this is a DNS or HTTP failure.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::DnsResolution { .. } | Self::Fetch { .. } | Self::TooManyRedirects { .. }
        )
    }

    /// Whether explicitly declared JSON content failed to parse.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::InvalidJson { .. })
    }
}

/// An error message together with optional details and a suggestion.
///
/// Rendered by the CLI with [`ErrorContext::display`]; the [`fmt::Display`]
/// impl gives the uncolored form for logs.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The main error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no details or suggestion.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Build an [`ErrorContext`] for CLI display from any error.
///
/// Walks the error chain looking for a [`MetadataError`] and attaches a
/// suggestion for it. Outer `anyhow` context messages end up in the details.
/// Errors without a [`MetadataError`] (configuration problems, for instance)
/// are reported with their full chain and no suggestion.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let full = format!("{error:#}");

    let mut current: &dyn std::error::Error = error.as_ref();
    loop {
        if let Some(metadata_error) = current.downcast_ref::<MetadataError>() {
            let message = metadata_error.to_string();
            let mut ctx = ErrorContext::new(message.clone())
                .with_suggestion(suggestion_for(metadata_error));
            if full != message {
                ctx = ctx.with_details(full);
            }
            return ctx;
        }
        match current.source() {
            Some(source) => current = source,
            None => break,
        }
    }

    ErrorContext::new(full)
}

fn suggestion_for(error: &MetadataError) -> &'static str {
    match error {
        MetadataError::PolicyViolation { .. } => {
            "Only public Internet URLs can be resolved; pass --allow-private-urls for local testing"
        }
        MetadataError::InvalidJson { .. } => {
            "The content was declared as JSON (#castle/json or app/castle+json); check its syntax"
        }
        MetadataError::InvalidUrl { .. } => "Check that the URL is absolute and well formed",
        MetadataError::DnsResolution { .. } => "Check the hostname and your DNS configuration",
        MetadataError::Fetch { .. } | MetadataError::TooManyRedirects { .. } => {
            "Check your internet connection and that the server is reachable"
        }
        MetadataError::HttpClient { .. } => "Check the TLS and proxy configuration of this host",
    }
}
