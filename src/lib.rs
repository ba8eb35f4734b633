//! Site-Clone: a static website cloner
//!
//! This crate discovers same-origin pages reachable from a seed URL, localizes
//! each page's stylesheets, scripts, and images, rewrites the HTML to point at
//! a self-consistent local layout, and packages the result as a directory tree
//! or a single zip archive.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for a clone job
///
/// Every variant is fatal for the job (or, for `Packaging`, for the output
/// artifact). Recoverable misses are reported as [`crawler::CloneIssue`]
/// values alongside a successful result instead.
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL {url}: {source}")]
    InvalidSeed { url: String, source: UrlError },

    #[error("Seed page {url} is unreachable: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("Packaging failed: {0}")]
    Packaging(#[from] output::PackageError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid job state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::JobState,
        to: state::JobState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for clone operations
pub type Result<T> = std::result::Result<T, CloneError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{clone_site, CloneIssue, CloneReport, Cloner, Page, Resource, ResourceKind};
pub use output::{OutputFormat, PackageReport, Packager};
pub use state::JobState;
pub use url::{folder_name, slug_for};
