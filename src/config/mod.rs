//! Configuration module for Site-Clone
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_clone::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-clone.toml")).unwrap();
//! println!("Request timeout: {}s", config.http.request_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, LinkProbe, OutputConfig, OutputFormat};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};

pub use validation::validate;
