use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Site-Clone
///
/// Every section is optional; a missing file or an empty file yields
/// [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How a discovered candidate link is checked for reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkProbe {
    /// Full GET of the candidate page
    #[default]
    Get,
    /// HEAD request only
    Head,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of unique candidate links to check (unlimited if unset)
    #[serde(rename = "max-links", default)]
    pub max_links: Option<usize>,

    /// Maximum number of pages scraped concurrently
    #[serde(rename = "max-concurrent-pages", default = "default_concurrent_pages")]
    pub max_concurrent_pages: usize,

    /// Maximum number of link reachability checks in flight
    #[serde(
        rename = "max-concurrent-link-checks",
        default = "default_concurrent_link_checks"
    )]
    pub max_concurrent_link_checks: usize,

    /// Maximum number of network requests in flight across the whole job
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Reachability check method
    #[serde(rename = "link-probe", default)]
    pub link_probe: LinkProbe,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_links: None,
            max_concurrent_pages: default_concurrent_pages(),
            max_concurrent_link_checks: default_concurrent_link_checks(),
            max_concurrent_fetches: default_concurrent_fetches(),
            link_probe: LinkProbe::default(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total time allowed for one request, body included (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Packaging format of the clone
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain directory tree
    #[default]
    Directory,
    /// Single zip archive
    Zip,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the clone (tree or archive) is written into
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Packaging format
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
        }
    }
}

fn default_concurrent_pages() -> usize {
    4
}

fn default_concurrent_link_checks() -> usize {
    8
}

fn default_concurrent_fetches() -> usize {
    16
}

fn default_user_agent() -> String {
    format!("site-clone/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}
