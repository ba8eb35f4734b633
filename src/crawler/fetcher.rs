//! HTTP fetcher implementation
//!
//! This module handles all network access for a clone job:
//! - Building the HTTP client from the `[http]` configuration
//! - Text fetches (HTML, stylesheets, scripts) decoded per the response charset
//! - Binary fetches (images) kept as raw bytes
//! - Reachability checks for discovered links
//! - Error classification (status, timeout, connect, other network failures)
//!
//! Every request holds a permit from a job-wide semaphore, so the number of
//! in-flight requests stays bounded no matter how many pages are scraped at
//! once.

use crate::config::{Config, HttpConfig, LinkProbe};
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Semaphore, SemaphorePermit};
use url::Url;

/// Failure of a single network operation
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_clone::config::HttpConfig;
/// use site_clone::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Network access shared by discovery and page scraping
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    permits: Arc<Semaphore>,
    probe: LinkProbe,
}

impl Fetcher {
    /// Creates a fetcher from the job configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.http)?;
        Ok(Self::with_client(
            client,
            config.crawler.max_concurrent_fetches,
            config.crawler.link_probe,
        ))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, max_in_flight: usize, probe: LinkProbe) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            probe,
        }
    }

    /// Fetches a URL and decodes the body as text
    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let _permit = self.acquire(url).await?;
        let response = self.send(self.client.get(url.clone()), url).await?;
        response.text().await.map_err(|e| classify_error(url, e))
    }

    /// Fetches a URL and returns the raw body bytes
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let _permit = self.acquire(url).await?;
        let response = self.send(self.client.get(url.clone()), url).await?;
        let bytes = response.bytes().await.map_err(|e| classify_error(url, e))?;
        Ok(bytes.to_vec())
    }

    /// Checks that a URL answers with a 2xx status
    ///
    /// Uses a full GET (body read and discarded) or a HEAD request depending
    /// on the configured [`LinkProbe`].
    pub async fn check(&self, url: &Url) -> Result<(), FetchError> {
        match self.probe {
            LinkProbe::Get => self.fetch_bytes(url).await.map(|_| ()),
            LinkProbe::Head => {
                let _permit = self.acquire(url).await?;
                self.send(self.client.head(url.clone()), url)
                    .await
                    .map(|_| ())
            }
        }
    }

    async fn acquire(&self, url: &Url) -> Result<SemaphorePermit<'_>, FetchError> {
        self.permits
            .acquire()
            .await
            .map_err(|_| FetchError::Network {
                url: url.to_string(),
                message: "fetch limiter closed".to_string(),
            })
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, FetchError> {
        let response = request.send().await.map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} answered HTTP {}", url, status.as_u16());
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Connect {
            url,
            message: error.to_string(),
        }
    } else {
        FetchError::Network {
            url,
            message: error.to_string(),
        }
    }
}
