//! Same-origin link discovery
//!
//! This module builds the crawl set of a job from its seed page:
//! - Extracting anchor targets from the seed HTML
//! - Dropping absolute (cross-origin), `mailto:` and `tel:` links
//! - Deduplicating candidates
//! - Confirming each candidate with a reachability check
//!
//! The seed is always the first member of the crawl set. Checks run
//! concurrently but results are consumed in candidate order, so the crawl set
//! never depends on which check finished first.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::types::CloneIssue;
use crate::url::{classify_href, resolve_url, strip_leading_slash};
use crate::CloneError;
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Confirmed page URLs of one job
///
/// Never empty: the seed always comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSet {
    urls: Vec<Url>,
}

impl CrawlSet {
    /// Creates a crawl set holding only the seed
    pub fn new(seed: Url) -> Self {
        Self { urls: vec![seed] }
    }

    /// Adds a confirmed URL; returns false if it was already present
    pub fn insert(&mut self, url: Url) -> bool {
        if self.contains(&url) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn seed(&self) -> &Url {
        &self.urls[0]
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.urls.iter()
    }

    pub fn into_vec(self) -> Vec<Url> {
        self.urls
    }
}

/// Outcome of a discovery run
#[derive(Debug, Clone)]
pub struct Discovery {
    pub crawl_set: CrawlSet,
    /// Candidates that failed their reachability check
    pub dropped: Vec<CloneIssue>,
}

/// Fetches the seed page and builds the crawl set
///
/// # Arguments
///
/// * `fetcher` - Network access for the job
/// * `seed` - Absolute seed URL (without fragment)
/// * `config` - Crawler configuration (candidate cap, check concurrency)
///
/// # Returns
///
/// * `Ok(Discovery)` - The crawl set and the dropped candidates
/// * `Err(CloneError::SeedUnreachable)` - The seed page could not be fetched
pub async fn discover_links(
    fetcher: &Fetcher,
    seed: &Url,
    config: &CrawlerConfig,
) -> Result<Discovery, CloneError> {
    let html = fetcher
        .fetch_text(seed)
        .await
        .map_err(|e| CloneError::SeedUnreachable {
            url: seed.to_string(),
            reason: e.to_string(),
        })?;

    let mut candidates = extract_candidates(&html, seed);
    if let Some(max_links) = config.max_links {
        candidates.truncate(max_links);
    }

    tracing::info!("Checking {} candidate links from {}", candidates.len(), seed);

    let checks: Vec<_> = stream::iter(candidates)
        .map(|url| async move {
            let result = fetcher.check(&url).await;
            (url, result)
        })
        .buffered(config.max_concurrent_link_checks)
        .collect()
        .await;

    let mut crawl_set = CrawlSet::new(seed.clone());
    let mut dropped = Vec::new();

    for (url, result) in checks {
        match result {
            Ok(()) => {
                tracing::debug!("Confirmed link: {}", url);
                crawl_set.insert(url);
            }
            Err(e) => {
                tracing::debug!("Dropping link {}: {}", url, e);
                dropped.push(CloneIssue::LinkCheck {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Crawl set has {} pages ({} candidates dropped)",
        crawl_set.len(),
        dropped.len()
    );

    Ok(Discovery { crawl_set, dropped })
}

/// Extracts deduplicated same-origin candidate URLs from the seed HTML
///
/// # Extraction Rules
///
/// - Only `<a href="...">` elements are considered
/// - Empty, absolute (including protocol-relative), `mailto:` and `tel:`
///   hrefs are skipped
/// - Hrefs are keyed with one leading `/` stripped, so `/about` and `about`
///   count once
/// - Fragments are dropped after resolution; the seed itself is never a
///   candidate
///
/// Candidates keep the document order of their first occurrence.
pub fn extract_candidates(html: &str, seed: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return candidates;
    };

    let mut seen_hrefs = HashSet::new();
    let mut seen_urls = HashSet::new();
    seen_urls.insert(seed.as_str().to_string());

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();

        if !classify_href(href).is_internal() {
            continue;
        }

        if !seen_hrefs.insert(strip_leading_slash(href).to_string()) {
            continue;
        }

        match resolve_url(seed, href) {
            Ok(mut url) => {
                url.set_fragment(None);
                if seen_urls.insert(url.as_str().to_string()) {
                    candidates.push(url);
                }
            }
            Err(e) => {
                tracing::debug!("Skipping unresolvable href {}: {}", href, e);
            }
        }
    }

    candidates
}
