//! Crawler module for discovering, fetching, and rewriting pages
//!
//! This module contains the core clone pipeline, including:
//! - HTTP fetching with a job-wide request limit
//! - Same-origin link discovery from the seed page
//! - Per-page resource localization and HTML rewriting
//! - Overall job coordination

mod coordinator;
mod discover;
mod fetcher;
mod page;
mod types;

pub use coordinator::{clone_site, Cloner};
pub use discover::{discover_links, extract_candidates, CrawlSet, Discovery};
pub use fetcher::{build_http_client, FetchError, Fetcher};
pub use page::{scrape_page, ScrapeError, ScrapeOutcome};
pub use types::{
    CloneIssue, CloneReport, Page, PageSummary, Resource, ResourceContent, ResourceKind,
};
