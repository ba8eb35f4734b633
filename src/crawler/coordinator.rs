//! Clone job coordinator
//!
//! This module drives one clone job end to end:
//! - Validating the seed and deriving the folder name
//! - Running link discovery to build the crawl set
//! - Scraping every confirmed page with bounded concurrency
//! - Handing pages to a sink (in-memory collection or a packager) in crawl order
//! - Tracking the job state and recording soft failures
//!
//! Pages are streamed to the sink as they complete, so a packaged job holds at
//! most `max-concurrent-pages` scraped pages in memory at once.

use crate::config::{validate, Config, OutputFormat};
use crate::crawler::discover::{discover_links, Discovery};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::page::scrape_page;
use crate::crawler::types::{CloneIssue, CloneReport, Page, PageSummary};
use crate::output::{PackageError, PackageReport};
use crate::state::JobState;
use crate::url::{folder_name, SlugRegistry};
use crate::{CloneError, UrlError};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::pin;
use std::sync::Arc;
use url::Url;

/// Runs clone jobs with one configuration and one HTTP client
#[derive(Debug, Clone)]
pub struct Cloner {
    config: Arc<Config>,
    fetcher: Fetcher,
}

impl Cloner {
    /// Creates a new cloner
    ///
    /// # Arguments
    ///
    /// * `config` - The job configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Cloner)` - Configuration is valid and the HTTP client was built
    /// * `Err(CloneError)` - Invalid configuration or client setup failure
    pub fn new(config: Config) -> Result<Self, CloneError> {
        validate(&config)?;
        let fetcher = Fetcher::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs link discovery only
    pub async fn discover(&self, seed: &str) -> Result<Discovery, CloneError> {
        let seed = parse_seed(seed)?;
        discover_links(&self.fetcher, &seed, &self.config.crawler).await
    }

    /// Clones a site into memory
    ///
    /// # Returns
    ///
    /// * `Ok(CloneReport)` - Folder name, scraped pages in crawl order, and
    ///   soft failures
    /// * `Err(CloneError)` - The seed is invalid or unreachable
    pub async fn clone_site(&self, seed: &str) -> Result<CloneReport, CloneError> {
        let mut job = Job::new();
        job.advance(JobState::Discovering)?;

        let (seed, folder) = match prepare_seed(seed) {
            Ok(prepared) => prepared,
            Err(e) => return Err(job.fail(e)),
        };

        let mut pages = Vec::new();
        let result = self
            .run(&seed, &folder, &mut job, |page| {
                pages.push(page);
                Ok(Vec::new())
            })
            .await;

        let errors = match result {
            Ok(errors) => errors,
            Err(e) => return Err(job.fail(e)),
        };

        // Nothing to finalize for in-memory output.
        job.advance(JobState::Packaging)?;
        job.advance(JobState::Done)?;

        Ok(CloneReport {
            folder_name: folder,
            pages,
            errors,
            started_at: job.started_at,
            finished_at: Utc::now(),
        })
    }

    /// Clones a site and packages it under `output_dir`
    ///
    /// # Returns
    ///
    /// * `Ok(PackageReport)` - The finished artifact and soft failures
    /// * `Err(CloneError)` - The seed is invalid or unreachable, or packaging
    ///   failed; no output is left behind in either case
    pub async fn clone_into(
        &self,
        seed: &str,
        format: OutputFormat,
        output_dir: &Path,
    ) -> Result<PackageReport, CloneError> {
        let mut job = Job::new();
        job.advance(JobState::Discovering)?;

        let (seed, folder) = match prepare_seed(seed) {
            Ok(prepared) => prepared,
            Err(e) => return Err(job.fail(e)),
        };

        let mut packager = match format.packager(output_dir, &folder) {
            Ok(packager) => packager,
            Err(e) => return Err(job.fail(e.into())),
        };

        let mut summaries: Vec<PageSummary> = Vec::new();
        let result = self
            .run(&seed, &folder, &mut job, |page| {
                let issues = packager.add_page(&page)?;
                summaries.push(page.summary());
                Ok(issues)
            })
            .await;

        let errors = match result {
            Ok(errors) => errors,
            Err(e) => return Err(job.fail(e)),
        };

        job.advance(JobState::Packaging)?;
        let manifest = match packager.finish() {
            Ok(manifest) => manifest,
            Err(e) => return Err(job.fail(e.into())),
        };
        job.advance(JobState::Done)?;

        Ok(PackageReport {
            folder_name: folder,
            format,
            output: manifest.location,
            pages: summaries,
            entries: manifest.entries.len(),
            errors,
            started_at: job.started_at,
            finished_at: Utc::now(),
        })
    }

    /// Discovers and scrapes, feeding each page to `sink` in crawl order
    ///
    /// Returns every soft failure recorded by discovery, scraping, and the
    /// sink.
    async fn run<F>(
        &self,
        seed: &Url,
        folder: &str,
        job: &mut Job,
        mut sink: F,
    ) -> Result<Vec<CloneIssue>, CloneError>
    where
        F: FnMut(Page) -> Result<Vec<CloneIssue>, PackageError>,
    {
        tracing::info!("Cloning {} into '{}'", seed, folder);

        let Discovery {
            crawl_set,
            dropped: mut errors,
        } = discover_links(&self.fetcher, seed, &self.config.crawler).await?;

        job.advance(JobState::Scraping)?;

        let mut slugs = SlugRegistry::new();
        let targets: Vec<(Url, String)> = crawl_set
            .into_vec()
            .into_iter()
            .map(|url| {
                let slug = slugs.claim(&url);
                (url, slug)
            })
            .collect();
        let total = targets.len();

        let fetcher = &self.fetcher;
        let mut scrapes = pin!(stream::iter(targets.into_iter().enumerate())
            .map(|(index, (url, slug))| async move {
                let result = scrape_page(fetcher, &url, &slug, folder).await;
                (index, url, result)
            })
            .buffered(self.config.crawler.max_concurrent_pages));

        let mut scraped = 0;
        while let Some((index, url, result)) = scrapes.next().await {
            match result {
                Ok(outcome) => {
                    errors.extend(outcome.issues);
                    errors.extend(sink(outcome.page)?);
                    scraped += 1;
                }
                // The seed is always first; without it there is no clone.
                Err(e) if index == 0 => {
                    return Err(CloneError::SeedUnreachable {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping page {}: {}", url, e);
                    errors.push(CloneIssue::PageScrape {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Scraped {}/{} pages ({} soft failures)",
            scraped,
            total,
            errors.len()
        );

        Ok(errors)
    }
}

/// Clones a site into memory with the given configuration
///
/// This is the main entry point for library callers. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Derive the folder name from the seed host
/// 3. Discover and check same-origin links
/// 4. Scrape every confirmed page
///
/// # Example
///
/// ```no_run
/// use site_clone::{clone_site, Config};
///
/// # async fn run() -> site_clone::Result<()> {
/// let report = clone_site("https://example.com/", Config::default()).await?;
/// println!("{}: {} pages", report.folder_name, report.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn clone_site(seed: &str, config: Config) -> Result<CloneReport, CloneError> {
    Cloner::new(config)?.clone_site(seed).await
}

/// State of one running job
#[derive(Debug)]
struct Job {
    state: JobState,
    started_at: DateTime<Utc>,
}

impl Job {
    fn new() -> Self {
        Self {
            state: JobState::Idle,
            started_at: Utc::now(),
        }
    }

    fn advance(&mut self, next: JobState) -> Result<(), CloneError> {
        if !self.state.can_transition_to(next) {
            return Err(CloneError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("Job state: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Moves the job to `Failed` and hands the error back
    fn fail(&mut self, error: CloneError) -> CloneError {
        if self.state.can_transition_to(JobState::Failed) {
            tracing::error!("Job failed while {}: {}", self.state, error);
            self.state = JobState::Failed;
        }
        error
    }
}

/// Parses the seed and derives the job's folder name
fn prepare_seed(seed: &str) -> Result<(Url, String), CloneError> {
    let url = parse_seed(seed)?;
    let folder = folder_name(&url).map_err(|source| CloneError::InvalidSeed {
        url: seed.to_string(),
        source,
    })?;
    Ok((url, folder))
}

/// Parses a seed URL; only absolute HTTP(S) URLs are accepted
fn parse_seed(seed: &str) -> Result<Url, CloneError> {
    let invalid = |source: UrlError| CloneError::InvalidSeed {
        url: seed.to_string(),
        source,
    };

    let mut url = Url::parse(seed.trim()).map_err(|e| invalid(UrlError::Parse(e.to_string())))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(UrlError::InvalidScheme(url.scheme().to_string())));
    }
    if url.host_str().is_none() {
        return Err(invalid(UrlError::MissingHost));
    }

    url.set_fragment(None);
    Ok(url)
}
