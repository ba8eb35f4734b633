//! Page scraping and rewriting
//!
//! Scraping one page runs in three steps:
//! 1. Plan: parse the page and resolve every stylesheet, script, and image
//!    reference in document order
//! 2. Fetch: download all planned resources concurrently
//! 3. Rewrite: parse again, assign local paths in document order, mutate the
//!    tree, and serialize it
//!
//! Local path counters live in a [`PathCounters`] value created per page, so
//! file names depend only on document order and fetch outcomes, never on the
//! order in which fetches complete or on other pages scraped at the same time.
//! The DOM (`kuchiki`, reference counted) only exists inside the synchronous
//! plan and rewrite steps.

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::types::{CloneIssue, Page, Resource, ResourceContent, ResourceKind};
use crate::url::{local_nav_href, resolve_url};
use futures::future::join_all;
use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use std::path::Path;
use thiserror::Error;
use url::Url;

const STYLESHEET_SELECTOR: &str = "link[rel=\"stylesheet\"]";
const INLINE_STYLE_SELECTOR: &str = "style";
const SCRIPT_SELECTOR: &str = "script[src]";
const IMAGE_SELECTOR: &str = "img";
const ANCHOR_SELECTOR: &str = "a[href]";

/// Image attributes pointing at remote variants with no local counterpart
const RESPONSIVE_IMAGE_ATTRS: &[&str] = &["srcset", "sizes", "data-nimg"];

/// Extension used when an image URL path has none
const DEFAULT_IMAGE_EXTENSION: &str = ".png";

/// Errors that make a single page unusable
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid selector: {0}")]
    Selector(&'static str),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("serialized document is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A scraped page plus the resource misses recorded while scraping it
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub page: Page,
    pub issues: Vec<CloneIssue>,
}

/// Naming slots with their own counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterSlot {
    Style = 0,
    InlineStyle = 1,
    Script = 2,
    Image = 3,
}

/// Per-page counters for generated resource paths, indexed by slot
#[derive(Debug, Default)]
struct PathCounters {
    next: [usize; 4],
}

impl PathCounters {
    /// Allocates the next local path for `slot`
    ///
    /// `extension` is only used for images.
    fn allocate(&mut self, slot: CounterSlot, slug: &str, extension: &str) -> String {
        let n = self.next[slot as usize];
        self.next[slot as usize] += 1;

        let (kind, file) = match slot {
            CounterSlot::Style => (ResourceKind::Css, format!("{}-style{}.css", slug, n)),
            CounterSlot::InlineStyle => {
                (ResourceKind::Css, format!("{}-inline-style{}.css", slug, n))
            }
            CounterSlot::Script => (ResourceKind::Js, format!("{}-script{}.js", slug, n)),
            CounterSlot::Image => {
                (ResourceKind::Image, format!("{}-image{}{}", slug, n, extension))
            }
        };
        format!("{}/{}", kind.directory(), file)
    }
}

/// Resolved remote references, one entry per matched element in document
/// order; `None` marks an element with nothing to fetch
#[derive(Debug, Default)]
struct ResourcePlan {
    stylesheets: Vec<Option<Url>>,
    scripts: Vec<Option<Url>>,
    images: Vec<Option<Url>>,
}

type FetchOutcome = Option<(Url, Result<ResourceContent, FetchError>)>;

/// Fetch results aligned with a [`ResourcePlan`]
#[derive(Debug, Default)]
struct FetchedResources {
    stylesheets: Vec<FetchOutcome>,
    scripts: Vec<FetchOutcome>,
    images: Vec<FetchOutcome>,
}

/// Rewritten document plus what was localized for it
#[derive(Debug)]
struct Rewritten {
    html: String,
    resources: Vec<Resource>,
    issues: Vec<CloneIssue>,
}

/// Scrapes one page: fetches it, localizes its resources, and rewrites it
///
/// # Arguments
///
/// * `fetcher` - Network access for the job
/// * `page_url` - The page to scrape
/// * `slug` - Namespace for the page's generated file names
/// * `folder` - Root folder name of the clone
///
/// # Returns
///
/// * `Ok(ScrapeOutcome)` - The page, with per-resource misses as issues
/// * `Err(ScrapeError)` - The page itself could not be fetched or rewritten
pub async fn scrape_page(
    fetcher: &Fetcher,
    page_url: &Url,
    slug: &str,
    folder: &str,
) -> Result<ScrapeOutcome, ScrapeError> {
    let html = fetcher.fetch_text(page_url).await?;

    let (plan, mut issues) = plan_resources(&html, page_url)?;

    let (stylesheets, scripts, images) = tokio::join!(
        fetch_planned(fetcher, plan.stylesheets, ResourceKind::Css),
        fetch_planned(fetcher, plan.scripts, ResourceKind::Js),
        fetch_planned(fetcher, plan.images, ResourceKind::Image),
    );

    let fetched = FetchedResources {
        stylesheets,
        scripts,
        images,
    };

    let rewritten = rewrite_document(&html, page_url, slug, folder, fetched)?;
    issues.extend(rewritten.issues);

    tracing::debug!(
        "Scraped {} as '{}' ({} resources, {} misses)",
        page_url,
        slug,
        rewritten.resources.len(),
        issues.len()
    );

    Ok(ScrapeOutcome {
        page: Page {
            url: page_url.to_string(),
            slug: slug.to_string(),
            html: rewritten.html,
            resources: rewritten.resources,
        },
        issues,
    })
}

/// Fetches every planned reference of one kind, keeping plan order
async fn fetch_planned(
    fetcher: &Fetcher,
    urls: Vec<Option<Url>>,
    kind: ResourceKind,
) -> Vec<FetchOutcome> {
    join_all(urls.into_iter().map(|url| async move {
        let url = url?;
        let result = match kind {
            ResourceKind::Image => fetcher.fetch_bytes(&url).await.map(ResourceContent::Binary),
            ResourceKind::Css | ResourceKind::Js => {
                fetcher.fetch_text(&url).await.map(ResourceContent::Text)
            }
        };
        Some((url, result))
    }))
    .await
}

/// Resolves the remote references of a page in document order
fn plan_resources(
    html: &str,
    page_url: &Url,
) -> Result<(ResourcePlan, Vec<CloneIssue>), ScrapeError> {
    let document = kuchiki::parse_html().one(html);
    let mut issues = Vec::new();

    let mut plan_kind = |selector: &'static str, attr: &str, kind: ResourceKind| {
        select_all(&document, selector).map(|elements| {
            elements
                .iter()
                .map(|element| {
                    let attributes = element.attributes.borrow();
                    plan_reference(attributes.get(attr), page_url, kind, &mut issues)
                })
                .collect::<Vec<_>>()
        })
    };

    let plan = ResourcePlan {
        stylesheets: plan_kind(STYLESHEET_SELECTOR, "href", ResourceKind::Css)?,
        scripts: plan_kind(SCRIPT_SELECTOR, "src", ResourceKind::Js)?,
        images: plan_kind(IMAGE_SELECTOR, "src", ResourceKind::Image)?,
    };

    Ok((plan, issues))
}

fn plan_reference(
    reference: Option<&str>,
    page_url: &Url,
    kind: ResourceKind,
    issues: &mut Vec<CloneIssue>,
) -> Option<Url> {
    let reference = reference.map(str::trim).filter(|r| !r.is_empty())?;

    // Already embedded; nothing to localize.
    if reference.starts_with("data:") {
        return None;
    }

    match resolve_url(page_url, reference) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!("Cannot resolve {:?} reference {}: {}", kind, reference, e);
            issues.push(CloneIssue::ResourceFetch {
                page: page_url.to_string(),
                url: reference.to_string(),
                kind,
                reason: e.to_string(),
            });
            None
        }
    }
}

/// Applies fetch results to a fresh parse of the page and serializes it
fn rewrite_document(
    html: &str,
    page_url: &Url,
    slug: &str,
    folder: &str,
    fetched: FetchedResources,
) -> Result<Rewritten, ScrapeError> {
    let document = kuchiki::parse_html().one(html);
    let mut counters = PathCounters::default();
    let mut resources = Vec::new();
    let mut issues = Vec::new();

    let mut record_miss = |kind: ResourceKind, url: &Url, error: &FetchError| {
        tracing::warn!("Keeping remote {:?} {}: {}", kind, url, error);
        issues.push(CloneIssue::ResourceFetch {
            page: page_url.to_string(),
            url: url.to_string(),
            kind,
            reason: error.to_string(),
        });
    };

    // Stylesheets
    let links = select_all(&document, STYLESHEET_SELECTOR)?;
    for (link, outcome) in links.iter().zip(fetched.stylesheets) {
        let Some((url, result)) = outcome else {
            continue;
        };
        match result {
            Ok(content) => {
                let path = counters.allocate(CounterSlot::Style, slug, "");
                link.attributes.borrow_mut().insert("href", path.clone());
                resources.push(Resource {
                    kind: ResourceKind::Css,
                    relative_path: path,
                    content,
                    source_url: Some(url.to_string()),
                });
            }
            Err(e) => record_miss(ResourceKind::Css, &url, &e),
        }
    }

    // Inline styles
    let styles = select_all(&document, INLINE_STYLE_SELECTOR)?;
    for style in styles {
        let node = style.as_node();
        let path = counters.allocate(CounterSlot::InlineStyle, slug, "");
        node.insert_before(stylesheet_link(&path)?);
        resources.push(Resource {
            kind: ResourceKind::Css,
            relative_path: path,
            content: ResourceContent::Text(node.text_contents()),
            source_url: None,
        });
        node.detach();
    }

    // Scripts with a src; inline bodies stay as they are
    let scripts = select_all(&document, SCRIPT_SELECTOR)?;
    for (script, outcome) in scripts.iter().zip(fetched.scripts) {
        let Some((url, result)) = outcome else {
            continue;
        };
        match result {
            Ok(content) => {
                let path = counters.allocate(CounterSlot::Script, slug, "");
                script.attributes.borrow_mut().insert("src", path.clone());
                resources.push(Resource {
                    kind: ResourceKind::Js,
                    relative_path: path,
                    content,
                    source_url: Some(url.to_string()),
                });
            }
            Err(e) => record_miss(ResourceKind::Js, &url, &e),
        }
    }

    // Images
    let images = select_all(&document, IMAGE_SELECTOR)?;
    for (image, outcome) in images.iter().zip(fetched.images) {
        let Some((url, result)) = outcome else {
            continue;
        };
        match result {
            Ok(content) => {
                let path = counters.allocate(CounterSlot::Image, slug, &image_extension(&url));
                let mut attributes = image.attributes.borrow_mut();
                attributes.insert("src", path.clone());
                for attr in RESPONSIVE_IMAGE_ATTRS {
                    attributes.remove(*attr);
                }
                resources.push(Resource {
                    kind: ResourceKind::Image,
                    relative_path: path,
                    content,
                    source_url: Some(url.to_string()),
                });
            }
            Err(e) => record_miss(ResourceKind::Image, &url, &e),
        }
    }

    // Internal navigation
    let anchors = select_all(&document, ANCHOR_SELECTOR)?;
    for anchor in anchors {
        let mut attributes = anchor.attributes.borrow_mut();
        let target = attributes
            .get("href")
            .and_then(|href| local_nav_href(href, folder));
        if let Some(target) = target {
            attributes.insert("href", target);
            attributes.insert("target", "_blank".to_string());
        }
    }

    let mut output = Vec::new();
    document.serialize(&mut output)?;

    Ok(Rewritten {
        html: String::from_utf8(output)?,
        resources,
        issues,
    })
}

fn select_all(
    document: &NodeRef,
    selector: &'static str,
) -> Result<Vec<NodeDataRef<ElementData>>, ScrapeError> {
    document
        .select(selector)
        .map(|matches| matches.collect())
        .map_err(|()| ScrapeError::Selector(selector))
}

/// Builds a detached `<link rel="stylesheet" href="...">` node
fn stylesheet_link(href: &str) -> Result<NodeRef, ScrapeError> {
    let fragment = kuchiki::parse_html().one("<link rel=\"stylesheet\">");
    let link = fragment
        .select_first("link")
        .map_err(|()| ScrapeError::Selector("link"))?;
    link.attributes.borrow_mut().insert("href", href.to_string());

    let node = link.as_node().clone();
    node.detach();
    Ok(node)
}

/// File extension of an image URL's path, with the leading dot
fn image_extension(url: &Url) -> String {
    Path::new(url.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}
