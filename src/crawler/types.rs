//! Data model of a clone job: localized resources, scraped pages, soft
//! failures, and the job report handed back to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Kind of a localized resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Css,
    Js,
    Image,
}

impl ResourceKind {
    /// Directory the resource lives in, relative to the clone root
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::Image => "images",
        }
    }
}

/// Body of a localized resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceContent {
    Text(String),
    Binary(Vec<u8>),
}

impl ResourceContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// One stylesheet, script, or image localized for a page
#[derive(Debug, Clone)]
pub struct Resource {
    pub kind: ResourceKind,
    /// Path relative to the clone root (`css/index-style0.css`)
    pub relative_path: String,
    pub content: ResourceContent,
    /// Remote URL it was fetched from; `None` for extracted inline styles
    pub source_url: Option<String>,
}

/// A scraped page with its rewritten HTML and localized resources
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub slug: String,
    pub html: String,
    /// Resources in localization order (stylesheets, inline styles, scripts, images)
    pub resources: Vec<Resource>,
}

impl Page {
    /// File name of the page itself, relative to the clone root
    pub fn file_name(&self) -> String {
        format!("{}.html", self.slug)
    }

    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    pub fn css_files(&self) -> Vec<&Resource> {
        self.resources_of(ResourceKind::Css).collect()
    }

    pub fn js_files(&self) -> Vec<&Resource> {
        self.resources_of(ResourceKind::Js).collect()
    }

    pub fn image_files(&self) -> Vec<&Resource> {
        self.resources_of(ResourceKind::Image).collect()
    }

    /// All (relative path, content) entries this page contributes to the output
    pub fn entries(&self) -> impl Iterator<Item = (String, &[u8])> {
        std::iter::once((self.file_name(), self.html.as_bytes())).chain(
            self.resources
                .iter()
                .map(|r| (r.relative_path.clone(), r.content.as_bytes())),
        )
    }

    pub fn summary(&self) -> PageSummary {
        let paths = |kind: ResourceKind| -> Vec<String> {
            self.resources_of(kind)
                .map(|r| r.relative_path.clone())
                .collect()
        };
        PageSummary {
            url: self.url.clone(),
            slug: self.slug.clone(),
            file: self.file_name(),
            css_files: paths(ResourceKind::Css),
            js_files: paths(ResourceKind::Js),
            image_files: paths(ResourceKind::Image),
        }
    }
}

/// Page listing without content, for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub url: String,
    pub slug: String,
    pub file: String,
    pub css_files: Vec<String>,
    pub js_files: Vec<String>,
    pub image_files: Vec<String>,
}

/// A recoverable failure recorded during a job
///
/// Issues never abort the job; they travel with the result so callers can
/// tell "some output with some misses" apart from a fatal error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CloneIssue {
    /// A discovered candidate link was dropped
    #[error("link check failed for {url}: {reason}")]
    LinkCheck { url: String, reason: String },

    /// A referenced resource could not be localized; the element keeps its
    /// remote reference
    #[error("{kind:?} resource {url} on {page} not localized: {reason}")]
    ResourceFetch {
        page: String,
        url: String,
        kind: ResourceKind,
        reason: String,
    },

    /// A page could not be fetched or parsed and was skipped
    #[error("page {url} skipped: {reason}")]
    PageScrape { url: String, reason: String },

    /// An output entry could not be written
    #[error("failed to write {path}: {reason}")]
    PageWrite { path: String, reason: String },
}

/// Result of an in-memory clone
#[derive(Debug, Clone)]
pub struct CloneReport {
    pub folder_name: String,
    pub pages: Vec<Page>,
    pub errors: Vec<CloneIssue>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CloneReport {
    /// Total number of localized resources across all pages
    pub fn resource_count(&self) -> usize {
        self.pages.iter().map(|p| p.resources.len()).sum()
    }
}
