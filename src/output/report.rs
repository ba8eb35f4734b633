//! Job report for packaged clones
//!
//! This module provides the summary returned by a packaged clone and its
//! terminal rendering.

use crate::config::OutputFormat;
use crate::crawler::{CloneIssue, PageSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of a clone written through a packager
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    /// Root folder name shared by every output entry
    pub folder_name: String,

    /// Packaging format used
    pub format: OutputFormat,

    /// Location of the finished tree or archive
    pub output: PathBuf,

    /// Pages written, in crawl order
    pub pages: Vec<PageSummary>,

    /// Number of entries written (pages and resources)
    pub entries: usize,

    /// Soft failures recorded during the job
    pub errors: Vec<CloneIssue>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PackageReport {
    /// Number of localized resources across all pages
    pub fn resource_count(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.css_files.len() + p.js_files.len() + p.image_files.len())
            .sum()
    }

    /// Soft failures grouped by kind
    pub fn error_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for error in &self.errors {
            let kind = match error {
                CloneIssue::LinkCheck { .. } => "link checks",
                CloneIssue::ResourceFetch { .. } => "resource fetches",
                CloneIssue::PageScrape { .. } => "page scrapes",
                CloneIssue::PageWrite { .. } => "page writes",
            };
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &PackageReport) {
    println!("=== Clone Summary ===\n");

    println!("Output:");
    println!("  Folder: {}", report.folder_name);
    println!("  Written to: {}", report.output.display());
    println!("  Format: {:?}", report.format);
    println!("  Entries: {}", report.entries);
    println!("  Duration: {}s", report.duration_seconds());
    println!();

    println!("Pages ({}):", report.pages.len());
    for page in &report.pages {
        println!(
            "  {} <- {} ({} css, {} js, {} images)",
            page.file,
            page.url,
            page.css_files.len(),
            page.js_files.len(),
            page.image_files.len()
        );
    }
    println!();

    if report.errors.is_empty() {
        println!("No errors recorded");
        return;
    }

    println!("Errors ({}):", report.errors.len());
    for (kind, count) in report.error_counts() {
        println!("  {}: {}", kind, count);
    }
    println!();

    for error in &report.errors {
        println!("  - {}", error);
    }
}
