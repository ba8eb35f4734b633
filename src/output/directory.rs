//! Directory tree packager
//!
//! Entries are written under a hidden staging directory created inside the
//! output directory. `finish` renames the staged tree to
//! `{output}/{folder}`, replacing an earlier clone of the same site. Dropping
//! the packager before `finish` removes the staging tree.

use super::traits::{ensure_relative, ArchiveManifest, PackageError, PackageResult, Packager};
use crate::config::OutputFormat;
use crate::crawler::{CloneIssue, Page};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of staging directories and temporary archives
pub(crate) const STAGING_PREFIX: &str = ".site-clone-";

/// Writes a clone as a plain directory tree
#[derive(Debug)]
pub struct DirectoryPackager {
    staging: TempDir,
    root: String,
    target: PathBuf,
    entries: Vec<String>,
}

impl DirectoryPackager {
    /// Creates a packager writing `{output_dir}/{folder}`
    ///
    /// `output_dir` is created if missing.
    pub fn new(output_dir: &Path, folder: &str) -> PackageResult<Self> {
        ensure_relative(folder)?;
        fs::create_dir_all(output_dir)?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(output_dir)?;

        tracing::debug!("Staging clone in {}", staging.path().display());

        Ok(Self {
            staging,
            root: folder.to_string(),
            target: OutputFormat::Directory.target_path(output_dir, folder),
            entries: Vec::new(),
        })
    }

    fn staged_root(&self) -> PathBuf {
        self.staging.path().join(&self.root)
    }

    fn write_entry(&self, relative: &str, content: &[u8]) -> PackageResult<()> {
        ensure_relative(relative)?;

        let path = self.staged_root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(())
    }
}

impl Packager for DirectoryPackager {
    fn add_page(&mut self, page: &Page) -> PackageResult<Vec<CloneIssue>> {
        let mut issues = Vec::new();

        for (relative, content) in page.entries() {
            match self.write_entry(&relative, content) {
                Ok(()) => self.entries.push(relative),
                Err(e) => {
                    tracing::warn!("Failed to write {}: {}", relative, e);
                    issues.push(CloneIssue::PageWrite {
                        path: relative,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(issues)
    }

    fn finish(self: Box<Self>) -> PackageResult<ArchiveManifest> {
        let staged = self.staged_root();
        // A job where every write failed still yields its root folder.
        fs::create_dir_all(&staged)?;

        if self.target.exists() {
            tracing::info!("Replacing existing clone at {}", self.target.display());
            fs::remove_dir_all(&self.target)?;
        }

        fs::rename(&staged, &self.target).map_err(|e| PackageError::Persist {
            path: self.target.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            "Wrote {} files to {}",
            self.entries.len(),
            self.target.display()
        );

        let DirectoryPackager {
            root,
            target,
            entries,
            ..
        } = *self;

        Ok(ArchiveManifest {
            root,
            location: target,
            entries,
        })
    }
}
