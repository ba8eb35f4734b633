//! Packager trait and associated types
//!
//! A packager receives scraped pages one at a time and turns them into a
//! single deliverable rooted at the job's folder name. Nothing is visible at
//! the final location until [`Packager::finish`] succeeds.

use crate::crawler::{CloneIssue, Page};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors that invalidate an output artifact
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Refusing unsafe entry path: {0}")]
    UnsafePath(String),

    #[error("Failed to move output into place at {path}: {reason}")]
    Persist { path: PathBuf, reason: String },
}

/// Result type for packaging operations
pub type PackageResult<T> = Result<T, PackageError>;

/// What a finished packager produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveManifest {
    /// Root folder name shared by every entry
    pub root: String,

    /// Final location of the directory tree or archive file
    pub location: PathBuf,

    /// Entry paths relative to `root`, in write order
    pub entries: Vec<String>,
}

/// Trait for output packagers
///
/// Packagers are single-writer: pages are added sequentially and entries are
/// written in the order the page yields them.
pub trait Packager: Send {
    /// Writes every entry of one page
    ///
    /// # Returns
    ///
    /// * `Ok(issues)` - The page was handled; `issues` lists entries that
    ///   could not be written without invalidating the artifact
    /// * `Err(PackageError)` - The artifact is unusable and must be discarded
    fn add_page(&mut self, page: &Page) -> PackageResult<Vec<CloneIssue>>;

    /// Finalizes the artifact and moves it to its final location
    fn finish(self: Box<Self>) -> PackageResult<ArchiveManifest>;
}

/// Checks that an entry path stays inside the clone root
pub(crate) fn ensure_relative(path: &str) -> PackageResult<()> {
    let safe = !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if safe {
        Ok(())
    } else {
        Err(PackageError::UnsafePath(path.to_string()))
    }
}
