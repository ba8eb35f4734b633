//! Output module for packaging cloned sites
//!
//! This module handles:
//! - Writing clones as directory trees or zip archives
//! - Keeping partial output out of sight until packaging finishes
//! - Reporting job results

mod archive;
mod directory;
mod report;
mod traits;

pub use crate::config::OutputFormat;
pub use archive::ZipPackager;
pub use directory::DirectoryPackager;
pub use report::{print_report, PackageReport};
pub use traits::{ArchiveManifest, PackageError, PackageResult, Packager};

use std::path::{Path, PathBuf};

impl OutputFormat {
    /// Creates the packager for this format
    ///
    /// # Arguments
    ///
    /// * `output_dir` - Directory the clone is written into
    /// * `folder` - Root folder name of the clone
    pub fn packager(&self, output_dir: &Path, folder: &str) -> PackageResult<Box<dyn Packager>> {
        let packager: Box<dyn Packager> = match self {
            Self::Directory => Box::new(DirectoryPackager::new(output_dir, folder)?),
            Self::Zip => Box::new(ZipPackager::new(output_dir, folder)?),
        };
        Ok(packager)
    }

    /// Location the finished clone will occupy
    pub fn target_path(&self, output_dir: &Path, folder: &str) -> PathBuf {
        match self {
            Self::Directory => output_dir.join(folder),
            Self::Zip => output_dir.join(format!("{}.zip", folder)),
        }
    }
}
