//! Zip archive packager
//!
//! Entries are streamed into a temporary file next to the final archive as
//! each page arrives, so only one page's content is held at a time. The
//! archive is persisted as `{output}/{folder}.zip` only after its central
//! directory has been written; dropping the packager before `finish` deletes
//! the temporary file.

use super::directory::STAGING_PREFIX;
use super::traits::{ensure_relative, ArchiveManifest, PackageError, PackageResult, Packager};
use crate::config::OutputFormat;
use crate::crawler::{CloneIssue, Page};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used for every entry
const COMPRESSION_LEVEL: i64 = 9;

/// Writes a clone as a single zip archive rooted at the folder name
pub struct ZipPackager {
    writer: ZipWriter<NamedTempFile>,
    options: SimpleFileOptions,
    root: String,
    target: PathBuf,
    entries: Vec<String>,
}

impl ZipPackager {
    /// Creates a packager writing `{output_dir}/{folder}.zip`
    ///
    /// `output_dir` is created if missing.
    pub fn new(output_dir: &Path, folder: &str) -> PackageResult<Self> {
        ensure_relative(folder)?;
        fs::create_dir_all(output_dir)?;

        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".zip.part")
            .tempfile_in(output_dir)?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL));

        Ok(Self {
            writer: ZipWriter::new(file),
            options,
            root: folder.to_string(),
            target: OutputFormat::Zip.target_path(output_dir, folder),
            entries: Vec::new(),
        })
    }
}

impl Packager for ZipPackager {
    fn add_page(&mut self, page: &Page) -> PackageResult<Vec<CloneIssue>> {
        for (relative, content) in page.entries() {
            ensure_relative(&relative)?;

            let name = format!("{}/{}", self.root, relative);
            self.writer.start_file(name, self.options)?;
            self.writer.write_all(content)?;
            self.entries.push(relative);
        }

        tracing::debug!("Archived page '{}'", page.slug);
        Ok(Vec::new())
    }

    fn finish(self: Box<Self>) -> PackageResult<ArchiveManifest> {
        let ZipPackager {
            writer,
            root,
            target,
            entries,
            ..
        } = *self;

        let file = writer.finish()?;
        file.as_file().sync_all()?;
        file.persist(&target).map_err(|e| PackageError::Persist {
            path: target.clone(),
            reason: e.error.to_string(),
        })?;

        tracing::info!("Wrote {} entries to {}", entries.len(), target.display());

        Ok(ArchiveManifest {
            root,
            location: target,
            entries,
        })
    }
}
