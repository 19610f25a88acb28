//! PDF writing operations.
//!
//! Output goes to a sibling temporary file first and is renamed onto the
//! destination once fully written. On any failure the temporary file is
//! removed, so a failed run never leaves a partial catalog behind.

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OverwriteMode;
use crate::error::{CatalogError, Result};

const BUFFER_SIZE: usize = 64 * 1024;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Size of the written file in bytes.
    pub file_size: u64,
}

/// PDF writer that compresses, renumbers and writes atomically.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter;

/// Path of the temporary file used while writing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl PdfWriter {
    /// Create a new PDF writer.
    pub fn new() -> Self {
        Self
    }

    /// Check that `path` may be written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory doesn't exist
    /// - The file exists and `mode` forbids overwriting
    pub fn can_write(&self, path: &Path, mode: OverwriteMode) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && !parent.is_dir()
        {
            return Err(CatalogError::OutputDirMissing {
                path: parent.to_path_buf(),
            });
        }

        if mode == OverwriteMode::NoClobber && path.exists() {
            return Err(CatalogError::output_exists(path.to_path_buf()));
        }

        Ok(())
    }

    /// Save a PDF document to a file.
    ///
    /// Unreachable objects are pruned, streams compressed and the rest
    /// renumbered in place before writing.
    pub fn save(&self, doc: &mut Document, path: &Path) -> Result<WriteStatistics> {
        doc.prune_objects();
        doc.compress();
        doc.renumber_objects();

        let write_path = temp_path(path);
        if let Err(err) = self.write_file(doc, &write_path) {
            let _ = std::fs::remove_file(&write_path);
            return Err(err);
        }

        if let Err(source) = std::fs::rename(&write_path, path) {
            let _ = std::fs::remove_file(&write_path);
            return Err(CatalogError::FailedToWrite {
                path: path.to_path_buf(),
                source,
            });
        }

        let stats = WriteStatistics {
            file_size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        };

        info!(
            path = %path.display(),
            bytes = stats.file_size,
            "wrote pdf"
        );
        Ok(stats)
    }

    fn write_file(&self, doc: &mut Document, write_path: &Path) -> Result<()> {
        debug!(path = %write_path.display(), "writing pdf");

        let file =
            std::fs::File::create(write_path).map_err(|e| CatalogError::FailedToCreateOutput {
                path: write_path.to_path_buf(),
                source: e,
            })?;

        let mut writer = std::io::BufWriter::with_capacity(BUFFER_SIZE, file);

        doc.save_to(&mut writer)
            .map_err(|e| CatalogError::FailedToWrite {
                path: write_path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;

        writer.flush().map_err(|e| CatalogError::FailedToWrite {
            path: write_path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
