//! Directory listing.
//!
//! Only the top level of a directory is read. Entries come back in
//! byte-wise file name order so runs are reproducible across platforms.
//! Symbolic links to files are listed like the files they point to.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{CatalogError, Result};

/// Extensions decoded as raster images by the image pipeline.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "gif"];

/// Extensions eligible for a catalog merge.
pub const CATALOG_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg"];

/// Extensions converted one file at a time into per-image PDFs.
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Kind of content a file holds, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// A PDF document.
    Pdf,
    /// A raster image.
    Image,
}

impl SourceFormat {
    /// Detect the format from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = extension_lowercase(path)?;
        if ext == "pdf" {
            Some(Self::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// A regular file found in the scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path.
    pub path: PathBuf,
    /// Bare file name.
    pub name: String,
    /// Last modification time, when the platform reports one.
    pub modified: Option<SystemTime>,
}

/// Lowercased extension of `path`, if any.
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether `path` has one of `extensions` (lowercase, without the dot).
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    extension_lowercase(path).is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Check that `dir` exists and is a directory.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(CatalogError::InputDirNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(CatalogError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Order file names case-insensitively, ties broken byte-wise.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

/// List the regular files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Entries that cannot be read,
/// including dangling links, are logged and left out.
pub fn list_files(dir: &Path) -> Result<Vec<ScannedFile>> {
    ensure_directory(dir)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
        files.push(ScannedFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.into_path(),
            modified,
        });
    }

    debug!(dir = %dir.display(), count = files.len(), "scanned directory");
    Ok(files)
}

/// List the files directly inside `dir` whose extension is in `extensions`.
pub fn list_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<ScannedFile>> {
    Ok(list_files(dir)?
        .into_iter()
        .filter(|f| has_extension(&f.path, extensions))
        .collect())
}

/// Like [`list_with_extensions`], in [`compare_names`] order.
pub fn list_sorted(dir: &Path, extensions: &[&str]) -> Result<Vec<ScannedFile>> {
    let mut files = list_with_extensions(dir, extensions)?;
    files.sort_by(|a, b| compare_names(&a.name, &b.name));
    Ok(files)
}

/// List the images directly inside `dir` in [`compare_names`] order.
pub fn list_images(dir: &Path) -> Result<Vec<ScannedFile>> {
    list_sorted(dir, IMAGE_EXTENSIONS)
}
