//! PDF loading.
//!
//! Loading is synchronous and one document at a time; each document is
//! handed to the merge backend and dropped before the next one is read.

use lopdf::Document;
use std::path::Path;
use tracing::debug;

use crate::error::{CatalogError, Result};

/// PDF reader that verifies document structure on load.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no catalog or no pages
    pub fn load(&self, path: &Path) -> Result<Document> {
        let path_buf = path.to_path_buf();

        if !path.is_file() {
            return Err(CatalogError::file_not_found(path_buf));
        }

        let doc = Document::load(path).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.to_lowercase().contains("encrypt") || err_msg.contains("password") {
                CatalogError::encrypted_pdf(path_buf.clone())
            } else {
                CatalogError::failed_to_load_pdf(path_buf.clone(), err_msg)
            }
        })?;

        if doc.is_encrypted() {
            return Err(CatalogError::encrypted_pdf(path_buf));
        }

        if let Err(e) = doc.catalog() {
            return Err(CatalogError::corrupted_pdf(
                path_buf,
                format!("missing document catalog: {e}"),
            ));
        }

        let pages = doc.get_pages().len();
        if pages == 0 {
            return Err(CatalogError::corrupted_pdf(path_buf, "PDF has no pages"));
        }

        debug!(path = %path.display(), pages, "loaded pdf");
        Ok(doc)
    }
}
