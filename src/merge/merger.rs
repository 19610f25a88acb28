//! Core merging implementation.
//!
//! The merger walks an ordered list of sources, turns each into a PDF
//! document (loading PDFs, rendering images and generated text pages) and
//! hands it to the selected backend. A source that cannot be used is
//! recorded and skipped; the merge only fails when nothing usable is left.

use chrono::Local;
use lopdf::Document;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::{LayoutConfig, LayoutMode, MergeEngine, Metadata};
use crate::error::{CatalogError, Result, SkippedFile};
use crate::io::PdfReader;
use crate::layout::PageLayout;
use crate::merge::backend::backend_for;
use crate::merge::metadata::MetadataManager;
use crate::render::{ImageEntry, PageWriter};

/// One input of a merge, in output order.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeSource {
    /// Every page of a PDF file.
    Pdf(PathBuf),
    /// A raster image, rendered onto its own page.
    Image(PathBuf),
    /// A page with a centered title, produced in memory.
    TextPage {
        /// Large centered line.
        title: String,
        /// Smaller line below the title.
        subtitle: String,
    },
}

impl MergeSource {
    /// Whether the source was produced in memory rather than read from disk.
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::TextPage { .. })
    }

    /// Display name for reports.
    pub fn label(&self) -> String {
        match self {
            Self::Pdf(path) | Self::Image(path) => path.display().to_string(),
            Self::TextPage { title, .. } => format!("generated page \"{title}\""),
        }
    }
}

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of sources successfully merged.
    pub files_merged: usize,

    /// Total number of pages in merged document.
    pub total_pages: usize,
}

/// Result of a merge operation.
pub struct MergeResult {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Sources that were merged, in order.
    pub merged: Vec<MergeSource>,

    /// Sources that could not be used.
    pub skipped: Vec<SkippedFile>,
}

/// PDF merger that combines multiple sources.
pub struct Merger {
    reader: PdfReader,
    engine: MergeEngine,
    image_layout: LayoutConfig,
    metadata_manager: MetadataManager,
}

impl Merger {
    /// Create a merger using `engine`. Image sources are drawn with
    /// `image_layout`, forced to one image per page.
    pub fn new(engine: MergeEngine, image_layout: LayoutConfig) -> Self {
        Self {
            reader: PdfReader::new(),
            engine,
            image_layout: LayoutConfig {
                mode: LayoutMode::Single,
                ..image_layout
            },
            metadata_manager: MetadataManager::new("catalog-merge"),
        }
    }

    /// Merge `sources` in order and stamp the result with `metadata`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No source produced a page (`NoValidInputs`)
    /// - A non-recoverable error occurs while merging
    pub fn merge(&self, sources: &[MergeSource], metadata: &Metadata) -> Result<MergeResult> {
        let mut backend = backend_for(self.engine);
        let mut merged = Vec::new();
        let mut skipped = Vec::new();

        debug!(backend = backend.name(), sources = sources.len(), "merging");

        for source in sources {
            let outcome = self
                .to_document(source)
                .and_then(|doc| backend.append(doc));

            match outcome {
                Ok(pages) => {
                    debug!(source = %source.label(), pages, "appended");
                    merged.push(source.clone());
                }
                Err(err) => {
                    let err = match (source, err) {
                        (MergeSource::Pdf(path), CatalogError::MergeFailed { reason }) => {
                            CatalogError::corrupted_pdf(path.clone(), reason)
                        }
                        (_, err) => err,
                    };
                    if err.is_fatal() {
                        return Err(err);
                    }
                    warn!(source = %source.label(), error = %err, "skipping input");
                    let path = match source {
                        MergeSource::Pdf(path) | MergeSource::Image(path) => path.clone(),
                        MergeSource::TextPage { title, .. } => PathBuf::from(title),
                    };
                    skipped.push(SkippedFile::new(path, &err));
                }
            }
        }

        if backend.page_count() == 0 {
            return Err(CatalogError::NoValidInputs {
                attempted: sources.len(),
            });
        }

        let mut document = backend.finish()?;
        self.metadata_manager
            .set_metadata(&mut document, metadata, &Local::now())?;

        let statistics = MergeStatistics {
            files_merged: merged.len(),
            total_pages: document.get_pages().len(),
        };

        Ok(MergeResult {
            document,
            statistics,
            merged,
            skipped,
        })
    }

    /// Produce the document for one source.
    fn to_document(&self, source: &MergeSource) -> Result<Document> {
        match source {
            MergeSource::Pdf(path) => self.reader.load(path),
            MergeSource::Image(path) => image_document(path, &self.image_layout),
            MergeSource::TextPage { title, subtitle } => {
                let (width, height) = self.image_layout.page_size.dimensions();
                let mut writer = PageWriter::new(width, height, self.image_layout.dpi);
                writer.text_page(title, subtitle)?;
                writer.finish()
            }
        }
    }
}

/// Render a single image onto a one-page document.
pub fn image_document(path: &std::path::Path, layout: &LayoutConfig) -> Result<Document> {
    let entry = ImageEntry::load(path)?;
    let page_layout = PageLayout::new(layout);
    let placement = page_layout.place(0, entry.width(), entry.height(), None)?;

    let mut writer = PageWriter::new(page_layout.page_width, page_layout.page_height, layout.dpi);
    writer.add_page(&[(&entry, placement)])?;
    writer.finish()
}
