//! End-to-end operations behind the binaries.
//!
//! Each operation validates its configuration before touching the file
//! system, processes inputs one at a time and writes the output atomically.
//! Inputs that cannot be used are reported in the returned report; the
//! operation only fails when nothing usable remains or the output cannot be
//! written.

use chrono::Local;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::{self, CatalogPlan, EntryKind, SetAside};
use crate::config::{
    ImagesConfig, LayoutConfig, MergeConfig, MergeEngine, Metadata, OverwriteMode, SplitConfig,
};
use crate::error::{CatalogError, Result, SkippedFile};
use crate::io::PdfWriter;
use crate::layout::{self, PageLayout};
use crate::merge::{MergeSource, Merger, MetadataManager, format_iso_date, image_document};
use crate::render::{ImageEntry, PageWriter};
use crate::scan::{self, JPEG_EXTENSIONS, SourceFormat};

/// Title of a generated cover page.
pub const GENERATED_COVER_TITLE: &str = "CATALOG COVER";

/// Title of a generated back-cover page.
pub const GENERATED_BACK_COVER_TITLE: &str = "BACK COVER";

/// Outcome of an image→PDF run.
#[derive(Debug, Clone)]
pub struct ImagesReport {
    /// Written file.
    pub output: PathBuf,
    /// Images that made it into the document.
    pub images: usize,
    /// Pages written.
    pub pages: usize,
    /// Images that could not be decoded.
    pub skipped: Vec<SkippedFile>,
    /// Size of the written file in bytes.
    pub file_size: u64,
}

/// What an image→PDF run would do, computed without decoding anything.
#[derive(Debug, Clone)]
pub struct ImagesPlan {
    /// File that would be written.
    pub output: PathBuf,
    /// Candidate images in processing order.
    pub images: Vec<PathBuf>,
    /// Images on each page, assuming every image decodes.
    pub pages: Vec<usize>,
    /// Layout in effect.
    pub layout: LayoutConfig,
}

/// Outcome of a catalog merge run.
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// Written file.
    pub output: PathBuf,
    /// Backend used.
    pub engine: MergeEngine,
    /// Pages in the output.
    pub pages: usize,
    /// Sources merged, in output order.
    pub merged: Vec<MergeSource>,
    /// Inputs that could not be used.
    pub skipped: Vec<SkippedFile>,
    /// Files excluded as previous outputs.
    pub excluded: Vec<SetAside>,
    /// Duplicate cover or back-cover matches.
    pub ignored: Vec<SetAside>,
    /// Size of the written file in bytes.
    pub file_size: u64,
}

/// One image and the PDF it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTarget {
    /// Source image.
    pub image: PathBuf,
    /// PDF written for it.
    pub output: PathBuf,
}

/// What a per-image conversion would do.
#[derive(Debug, Clone)]
pub struct SplitPlan {
    /// Directory receiving the PDFs.
    pub output_dir: PathBuf,
    /// Conversions in processing order.
    pub targets: Vec<SplitTarget>,
    /// Images whose PDF name is already taken by an earlier image.
    pub skipped: Vec<SkippedFile>,
}

/// Outcome of a per-image conversion.
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// Directory receiving the PDFs.
    pub output_dir: PathBuf,
    /// Conversions that were written.
    pub written: Vec<SplitTarget>,
    /// Images that could not be converted.
    pub skipped: Vec<SkippedFile>,
    /// Combined size of the written files in bytes.
    pub total_size: u64,
}

/// Lay out every image in the configured directory and write one PDF.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - The input directory is missing or holds no images
/// - No image could be decoded
/// - The output cannot be written
pub fn build_image_pdf(config: &ImagesConfig) -> Result<ImagesReport> {
    config.validate()?;

    let files = scan::list_images(&config.input_dir)?;
    if files.is_empty() {
        return Err(CatalogError::NoInputFiles {
            dir: config.input_dir.clone(),
        });
    }

    let output = config.output_path();
    let pdf_writer = PdfWriter::new();
    pdf_writer.can_write(&output, config.overwrite_mode)?;

    let layout = PageLayout::new(&config.layout);
    let mut pages = PageWriter::new(layout.page_width, layout.page_height, config.layout.dpi)
        .with_caption_font_size(config.layout.caption_font_size);
    let mut batch: Vec<ImageEntry> = Vec::with_capacity(layout.capacity());
    let mut skipped = Vec::new();
    let mut images = 0;

    for file in &files {
        match ImageEntry::load(&file.path) {
            Ok(entry) => {
                debug!(path = %file.path.display(), width = entry.width(), height = entry.height(), "decoded image");
                batch.push(entry);
                images += 1;
            }
            Err(err) if err.is_recoverable() => {
                warn!(path = %file.path.display(), error = %err, "skipping image");
                skipped.push(SkippedFile::new(file.path.clone(), &err));
                continue;
            }
            Err(err) => return Err(err),
        }

        if batch.len() == layout.capacity() {
            render_batch(&mut pages, &layout, &config.layout, &batch)?;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        render_batch(&mut pages, &layout, &config.layout, &batch)?;
    }

    if pages.page_count() == 0 {
        return Err(CatalogError::NoValidInputs {
            attempted: files.len(),
        });
    }

    let page_count = pages.page_count();
    let mut document = pages.finish()?;
    MetadataManager::new("img2pdf").set_metadata(&mut document, &config.metadata, &Local::now())?;

    let stats = pdf_writer.save(&mut document, &output)?;
    info!(path = %output.display(), pages = page_count, images, "image catalog written");

    Ok(ImagesReport {
        output,
        images,
        pages: page_count,
        skipped,
        file_size: stats.file_size,
    })
}

fn render_batch(
    pages: &mut PageWriter,
    layout: &PageLayout,
    config: &LayoutConfig,
    batch: &[ImageEntry],
) -> Result<()> {
    let mut items = Vec::with_capacity(batch.len());
    for (slot, entry) in batch.iter().enumerate() {
        let caption = config.mode.has_captions().then(|| entry.caption());
        let placement = layout.place(slot, entry.width(), entry.height(), caption.as_deref())?;
        items.push((entry, placement));
    }
    pages.add_page(&items)?;
    Ok(())
}

/// Work out the image→PDF run without decoding or writing anything.
pub fn plan_image_pdf(config: &ImagesConfig) -> Result<ImagesPlan> {
    config.validate()?;

    let files = scan::list_images(&config.input_dir)?;
    if files.is_empty() {
        return Err(CatalogError::NoInputFiles {
            dir: config.input_dir.clone(),
        });
    }

    let output = config.output_path();
    PdfWriter::new().can_write(&output, config.overwrite_mode)?;

    let per_page = config.layout.effective_images_per_page();
    Ok(ImagesPlan {
        output,
        pages: layout::paginate(files.len(), per_page),
        images: files.into_iter().map(|f| f.path).collect(),
        layout: config.layout.clone(),
    })
}

/// Classify and order the catalog directory without writing anything.
pub fn plan_catalog(config: &MergeConfig) -> Result<CatalogPlan> {
    config.validate()?;

    let output = config.output_path();
    let output_name = output.file_name().map(|n| n.to_string_lossy().into_owned());
    let plan = catalog::plan_directory(
        &config.input_dir,
        &config.patterns,
        output_name.as_deref(),
        config.sort,
    )?;

    if plan.is_empty() {
        return Err(CatalogError::NoInputFiles {
            dir: config.input_dir.clone(),
        });
    }

    PdfWriter::new().can_write(&output, config.overwrite_mode)?;
    Ok(plan)
}

/// Turn a plan into merge sources, adding generated covers if requested.
pub fn merge_sources(plan: &CatalogPlan, generate_covers: bool, today: &str) -> Vec<MergeSource> {
    let generated = |title: &str| MergeSource::TextPage {
        title: title.to_string(),
        subtitle: format!("Generated on {today}"),
    };

    let mut sources = Vec::with_capacity(plan.len() + 2);
    if generate_covers && plan.cover().is_none() {
        sources.push(generated(GENERATED_COVER_TITLE));
    }

    sources.extend(plan.entries.iter().map(|entry| match entry.format {
        SourceFormat::Pdf => MergeSource::Pdf(entry.path.clone()),
        SourceFormat::Image => MergeSource::Image(entry.path.clone()),
    }));

    if generate_covers && plan.back_cover().is_none() {
        sources.push(generated(GENERATED_BACK_COVER_TITLE));
    }
    sources
}

/// Merge the catalog directory into one PDF.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration or a pattern is invalid
/// - The input directory is missing or holds no eligible files
/// - None of the files could be used
/// - The output cannot be written
pub fn build_catalog(config: &MergeConfig) -> Result<MergeReport> {
    let plan = plan_catalog(config)?;
    let output = config.output_path();

    for entry in &plan.entries {
        debug!(path = %entry.path.display(), kind = %entry.kind, "catalog entry");
    }
    for ignored in &plan.ignored {
        warn!(path = %ignored.path.display(), reason = %ignored.reason, "ignored match");
    }

    let today = format_iso_date(&Local::now());
    let sources = merge_sources(&plan, config.generate_covers, &today);

    let merger = Merger::new(config.engine, config.image_layout.clone());
    let mut result = merger.merge(&sources, &config.metadata)?;

    if result.merged.iter().all(MergeSource::is_generated) {
        return Err(CatalogError::NoValidInputs {
            attempted: plan.len(),
        });
    }

    let stats = PdfWriter::new().save(&mut result.document, &output)?;
    info!(
        path = %output.display(),
        pages = result.statistics.total_pages,
        engine = config.engine.name(),
        "catalog written"
    );

    Ok(MergeReport {
        output,
        engine: config.engine,
        pages: result.statistics.total_pages,
        merged: result.merged,
        skipped: result.skipped,
        excluded: plan.excluded,
        ignored: plan.ignored,
        file_size: stats.file_size,
    })
}

/// Entry kinds a run would synthesize for `plan`.
pub fn generated_kinds(plan: &CatalogPlan, generate_covers: bool) -> Vec<EntryKind> {
    let mut kinds = Vec::new();
    if generate_covers && plan.cover().is_none() {
        kinds.push(EntryKind::Cover);
    }
    if generate_covers && plan.back_cover().is_none() {
        kinds.push(EntryKind::BackCover);
    }
    kinds
}

fn pdf_name(image: &Path) -> String {
    let stem = image.file_stem().unwrap_or_default().to_string_lossy();
    format!("{stem}.pdf")
}

/// Pair every JPEG in the input directory with the PDF it would become.
///
/// Two images that map to the same PDF name, compared case-insensitively,
/// keep the first in name order; the other is reported as skipped.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - The input directory is missing or holds no JPEG files
/// - An output exists and overwriting is disabled
pub fn plan_split(config: &SplitConfig) -> Result<SplitPlan> {
    config.validate()?;

    let files = scan::list_sorted(&config.input_dir, JPEG_EXTENSIONS)?;
    if files.is_empty() {
        return Err(CatalogError::NoInputFiles {
            dir: config.input_dir.clone(),
        });
    }

    let output_dir = config.output_dir();
    let mut claimed: HashMap<String, PathBuf> = HashMap::new();
    let mut targets = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for file in files {
        let name = pdf_name(&file.path);
        if let Some(first) = claimed.get(&name.to_lowercase()) {
            skipped.push(SkippedFile {
                reason: format!("{name} is already produced from {}", first.display()),
                path: file.path,
            });
            continue;
        }
        claimed.insert(name.to_lowercase(), file.path.clone());
        targets.push(SplitTarget {
            output: output_dir.join(&name),
            image: file.path,
        });
    }

    if config.overwrite_mode == OverwriteMode::NoClobber {
        let writer = PdfWriter::new();
        for target in &targets {
            if target.output.exists() {
                writer.can_write(&target.output, config.overwrite_mode)?;
            }
        }
    }

    Ok(SplitPlan {
        output_dir,
        targets,
        skipped,
    })
}

/// Write each JPEG in the input directory as a PDF of its own.
///
/// Each image is centered on a letter page inside the margin, scaled as
/// large as fits. Images that do not decode are skipped.
///
/// # Errors
///
/// Returns an error if:
/// - Planning fails (see [`plan_split`])
/// - The output directory cannot be created
/// - No image could be converted
/// - An output cannot be written
pub fn split_images(config: &SplitConfig) -> Result<SplitReport> {
    let plan = plan_split(config)?;

    std::fs::create_dir_all(&plan.output_dir).map_err(|source| {
        CatalogError::FailedToCreateOutput {
            path: plan.output_dir.clone(),
            source,
        }
    })?;

    let writer = PdfWriter::new();
    let metadata_manager = MetadataManager::new("jpg2pdf");
    let now = Local::now();
    let attempted = plan.targets.len();
    let mut written = Vec::with_capacity(plan.targets.len());
    let mut skipped = plan.skipped;
    let mut total_size = 0;

    for target in plan.targets {
        let outcome = image_document(&target.image, &config.layout).and_then(|mut document| {
            metadata_manager.set_metadata(&mut document, &Metadata::default(), &now)?;
            writer.save(&mut document, &target.output)
        });

        match outcome {
            Ok(stats) => {
                debug!(image = %target.image.display(), output = %target.output.display(), "converted");
                total_size += stats.file_size;
                written.push(target);
            }
            Err(err) if err.is_recoverable() => {
                warn!(path = %target.image.display(), error = %err, "skipping image");
                skipped.push(SkippedFile::new(target.image, &err));
            }
            Err(err) => return Err(err),
        }
    }

    if written.is_empty() {
        return Err(CatalogError::NoValidInputs { attempted });
    }

    info!(dir = %plan.output_dir.display(), files = written.len(), "per-image pdfs written");
    Ok(SplitReport {
        output_dir: plan.output_dir,
        written,
        skipped,
        total_size,
    })
}
