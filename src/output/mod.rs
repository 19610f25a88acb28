//! User-facing output for the binaries.
//!
//! The display functions turn pipeline reports into formatter calls. Text
//! that is worth testing is built by small pure helpers.
//!
//! # Examples
//!
//! ```no_run
//! use catalogpdf::config::ImagesConfig;
//! use catalogpdf::output::OutputFormatter;
//!
//! let config = ImagesConfig::new("photos", "catalog.pdf");
//! let formatter = OutputFormatter::from_images_config(&config);
//! formatter.info("Starting image layout");
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::catalog::{CatalogPlan, EntryKind, SetAside};
use crate::error::SkippedFile;
use crate::io::format_file_size;
use crate::pipeline::{
    ImagesPlan, ImagesReport, MergeReport, SplitPlan, SplitReport, SplitTarget, generated_kinds,
};
use tracing_subscriber::EnvFilter;

/// Install the stderr `tracing` subscriber for a binary.
///
/// `RUST_LOG` takes precedence; otherwise warnings are shown, debug events
/// with `verbose` and only errors with `quiet`.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = log_filter(verbose, quiet);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn log_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Summarize how images spread across pages, e.g. `3 pages (4, 4, 2)`.
pub fn page_breakdown(pages: &[usize]) -> String {
    let counts = pages
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let noun = if pages.len() == 1 { "page" } else { "pages" };
    format!("{} {noun} ({counts})", pages.len())
}

/// One line describing a skipped input.
pub fn skipped_line(skipped: &SkippedFile) -> String {
    let first_line = skipped.reason.lines().next().unwrap_or_default();
    format!("Skipped {}: {first_line}", skipped.path.display())
}

fn set_aside_line(verb: &str, item: &SetAside) -> String {
    format!("{verb} {} ({})", item.path.display(), item.reason)
}

fn target_line(target: &SplitTarget) -> String {
    let name = |path: &std::path::Path| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    };
    format!("{} -> {}", name(&target.image), name(&target.output))
}

fn display_skipped(formatter: &OutputFormatter, skipped: &[SkippedFile]) {
    for item in skipped {
        formatter.warning(&skipped_line(item));
    }
}

/// Display the outcome of an image→PDF run.
pub fn display_images_report(formatter: &OutputFormatter, report: &ImagesReport) {
    display_skipped(formatter, &report.skipped);
    formatter.success(&format!(
        "Wrote {} ({} image(s) on {} page(s), {})",
        report.output.display(),
        report.images,
        report.pages,
        format_file_size(report.file_size)
    ));
}

/// Display what an image→PDF run would do.
pub fn display_images_plan(formatter: &OutputFormatter, plan: &ImagesPlan) {
    formatter.info("DRY RUN MODE - no files will be created");
    formatter.section(&format!("Images ({})", plan.images.len()));
    for (index, path) in plan.images.iter().enumerate() {
        formatter.list_item(index + 1, &path.display().to_string());
    }

    formatter.blank_line();
    formatter.detail("Layout", &format!("{:?}", plan.layout.mode).to_lowercase());
    formatter.detail("Page size", &format!("{:?}", plan.layout.page_size));
    formatter.detail("DPI", &plan.layout.dpi.to_string());
    formatter.info(&format!("Would produce {}", page_breakdown(&plan.pages)));
    formatter.info(&format!("Output would be: {}", plan.output.display()));
}

/// Display the ordered catalog a merge run would produce.
pub fn display_catalog_plan(
    formatter: &OutputFormatter,
    plan: &CatalogPlan,
    output: &std::path::Path,
    generate_covers: bool,
) {
    formatter.info("DRY RUN MODE - no files will be created");
    formatter.section("Merge order");

    let generated = generated_kinds(plan, generate_covers);
    let mut index = 1;
    if generated.contains(&EntryKind::Cover) {
        formatter.list_item(index, "[cover] generated title page");
        index += 1;
    }
    for entry in &plan.entries {
        formatter.list_item(index, &format!("[{}] {}", entry.kind, entry.name));
        index += 1;
    }
    if generated.contains(&EntryKind::BackCover) {
        formatter.list_item(index, "[back_cover] generated title page");
    }

    for item in &plan.excluded {
        formatter.info(&set_aside_line("Excluded", item));
    }
    for item in &plan.ignored {
        formatter.warning(&set_aside_line("Ignored", item));
    }

    formatter.blank_line();
    formatter.info(&format!("Output would be: {}", output.display()));
}

/// Display the outcome of a catalog merge run.
pub fn display_merge_report(formatter: &OutputFormatter, report: &MergeReport) {
    for item in &report.excluded {
        formatter.debug(&set_aside_line("Excluded", item));
    }
    for item in &report.ignored {
        formatter.warning(&set_aside_line("Ignored", item));
    }
    display_skipped(formatter, &report.skipped);

    if formatter.is_verbose() {
        formatter.section("Merged");
        for (index, source) in report.merged.iter().enumerate() {
            formatter.list_item(index + 1, &source.label());
        }
    }

    formatter.success(&format!(
        "Wrote {} ({} source(s), {} page(s), {} engine, {})",
        report.output.display(),
        report.merged.len(),
        report.pages,
        report.engine.name(),
        format_file_size(report.file_size)
    ));
}

/// Display what a per-image conversion would do.
pub fn display_split_plan(formatter: &OutputFormatter, plan: &SplitPlan) {
    formatter.info("DRY RUN MODE - no files will be created");
    formatter.section(&format!("Conversions ({})", plan.targets.len()));
    for (index, target) in plan.targets.iter().enumerate() {
        formatter.list_item(index + 1, &target_line(target));
    }
    display_skipped(formatter, &plan.skipped);

    formatter.blank_line();
    formatter.info(&format!("PDF files would be saved to: {}", plan.output_dir.display()));
}

/// Display the outcome of a per-image conversion.
pub fn display_split_report(formatter: &OutputFormatter, report: &SplitReport) {
    for target in &report.written {
        formatter.debug(&format!("Converted {}", target_line(target)));
    }
    display_skipped(formatter, &report.skipped);

    let attempted = report.written.len() + report.skipped.len();
    formatter.success(&format!(
        "Converted {}/{attempted} file(s) into {} ({})",
        report.written.len(),
        report.output_dir.display(),
        format_file_size(report.total_size)
    ));
}
