//! Configuration for both pipelines.
//!
//! CLI arguments are turned into these structures before any file is read,
//! so every invalid option is reported up front. Defaults live in the
//! `Default` impls; nothing here reads global state.

use serde::Deserialize;
use std::{path::PathBuf, str::FromStr};

use crate::error::{CatalogError, Result};

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Physical page size of the generated pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    /// ISO A4, 210 × 297 mm.
    #[default]
    A4,
    /// US Letter, 8.5 × 11 in.
    Letter,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            Self::A4 => (595.2756, 841.8898),
            Self::Letter => (612.0, 792.0),
        }
    }
}

impl FromStr for PageSize {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            _ => Err(CatalogError::invalid_config(format!(
                "Invalid page size: {s}. Must be one of: A4, letter"
            ))),
        }
    }
}

/// How images are arranged on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// One image per page.
    #[default]
    Single,
    /// A grid of images without captions.
    Grid,
    /// A grid of images, each with its filename underneath.
    Catalog,
}

impl LayoutMode {
    /// Whether cells reserve a caption strip.
    pub fn has_captions(&self) -> bool {
        matches!(self, Self::Catalog)
    }

    /// Default inset between a cell edge and its image area, in points.
    pub fn default_padding(&self) -> f64 {
        match self {
            Self::Single => 0.0,
            Self::Grid | Self::Catalog => 10.0,
        }
    }
}

impl FromStr for LayoutMode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "grid" => Ok(Self::Grid),
            "catalog" => Ok(Self::Catalog),
            _ => Err(CatalogError::invalid_config(format!(
                "Invalid layout mode: {s}. Must be one of: single, grid, catalog"
            ))),
        }
    }
}

/// Sort key for inner catalog pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Case-insensitive filename order.
    #[default]
    Name,
    /// File modification time, oldest first.
    Date,
}

impl FromStr for SortMode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "date" => Ok(Self::Date),
            _ => Err(CatalogError::invalid_config(format!(
                "Invalid sort mode: {s}. Must be one of: name, date"
            ))),
        }
    }
}

/// Backend used to concatenate documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeEngine {
    /// Graft each source page tree under the output root.
    #[default]
    Concat,
    /// Deep-copy every page into a freshly built page tree.
    Rebuild,
}

impl MergeEngine {
    /// Name as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concat => "concat",
            Self::Rebuild => "rebuild",
        }
    }
}

impl FromStr for MergeEngine {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "concat" | "pikepdf" => Ok(Self::Concat),
            "rebuild" | "pypdf2" => Ok(Self::Rebuild),
            _ => Err(CatalogError::invalid_config(format!(
                "Invalid merge engine: {s}. Must be one of: concat, rebuild"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Replace an existing output (catalogs are rebuilt in place).
    #[default]
    Force,
    /// Never overwrite, error if the file exists.
    NoClobber,
}

/// Page geometry and placement policy for the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Physical page size.
    pub page_size: PageSize,
    /// Margin on every side, in inches.
    pub margin_inches: f64,
    /// Arrangement of images on a page.
    pub mode: LayoutMode,
    /// Requested images per page (ignored in single mode).
    pub images_per_page: usize,
    /// Keep the image's width:height ratio.
    pub preserve_aspect: bool,
    /// Maximum raster resolution of embedded images.
    pub dpi: u32,
    /// Height of the caption strip in catalog mode, in points.
    pub caption_height: f64,
    /// Caption font size, in points.
    pub caption_font_size: f64,
    /// Inset between a cell edge and its image area, in points.
    pub cell_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::for_mode(LayoutMode::Single, 1)
    }
}

impl LayoutConfig {
    /// Defaults for a layout mode with the given images per page.
    pub fn for_mode(mode: LayoutMode, images_per_page: usize) -> Self {
        Self {
            page_size: PageSize::A4,
            margin_inches: 0.5,
            mode,
            images_per_page,
            preserve_aspect: true,
            dpi: 300,
            caption_height: 18.0,
            caption_font_size: 8.0,
            cell_padding: mode.default_padding(),
        }
    }

    /// Images actually placed on one page.
    pub fn effective_images_per_page(&self) -> usize {
        match self.mode {
            LayoutMode::Single => 1,
            LayoutMode::Grid | LayoutMode::Catalog => self.images_per_page,
        }
    }

    /// Margin in points.
    pub fn margin_points(&self) -> f64 {
        self.margin_inches * POINTS_PER_INCH
    }

    /// Validate the layout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if:
    /// - images per page is zero
    /// - the margin is negative, not finite or leaves no printable area
    /// - the DPI is outside 1..=2400
    /// - the caption strip or padding leaves no room for images
    pub fn validate(&self) -> Result<()> {
        if self.images_per_page == 0 {
            return Err(CatalogError::invalid_config(
                "images-per-page must be at least 1",
            ));
        }

        if !self.margin_inches.is_finite() || self.margin_inches < 0.0 {
            return Err(CatalogError::invalid_config(format!(
                "Margin must be a non-negative number of inches, got {}",
                self.margin_inches
            )));
        }

        let (width, height) = self.page_size.dimensions();
        let margin = self.margin_points();
        if width - 2.0 * margin <= 0.0 || height - 2.0 * margin <= 0.0 {
            return Err(CatalogError::invalid_config(format!(
                "Margin of {} in leaves no printable area",
                self.margin_inches
            )));
        }

        if self.dpi == 0 || self.dpi > 2400 {
            return Err(CatalogError::invalid_config(format!(
                "DPI must be between 1 and 2400, got {}",
                self.dpi
            )));
        }

        if !self.cell_padding.is_finite() || self.cell_padding < 0.0 {
            return Err(CatalogError::invalid_config(
                "Cell padding must be a non-negative number",
            ));
        }

        if self.mode.has_captions()
            && (!self.caption_height.is_finite() || self.caption_height < 0.0)
        {
            return Err(CatalogError::invalid_config(
                "Caption height must be a non-negative number",
            ));
        }

        let (rows, columns) = crate::layout::grid_shape(self.effective_images_per_page());
        let cell_width = (width - 2.0 * margin) / columns as f64;
        let cell_height = (height - 2.0 * margin) / rows as f64;
        let caption = if self.mode.has_captions() {
            self.caption_height
        } else {
            0.0
        };

        if cell_width - 2.0 * self.cell_padding <= 0.0
            || cell_height - caption - 2.0 * self.cell_padding <= 0.0
        {
            return Err(CatalogError::invalid_config(format!(
                "{} images per page leave no room for images on a {:?} page",
                self.images_per_page, self.page_size
            )));
        }

        Ok(())
    }
}

/// Document information written to the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
}

impl Metadata {
    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(title: Option<String>, author: Option<String>) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
        }
    }
}

/// Filename patterns driving catalog classification.
///
/// Patterns are globs matched case-insensitively against the bare file
/// name. The structure can be loaded from a JSON file; missing keys keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogPatterns {
    /// Files placed first.
    pub cover: Vec<String>,
    /// Files placed last.
    pub back_cover: Vec<String>,
    /// Files never included (previous outputs).
    pub exclude: Vec<String>,
}

impl Default for CatalogPatterns {
    fn default() -> Self {
        Self {
            cover: vec!["cover.{pdf,jpg,jpeg}".to_string()],
            back_cover: vec![
                "back_cover.{pdf,jpg,jpeg}".to_string(),
                "back-cover.{pdf,jpg,jpeg}".to_string(),
            ],
            exclude: vec!["catalog.pdf".to_string(), "*_catalog.pdf".to_string()],
        }
    }
}

impl CatalogPatterns {
    /// Parse patterns from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| CatalogError::invalid_config(format!("Invalid patterns file: {e}")))
    }
}

/// Complete configuration of an image→PDF run.
#[derive(Debug, Clone)]
pub struct ImagesConfig {
    /// Directory scanned for images.
    pub input_dir: PathBuf,
    /// Output PDF path.
    pub output: PathBuf,
    /// Page layout.
    pub layout: LayoutConfig,
    /// Document information.
    pub metadata: Metadata,
    /// Report the plan without writing.
    pub dry_run: bool,
    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,
    /// Verbose output mode.
    pub verbose: bool,
    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl ImagesConfig {
    /// Configuration with defaults for the given directory and output.
    pub fn new(input_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: output.into(),
            layout: LayoutConfig::default(),
            metadata: Metadata::default(),
            dry_run: false,
            overwrite_mode: OverwriteMode::Force,
            verbose: false,
            quiet: false,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(CatalogError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }
        self.layout.validate()
    }

    /// Output path, relative paths resolved against the input directory.
    pub fn output_path(&self) -> PathBuf {
        resolve_output(&self.input_dir, &self.output)
    }
}

/// Complete configuration of a catalog merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Directory scanned for catalog files.
    pub input_dir: PathBuf,
    /// Output PDF path.
    pub output: PathBuf,
    /// Concatenation backend.
    pub engine: MergeEngine,
    /// Order of inner pages.
    pub sort: SortMode,
    /// Classification patterns.
    pub patterns: CatalogPatterns,
    /// Layout used when an image entry becomes a page.
    pub image_layout: LayoutConfig,
    /// Synthesize missing covers as text pages.
    pub generate_covers: bool,
    /// Document information.
    pub metadata: Metadata,
    /// Report the plan without writing.
    pub dry_run: bool,
    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,
    /// Verbose output mode.
    pub verbose: bool,
    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl MergeConfig {
    /// Configuration with defaults for the given directory and output.
    pub fn new(input_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: output.into(),
            engine: MergeEngine::default(),
            sort: SortMode::default(),
            patterns: CatalogPatterns::default(),
            image_layout: LayoutConfig {
                page_size: PageSize::Letter,
                ..LayoutConfig::default()
            },
            generate_covers: false,
            metadata: Metadata::default(),
            dry_run: false,
            overwrite_mode: OverwriteMode::Force,
            verbose: false,
            quiet: false,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(CatalogError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if self.image_layout.mode != LayoutMode::Single {
            return Err(CatalogError::invalid_config(
                "Catalog image entries always use the single layout",
            ));
        }

        if self.output.file_name().is_none() {
            return Err(CatalogError::invalid_config(format!(
                "Output path has no file name: {}",
                self.output.display()
            )));
        }

        self.image_layout.validate()
    }

    /// Output path, relative paths resolved against the input directory.
    pub fn output_path(&self) -> PathBuf {
        resolve_output(&self.input_dir, &self.output)
    }
}

/// Configuration of a run that turns each JPEG into its own PDF.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Directory scanned for JPEG files.
    pub input_dir: PathBuf,
    /// Directory receiving one PDF per image; the input directory when unset.
    pub output_dir: Option<PathBuf>,
    /// Page layout, always letter size with one image per page.
    pub layout: LayoutConfig,
    /// Report the plan without writing.
    pub dry_run: bool,
    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,
    /// Verbose output mode.
    pub verbose: bool,
    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl SplitConfig {
    /// Configuration with defaults for the given directory.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            layout: LayoutConfig {
                page_size: PageSize::Letter,
                ..LayoutConfig::default()
            },
            dry_run: false,
            overwrite_mode: OverwriteMode::Force,
            verbose: false,
            quiet: false,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(CatalogError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if self.layout.mode != LayoutMode::Single {
            return Err(CatalogError::invalid_config(
                "Each image is written on a page of its own",
            ));
        }

        self.layout.validate()
    }

    /// Directory the PDFs are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.clone())
    }
}

fn resolve_output(input_dir: &std::path::Path, output: &std::path::Path) -> PathBuf {
    if output.is_absolute() {
        output.to_path_buf()
    } else {
        input_dir.join(output)
    }
}
