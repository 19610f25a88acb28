//! CLI argument parsing for the binaries.
//!
//! `img2pdf` lays out a directory of images; `catalog-merge` assembles a
//! catalog from PDFs and images; `jpg2pdf` writes one PDF per JPEG. Each
//! parser converts into its validated configuration before any file is
//! read.
//!
//! # Examples
//!
//! ```no_run
//! use catalogpdf::cli::ImagesCli;
//! use clap::Parser;
//!
//! let cli = ImagesCli::parse();
//! let config = cli.to_config().expect("Invalid configuration");
//! println!("Scanning {}", config.input_dir.display());
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{
    CatalogPatterns, ImagesConfig, LayoutConfig, LayoutMode, MergeConfig, MergeEngine, Metadata,
    OverwriteMode, PageSize, SortMode, SplitConfig,
};
use crate::error::{CatalogError, Result};

fn overwrite_mode(no_clobber: bool) -> OverwriteMode {
    if no_clobber {
        OverwriteMode::NoClobber
    } else {
        OverwriteMode::Force
    }
}

/// Lay out every image in a directory onto the pages of one PDF.
#[derive(Parser, Debug)]
#[command(name = "img2pdf")]
#[command(version)]
#[command(about = "Lay out a directory of images as a PDF", long_about = None)]
#[command(author)]
pub struct ImagesCli {
    /// Directory containing the images
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Output PDF file path
    ///
    /// Relative paths are resolved against the input directory.
    #[arg(short, long, value_name = "FILE", default_value = "catalog.pdf")]
    pub output: PathBuf,

    /// Page layout
    ///
    /// - single: one image per page
    /// - grid: N images per page in a near-square grid
    /// - catalog: like grid, with the file name under each image
    #[arg(short, long, value_name = "MODE", default_value = "single")]
    pub layout: String,

    /// Images per page for grid and catalog layouts
    #[arg(short = 'n', long, value_name = "N", default_value_t = 1)]
    pub images_per_page: usize,

    /// Page size (A4 or letter)
    #[arg(short, long, value_name = "SIZE", default_value = "A4")]
    pub page_size: String,

    /// Page margin in inches
    #[arg(short, long, value_name = "INCHES", default_value_t = 0.5)]
    pub margin: f64,

    /// Stretch images to fill their cell instead of keeping proportions
    #[arg(long)]
    pub no_aspect: bool,

    /// Resolution used to downsample embedded images
    #[arg(long, value_name = "DPI", default_value_t = 300)]
    pub dpi: u32,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Show the pages that would be produced without writing anything
    #[arg(short = 'N', long)]
    pub dry_run: bool,

    /// Never overwrite an existing output file
    #[arg(long)]
    pub no_clobber: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl ImagesCli {
    /// Convert CLI arguments into a validated [`ImagesConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if an option value does not parse or the resulting
    /// layout is invalid.
    pub fn to_config(&self) -> Result<ImagesConfig> {
        self.validate()?;

        let mode = LayoutMode::from_str(&self.layout)?;
        let layout = LayoutConfig {
            page_size: PageSize::from_str(&self.page_size)?,
            margin_inches: self.margin,
            preserve_aspect: !self.no_aspect,
            dpi: self.dpi,
            ..LayoutConfig::for_mode(mode, self.images_per_page)
        };

        let config = ImagesConfig {
            layout,
            metadata: Metadata::new(self.title.clone(), self.author.clone()),
            dry_run: self.dry_run,
            overwrite_mode: overwrite_mode(self.no_clobber),
            verbose: self.verbose,
            quiet: self.quiet,
            ..ImagesConfig::new(&self.directory, &self.output)
        };

        config.validate()?;
        Ok(config)
    }

    /// Early checks that need no file I/O.
    pub fn validate(&self) -> Result<()> {
        if self.images_per_page == 0 {
            return Err(CatalogError::invalid_config(
                "Images per page must be at least 1",
            ));
        }
        if self.verbose && self.quiet {
            return Err(CatalogError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }
        Ok(())
    }
}

/// Assemble a catalog PDF from the PDFs and images in a directory.
#[derive(Parser, Debug)]
#[command(name = "catalog-merge")]
#[command(version)]
#[command(about = "Merge a directory of PDFs and images into one catalog", long_about = None)]
#[command(author)]
pub struct MergeCli {
    /// Directory containing the catalog files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Output PDF file path
    ///
    /// Relative paths are resolved against the input directory. A file with
    /// this name in the input directory is never merged into itself.
    #[arg(short, long, value_name = "FILE", default_value = "catalog.pdf")]
    pub output: PathBuf,

    /// Merge engine
    ///
    /// - concat (alias pikepdf): graft each input's page tree
    /// - rebuild (alias pypdf2): copy pages one by one into a new tree
    #[arg(short, long, value_name = "ENGINE", default_value = "concat")]
    pub engine: String,

    /// Order of inner pages (name or date)
    #[arg(short, long, value_name = "KEY", default_value = "name")]
    pub sort: String,

    /// Glob for the cover file (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub cover: Vec<String>,

    /// Glob for the back-cover file (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub back_cover: Vec<String>,

    /// Glob for files that are never merged (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// JSON file with cover, backCover and exclude pattern lists
    ///
    /// Pattern flags given on the command line replace the matching list.
    #[arg(long, value_name = "FILE")]
    pub patterns: Option<PathBuf>,

    /// Page size for image entries (A4 or letter)
    #[arg(short, long, value_name = "SIZE", default_value = "letter")]
    pub page_size: String,

    /// Page margin for image entries, in inches
    #[arg(short, long, value_name = "INCHES", default_value_t = 0.5)]
    pub margin: f64,

    /// Resolution used to downsample image entries
    #[arg(long, value_name = "DPI", default_value_t = 300)]
    pub dpi: u32,

    /// Add a generated title page when no cover or back cover is found
    #[arg(long)]
    pub generate_covers: bool,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Show the merge order without writing anything
    #[arg(short = 'N', long)]
    pub dry_run: bool,

    /// Never overwrite an existing output file
    #[arg(long)]
    pub no_clobber: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl MergeCli {
    /// Convert CLI arguments into a validated [`MergeConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An engine, sort or page size value is invalid
    /// - The patterns file cannot be read or parsed
    /// - The resulting configuration fails validation
    pub fn to_config(&self) -> Result<MergeConfig> {
        self.validate()?;

        let image_layout = LayoutConfig {
            page_size: PageSize::from_str(&self.page_size)?,
            margin_inches: self.margin,
            dpi: self.dpi,
            ..LayoutConfig::default()
        };

        let config = MergeConfig {
            engine: MergeEngine::from_str(&self.engine)?,
            sort: SortMode::from_str(&self.sort)?,
            patterns: self.load_patterns()?,
            image_layout,
            generate_covers: self.generate_covers,
            metadata: Metadata::new(self.title.clone(), self.author.clone()),
            dry_run: self.dry_run,
            overwrite_mode: overwrite_mode(self.no_clobber),
            verbose: self.verbose,
            quiet: self.quiet,
            ..MergeConfig::new(&self.directory, &self.output)
        };

        config.validate()?;
        Ok(config)
    }

    /// Early checks that need no file I/O.
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(CatalogError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        let all_patterns = self.cover.iter().chain(&self.back_cover).chain(&self.exclude);
        for pattern in all_patterns {
            if pattern.trim().is_empty() {
                return Err(CatalogError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: "pattern is empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Patterns from `--patterns`, with command-line lists taking precedence.
    pub fn load_patterns(&self) -> Result<CatalogPatterns> {
        let mut patterns = match &self.patterns {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    CatalogError::invalid_config(format!(
                        "Cannot read patterns file {}: {e}",
                        path.display()
                    ))
                })?;
                CatalogPatterns::from_json(&text)?
            }
            None => CatalogPatterns::default(),
        };

        if !self.cover.is_empty() {
            patterns.cover = self.cover.clone();
        }
        if !self.back_cover.is_empty() {
            patterns.back_cover = self.back_cover.clone();
        }
        if !self.exclude.is_empty() {
            patterns.exclude = self.exclude.clone();
        }
        Ok(patterns)
    }
}

/// Convert each JPEG in a directory into its own letter-size PDF.
#[derive(Parser, Debug)]
#[command(name = "jpg2pdf")]
#[command(version)]
#[command(about = "Convert JPEG images to letter-size PDF files, one per image", long_about = None)]
#[command(author)]
pub struct SplitCli {
    /// Directory containing the JPEG files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Directory for the PDF files (default: the input directory)
    ///
    /// Created if it does not exist.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Margin around each image in inches
    #[arg(short, long, value_name = "INCHES", default_value_t = 0.5)]
    pub margin: f64,

    /// Resolution used to downsample embedded images
    #[arg(long, value_name = "DPI", default_value_t = 300)]
    pub dpi: u32,

    /// List the conversions without writing anything
    #[arg(short = 'N', long)]
    pub dry_run: bool,

    /// Never overwrite an existing PDF
    #[arg(long)]
    pub no_clobber: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl SplitCli {
    /// Convert CLI arguments into a validated [`SplitConfig`].
    pub fn to_config(&self) -> Result<SplitConfig> {
        let defaults = SplitConfig::new(&self.directory);
        let config = SplitConfig {
            output_dir: self.output.clone(),
            layout: LayoutConfig {
                margin_inches: self.margin,
                dpi: self.dpi,
                ..defaults.layout.clone()
            },
            dry_run: self.dry_run,
            overwrite_mode: overwrite_mode(self.no_clobber),
            verbose: self.verbose,
            quiet: self.quiet,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}
