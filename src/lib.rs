//! Assemble catalog PDFs from a directory of images and PDF files.
//!
//! Three operations are provided:
//!
//! - [`pipeline::build_image_pdf`] lays out every image in a directory on
//!   pages of one PDF, one per page or in a grid with optional captions.
//! - [`pipeline::build_catalog`] merges a directory of PDFs and images into
//!   one catalog: cover first, back cover last, everything else sorted in
//!   between.
//! - [`pipeline::split_images`] writes every JPEG in a directory as a
//!   letter-size PDF of its own.
//!
//! Each skips inputs that cannot be read, reports them, and writes its
//! output atomically.
//!
//! # Examples
//!
//! ```no_run
//! use catalogpdf::config::{LayoutConfig, LayoutMode, ImagesConfig};
//! use catalogpdf::pipeline::build_image_pdf;
//!
//! let mut config = ImagesConfig::new("photos", "contact-sheet.pdf");
//! config.layout = LayoutConfig::for_mode(LayoutMode::Catalog, 6);
//!
//! let report = build_image_pdf(&config)?;
//! println!("{} pages, {} skipped", report.pages, report.skipped.len());
//! # Ok::<(), catalogpdf::CatalogError>(())
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
mod error;
pub use error::*;
pub mod io;
pub mod layout;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod scan;

pub use pipeline::{
    build_catalog, build_image_pdf, plan_catalog, plan_image_pdf, plan_split, split_images,
};
