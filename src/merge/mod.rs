//! PDF merging.
//!
//! [`Merger`] turns an ordered list of [`MergeSource`]s into one document
//! through a [`MergeBackend`]:
//!
//! - [`ConcatBackend`] grafts each input's page tree under the output root.
//! - [`RebuildBackend`] deep-copies every page into a flat page tree and
//!   tolerates damaged inputs.

pub mod backend;
pub mod concat;
pub mod merger;
pub mod metadata;
pub mod rebuild;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{MergeBackend, backend_for};
pub use concat::ConcatBackend;
pub use merger::{MergeResult, MergeSource, MergeStatistics, Merger, image_document};
pub use metadata::{MetadataManager, format_iso_date, format_pdf_date};
pub use rebuild::RebuildBackend;
