//! PDF file input and output.

pub mod reader;
pub mod writer;

pub use reader::PdfReader;
pub use writer::{PdfWriter, WriteStatistics, format_file_size};
