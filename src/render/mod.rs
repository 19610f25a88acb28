//! Turning decoded images and text into PDF pages.

pub mod image;
pub mod page;
pub mod text;

pub use self::image::{EncodedImage, ImageEntry};
pub use page::PageWriter;
