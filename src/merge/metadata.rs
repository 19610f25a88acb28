//! PDF metadata management.
//!
//! Writes the document Info dictionary: Title and Author from configuration
//! plus Creator, Producer and creation date.

use chrono::{DateTime, TimeZone};
use lopdf::{Dictionary, Document, Object, StringFormat};
use std::fmt::Display;

use crate::config::Metadata;
use crate::error::Result;

const PRODUCER: &str = concat!("catalogpdf ", env!("CARGO_PKG_VERSION"));

fn text(value: &str) -> Object {
    Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
}

/// Manager for PDF metadata.
pub struct MetadataManager {
    creator: String,
}

impl MetadataManager {
    /// Create a manager that records `creator` as the producing tool.
    pub fn new(creator: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
        }
    }

    /// Replace the document's Info dictionary.
    ///
    /// Any Info dictionary carried over from a merged input is dropped so
    /// source titles never leak into the catalog.
    pub fn set_metadata<Tz>(
        &self,
        doc: &mut Document,
        metadata: &Metadata,
        now: &DateTime<Tz>,
    ) -> Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut info = Dictionary::new();

        if let Some(ref title) = metadata.title {
            info.set("Title", text(title));
        }
        if let Some(ref author) = metadata.author {
            info.set("Author", text(author));
        }

        info.set("Creator", text(&self.creator));
        info.set("Producer", text(PRODUCER));

        let date = format_pdf_date(now);
        info.set("CreationDate", text(&date));
        info.set("ModDate", text(&date));

        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        Ok(())
    }
}

/// Format a time as a PDF date string: `D:YYYYMMDDHHmmSS+HH'mm'`.
pub fn format_pdf_date<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let offset = time.format("%:z").to_string();
    let (hours, minutes) = offset.split_once(':').unwrap_or((offset.as_str(), "00"));
    format!("D:{}{hours}'{minutes}'", time.format("%Y%m%d%H%M%S"))
}

/// Format a time as a calendar date: `YYYY-MM-DD`.
pub fn format_iso_date<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%Y-%m-%d").to_string()
}
