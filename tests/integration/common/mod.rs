//! Fixture builders shared by the integration tests.
//!
//! Every fixture is generated inside a temporary directory, so the tests
//! need no files checked into the repository.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fresh temporary input directory.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

/// Write a solid-color image; the format follows the extension of `name`.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([200, 120, 40]))
        .save(&path)
        .expect("write image fixture");
    path
}

/// Write a file that claims to be an image but does not decode.
pub fn write_corrupt_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F']).expect("write corrupt image");
    path
}

/// Write a PDF with one page per entry of `widths`; each page has a media
/// box of that width so its origin can be recognized after merging.
pub fn write_pdf(dir: &Path, name: &str, widths: &[i64]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for width in widths {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![40.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(name)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (*width).into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => widths.len() as i64,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).expect("write pdf fixture");
    path
}

/// Load a written PDF.
pub fn load(path: &Path) -> Document {
    Document::load(path).expect("load output pdf")
}

/// Media box widths of every page, in page order.
pub fn page_widths(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).expect("page dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(Object::as_array)
                .expect("page media box");
            media_box[2].as_float().expect("numeric width").round() as i64
        })
        .collect()
}

/// Number of image XObjects drawn on each page, in page order.
pub fn images_per_page(doc: &Document) -> Vec<usize> {
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).expect("page dictionary");
            let resources = match page.get(b"Resources") {
                Ok(Object::Reference(rid)) => doc.get_dictionary(*rid).expect("resources"),
                Ok(Object::Dictionary(dict)) => dict,
                _ => return 0,
            };
            match resources.get(b"XObject") {
                Ok(Object::Dictionary(xobjects)) => xobjects.len(),
                Ok(Object::Reference(xid)) => doc.get_dictionary(*xid).map_or(0, |d| d.len()),
                _ => 0,
            }
        })
        .collect()
}

/// Title string from the Info dictionary, if any.
pub fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = doc.get_dictionary(info_id).ok()?;
    match info.get(key).ok()? {
        Object::String(bytes, _) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}
