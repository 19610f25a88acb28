//! Building PDF pages from placed images.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::layout::{Placement, Rect};
use crate::render::image::ImageEntry;
use crate::render::text;

const FONT_NAME: &str = "F1";
const TITLE_FONT_SIZE: f64 = 24.0;
const SUBTITLE_FONT_SIZE: f64 = 12.0;

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Appends rendered pages to an in-memory document.
///
/// Pages share one Helvetica font object, created on first use. Call
/// [`PageWriter::finish`] to obtain the document with its catalog and page
/// tree in place.
pub struct PageWriter {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    font_id: Option<ObjectId>,
    page_width: f64,
    page_height: f64,
    dpi: u32,
    caption_font_size: f64,
}

impl PageWriter {
    /// Create a writer for pages of the given size in points.
    pub fn new(page_width: f64, page_height: f64, dpi: u32) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            font_id: None,
            page_width,
            page_height,
            dpi,
            caption_font_size: 8.0,
        }
    }

    /// Set the caption font size in points.
    pub fn with_caption_font_size(mut self, size: f64) -> Self {
        self.caption_font_size = size;
        self
    }

    /// Number of pages written so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Render one page holding `items`, each drawn at its placement.
    pub fn add_page(&mut self, items: &[(&ImageEntry, Placement)]) -> Result<ObjectId> {
        let mut operations = self.background();
        let mut xobjects = Dictionary::new();
        let mut needs_font = false;

        for (index, (entry, placement)) in items.iter().enumerate() {
            let encoded = entry.encode_for(&placement.rect, self.dpi)?;
            debug!(
                path = %entry.path.display(),
                slot = placement.slot,
                width = encoded.width,
                height = encoded.height,
                "embedding image"
            );

            let image_dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(encoded.width),
                "Height" => i64::from(encoded.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            };
            let image_id = self
                .doc
                .add_object(Stream::new(image_dict, encoded.data).with_compression(false));

            let name = format!("Im{}", index + 1);
            xobjects.set(name.as_bytes().to_vec(), image_id);

            let rect = placement.rect;
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        real(rect.width),
                        0.into(),
                        0.into(),
                        real(rect.height),
                        real(rect.x),
                        real(rect.y),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                Operation::new("Q", vec![]),
            ]);

            if let Some(caption) = &placement.caption {
                let fitted =
                    text::fit_text(&caption.text, self.caption_font_size, caption.area.width);
                if !fitted.is_empty() {
                    operations.extend(self.centered_text(
                        &fitted,
                        self.caption_font_size,
                        &caption.area,
                    ));
                    needs_font = true;
                }
            }
        }

        let mut resources = dictionary! { "XObject" => xobjects };
        if needs_font {
            resources.set("Font", self.font_resources());
        }

        self.push_page(operations, resources)
    }

    /// Render a page with a centered title and a smaller subtitle below it.
    pub fn text_page(&mut self, title: &str, subtitle: &str) -> Result<ObjectId> {
        let mut operations = self.background();
        let middle = self.page_height / 2.0;

        let title_line = Rect::new(0.0, middle, self.page_width, TITLE_FONT_SIZE);
        let title = text::fit_text(title, TITLE_FONT_SIZE, self.page_width);
        operations.extend(self.centered_text(&title, TITLE_FONT_SIZE, &title_line));

        let subtitle_line = Rect::new(
            0.0,
            middle - 2.0 * SUBTITLE_FONT_SIZE,
            self.page_width,
            SUBTITLE_FONT_SIZE,
        );
        let subtitle = text::fit_text(subtitle, SUBTITLE_FONT_SIZE, self.page_width);
        operations.extend(self.centered_text(&subtitle, SUBTITLE_FONT_SIZE, &subtitle_line));

        let resources = dictionary! { "Font" => self.font_resources() };
        self.push_page(operations, resources)
    }

    /// Close the page tree and return the finished document.
    pub fn finish(mut self) -> Result<Document> {
        if self.kids.is_empty() {
            return Err(CatalogError::render_failed("Document has no pages"));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => self.kids.len() as i64,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        Ok(self.doc)
    }

    fn background(&self) -> Vec<Operation> {
        vec![
            Operation::new("q", vec![]),
            Operation::new("g", vec![1.into()]),
            Operation::new(
                "re",
                vec![
                    0.into(),
                    0.into(),
                    real(self.page_width),
                    real(self.page_height),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]
    }

    fn centered_text(&self, text: &str, font_size: f64, area: &Rect) -> Vec<Operation> {
        let width = text::text_width(text, font_size);
        let x = area.x + (area.width - width) / 2.0;
        // Baseline sits a little above the bottom so descenders stay inside.
        let y = area.y + (area.height - font_size) / 2.0 + 0.2 * font_size;

        vec![
            Operation::new("BT", vec![]),
            Operation::new("g", vec![0.into()]),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_NAME.as_bytes().to_vec()), real(font_size)],
            ),
            Operation::new("Td", vec![real(x), real(y)]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    fn font_resources(&mut self) -> Dictionary {
        let font_id = match self.font_id {
            Some(id) => id,
            None => {
                let id = self.doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                });
                self.font_id = Some(id);
                id
            }
        };
        dictionary! { FONT_NAME => font_id }
    }

    fn push_page(&mut self, operations: Vec<Operation>, resources: Dictionary) -> Result<ObjectId> {
        let content = Content { operations }
            .encode()
            .map_err(|e| CatalogError::render_failed(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), real(self.page_width), real(self.page_height)],
            "Resources" => resources,
            "Contents" => content_id,
        });
        self.kids.push(page_id);

        Ok(page_id)
    }
}
