//! Page geometry and image placement.
//!
//! All coordinates are PDF points with the origin at the bottom-left corner
//! of the page. Cells are numbered row-major starting at the top-left, so
//! slot 0 is the top-left cell and the last slot is the bottom-right one.

use crate::config::LayoutConfig;
use crate::error::{CatalogError, Result};

/// Tolerance used when comparing rectangles.
const EPSILON: f64 = 1e-6;

/// Axis-aligned rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its bottom-left corner and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Shrink the rectangle by `amount` on every side.
    pub fn inset(&self, amount: f64) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Whether `other` lies entirely within this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.top() <= self.top() + EPSILON
    }

    /// Whether the two rectangles share any interior area.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right() - EPSILON
            && other.x < self.right() - EPSILON
            && self.y < other.top() - EPSILON
            && other.y < self.top() - EPSILON
    }
}

/// Derive `(rows, columns)` for `n` images per page.
///
/// Columns are the ceiling of the square root, so a non-square count gets
/// the spare capacity as extra columns rather than extra rows.
pub fn grid_shape(n: usize) -> (usize, usize) {
    let n = n.max(1);
    let mut columns = 1;
    while columns * columns < n {
        columns += 1;
    }
    let rows = n.div_ceil(columns);
    (rows, columns)
}

/// Largest rectangle with the image's aspect ratio that fits in `area`,
/// centered. Without aspect preservation the image is stretched to the area.
pub fn fit_rect(image_width: f64, image_height: f64, area: &Rect, preserve_aspect: bool) -> Rect {
    if !preserve_aspect || image_width <= 0.0 || image_height <= 0.0 {
        return *area;
    }

    let scale = (area.width / image_width).min(area.height / image_height);
    let width = image_width * scale;
    let height = image_height * scale;

    Rect::new(
        area.x + (area.width - width) / 2.0,
        area.y + (area.height - height) / 2.0,
        width,
        height,
    )
}

/// Split `count` items into consecutive pages of at most `per_page` items.
///
/// Returns the number of items on each page, in order. Every page but the
/// last is full.
pub fn paginate(count: usize, per_page: usize) -> Vec<usize> {
    let per_page = per_page.max(1);
    let mut pages = Vec::with_capacity(count.div_ceil(per_page));
    let mut remaining = count;
    while remaining > 0 {
        let take = remaining.min(per_page);
        pages.push(take);
        remaining -= take;
    }
    pages
}

/// One grid cell of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Full cell bounds, before padding.
    pub bounds: Rect,
    /// Area available to the image.
    pub image_area: Rect,
    /// Strip reserved for the caption, in catalog mode.
    pub caption_area: Option<Rect>,
}

/// Where an image goes on its page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Cell index on the page.
    pub slot: usize,
    /// Destination rectangle of the image.
    pub rect: Rect,
    /// Caption text and the strip it is drawn in.
    pub caption: Option<Caption>,
}

/// Caption text bound to its strip.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// Text to draw.
    pub text: String,
    /// Strip the text is centered in.
    pub area: Rect,
}

/// Geometry shared by every page of a run.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Page width in points.
    pub page_width: f64,
    /// Page height in points.
    pub page_height: f64,
    /// Number of grid rows.
    pub rows: usize,
    /// Number of grid columns.
    pub columns: usize,
    cells: Vec<Cell>,
    capacity: usize,
    preserve_aspect: bool,
}

impl PageLayout {
    /// Compute the page geometry for a layout configuration.
    ///
    /// The configuration is expected to have been validated; degenerate
    /// values produce empty image areas rather than a panic.
    pub fn new(config: &LayoutConfig) -> Self {
        let (page_width, page_height) = config.page_size.dimensions();
        let margin = config.margin_points();
        let capacity = config.effective_images_per_page().max(1);
        let (rows, columns) = grid_shape(capacity);

        let printable_width = (page_width - 2.0 * margin).max(0.0);
        let printable_height = (page_height - 2.0 * margin).max(0.0);
        let cell_width = printable_width / columns as f64;
        let cell_height = printable_height / rows as f64;

        let caption_height = if config.mode.has_captions() {
            config.caption_height
        } else {
            0.0
        };

        let mut cells = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                let bounds = Rect::new(
                    margin + column as f64 * cell_width,
                    page_height - margin - (row + 1) as f64 * cell_height,
                    cell_width,
                    cell_height,
                );
                let content = bounds.inset(config.cell_padding);

                let (image_area, caption_area) = if caption_height > 0.0 {
                    let strip = content.height.min(caption_height);
                    (
                        Rect::new(
                            content.x,
                            content.y + strip,
                            content.width,
                            content.height - strip,
                        ),
                        Some(Rect::new(content.x, content.y, content.width, strip)),
                    )
                } else {
                    (content, None)
                };

                cells.push(Cell {
                    bounds,
                    image_area,
                    caption_area,
                });
            }
        }

        Self {
            page_width,
            page_height,
            rows,
            columns,
            cells,
            capacity,
            preserve_aspect: config.preserve_aspect,
        }
    }

    /// Images placed on one page.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All cells in slot order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell for a slot.
    pub fn cell(&self, slot: usize) -> Option<&Cell> {
        if slot < self.capacity {
            self.cells.get(slot)
        } else {
            None
        }
    }

    /// Place an image of `width`×`height` pixels into `slot`.
    ///
    /// The caption is attached only when the layout reserves a caption strip.
    pub fn place(
        &self,
        slot: usize,
        width: u32,
        height: u32,
        caption: Option<&str>,
    ) -> Result<Placement> {
        let cell = self.cell(slot).ok_or_else(|| {
            CatalogError::render_failed(format!(
                "Slot {slot} is out of range for a page holding {} image(s)",
                self.capacity
            ))
        })?;

        let rect = fit_rect(
            f64::from(width),
            f64::from(height),
            &cell.image_area,
            self.preserve_aspect,
        );

        let caption = match (caption, cell.caption_area) {
            (Some(text), Some(area)) => Some(Caption {
                text: text.to_string(),
                area,
            }),
            _ => None,
        };

        Ok(Placement {
            slot,
            rect,
            caption,
        })
    }
}
