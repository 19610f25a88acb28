//! Image decoding and JPEG re-encoding for embedding.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use std::path::{Path, PathBuf};

use crate::config::POINTS_PER_INCH;
use crate::error::{CatalogError, Result};
use crate::layout::Rect;

const JPEG_QUALITY: u8 = 90;

/// A decoded, orientation-corrected image ready to be placed on a page.
pub struct ImageEntry {
    /// Source file.
    pub path: PathBuf,
    image: DynamicImage,
}

impl std::fmt::Debug for ImageEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageEntry")
            .field("path", &self.path)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// JPEG bytes of an image plus their pixel size.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Baseline JPEG data.
    pub data: Vec<u8>,
}

impl ImageEntry {
    /// Decode an image file, applying its EXIF orientation.
    ///
    /// The format is detected from the file contents, not the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let decode_err = |reason: String| CatalogError::image_decode(path.to_path_buf(), reason);

        let reader = ImageReader::open(path)
            .map_err(|e| decode_err(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| decode_err(e.to_string()))?;

        let mut decoder = reader.into_decoder().map_err(|e| decode_err(e.to_string()))?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

        let mut image = DynamicImage::from_decoder(decoder).map_err(|e| decode_err(e.to_string()))?;
        image.apply_orientation(orientation);

        if image.width() == 0 || image.height() == 0 {
            return Err(decode_err("image has zero size".to_string()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    /// Wrap an already decoded image.
    pub fn from_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    /// Pixel width after orientation.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Pixel height after orientation.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// File stem used as caption.
    pub fn caption(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Pixel size needed to draw into `rect` at `dpi`, never larger than the
    /// image itself.
    pub fn target_size(&self, rect: &Rect, dpi: u32) -> (u32, u32) {
        let (width, height) = (self.width(), self.height());
        let needed_width = (rect.width / POINTS_PER_INCH * f64::from(dpi)).ceil().max(1.0);
        let needed_height = (rect.height / POINTS_PER_INCH * f64::from(dpi)).ceil().max(1.0);

        let scale = (needed_width / f64::from(width))
            .max(needed_height / f64::from(height))
            .min(1.0);

        if scale >= 1.0 {
            return (width, height);
        }

        // 0 < scale < 1, so both products lie in (0, dimension] and fit in u32.
        (
            ((f64::from(width) * scale).round() as u32).clamp(1, width),
            ((f64::from(height) * scale).round() as u32).clamp(1, height),
        )
    }

    /// Encode the image as RGB JPEG sized for `rect` at `dpi`.
    ///
    /// Transparent pixels are composited onto white.
    pub fn encode_for(&self, rect: &Rect, dpi: u32) -> Result<EncodedImage> {
        let (width, height) = self.target_size(rect, dpi);

        let rgb = if (width, height) == (self.width(), self.height()) {
            flatten_to_rgb(&self.image)
        } else {
            flatten_to_rgb(&self.image.resize_exact(width, height, FilterType::Triangle))
        };

        let mut data = Vec::new();
        DynamicImage::ImageRgb8(rgb)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY))
            .map_err(|e| {
                CatalogError::render_failed(format!(
                    "Failed to encode {}: {e}",
                    self.path.display()
                ))
            })?;

        Ok(EncodedImage {
            width,
            height,
            data,
        })
    }
}

fn flatten_to_rgb(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
