//! Glyph decoding and rasterization using resvg/usvg and image.
//!
//! Source decoding here is shared by the compositor and dominant color
//! extraction.

use image::{DynamicImage, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::{IconError, Result};

// ============================================================================
// SourceImage
// ============================================================================

/// A decoded glyph.
///
/// Upstream glyphs are normally SVG, but any raster format the `image`
/// crate recognizes is accepted too.
pub enum SourceImage {
    /// A parsed SVG document.
    Svg(Tree),

    /// A decoded raster image.
    Raster(DynamicImage),
}

impl SourceImage {
    /// Decodes glyph bytes, trying raster formats first and SVG second.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if image::guess_format(bytes).is_ok() {
            return image::load_from_memory(bytes)
                .map(Self::Raster)
                .map_err(|e| IconError::ImageDecode(e.to_string()));
        }
        let opts = Options::default();
        Tree::from_data(bytes, &opts)
            .map(Self::Svg)
            .map_err(|e| IconError::ImageDecode(e.to_string()))
    }

    /// Returns `true` if this is an SVG source.
    pub fn is_svg(&self) -> bool {
        matches!(self, Self::Svg(_))
    }

    /// The intrinsic size in pixels.
    pub fn natural_size(&self) -> (f32, f32) {
        match self {
            Self::Svg(tree) => (tree.size().width(), tree.size().height()),
            Self::Raster(img) => (img.width() as f32, img.height() as f32),
        }
    }
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.natural_size();
        let kind = if self.is_svg() { "Svg" } else { "Raster" };
        f.debug_struct(kind)
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

// ============================================================================
// SVG Rendering
// ============================================================================

/// Upper bound on the pixels of any intermediate raster.
pub const MAX_PIXELS: u64 = 1 << 26;

/// Renders an SVG tree at a uniform scale factor.
///
/// The pixmap is sized to the scaled natural size, rounded up. Sizes above
/// [`MAX_PIXELS`] are refused before anything is allocated.
pub fn render_tree(tree: &Tree, scale: f32) -> Result<RgbaImage> {
    let svg_size = tree.size();
    let width = (svg_size.width() * scale).ceil().max(1.0);
    let height = (svg_size.height() * scale).ceil().max(1.0);
    if f64::from(width) * f64::from(height) > MAX_PIXELS as f64 {
        return Err(IconError::Render(format!(
            "{width}x{height} raster exceeds {MAX_PIXELS} pixels"
        )));
    }
    let (width, height) = (width as u32, height as u32);

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| IconError::Render(format!("cannot allocate {width}x{height} pixmap")))?;
    resvg::render(tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap_to_rgba_image(&pixmap)
}

/// Converts a tiny_skia Pixmap (premultiplied) to a straight-alpha RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> Result<RgbaImage> {
    let raw: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let c = pixel.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .ok_or_else(|| IconError::Render("pixmap buffer size mismatch".into()))
}
