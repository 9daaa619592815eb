//! Glyph-on-background compositing and PNG encoding.
//!
//! # Pipeline
//!
//! 1. **Rasterize** - SVG glyphs are rendered at a density that makes their
//!    natural size fill the drawable box, avoiding blurry upscaling.
//! 2. **Contain** - the raster is fitted into the drawable box preserving
//!    aspect ratio, first on a transparent canvas and then with the
//!    background color filling the letterbox.
//! 3. **Composite** - the fitted glyph is drawn over a solid background.
//! 4. **Pad** - the canvas is extended on all sides with the background.
//! 5. **Encode** - the result is written as PNG.
//!
//! Any failing step aborts the whole pipeline.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use super::svg::{SourceImage, render_tree};
use crate::color::ColorDecision;
use crate::error::{IconError, Result};
use crate::request::IconRequest;

/// Density an SVG is assumed to have when none is declared.
const BASE_DENSITY: f32 = 72.0;

/// How far an intermediate SVG raster may exceed the drawable box per axis.
const MAX_OVERSAMPLE: f32 = 2.0;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ============================================================================
// CompositeSpec
// ============================================================================

/// Geometry and background for one composite.
///
/// `width` and `height` describe the drawable box the glyph is fitted into;
/// the encoded canvas is that box plus `padding` on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeSpec {
    /// Drawable box width.
    pub width: u32,
    /// Drawable box height.
    pub height: u32,
    /// Padding added on each side.
    pub padding: u32,
    /// Background color.
    pub background: ColorDecision,
}

impl CompositeSpec {
    /// Derives the composite geometry for a validated request.
    pub fn for_request(request: &IconRequest, background: ColorDecision) -> Self {
        Self {
            width: request.drawable_width(),
            height: request.drawable_height(),
            padding: request.padding,
            background,
        }
    }

    /// Width of the encoded canvas.
    pub fn canvas_width(&self) -> u32 {
        self.width + 2 * self.padding
    }

    /// Height of the encoded canvas.
    pub fn canvas_height(&self) -> u32 {
        self.height + 2 * self.padding
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Runs the full pipeline and returns PNG bytes.
pub fn render_icon(glyph: &[u8], spec: &CompositeSpec) -> Result<Vec<u8>> {
    let image = composite_icon(glyph, spec)?;
    encode_png(image)
}

/// Runs every step except encoding.
pub fn composite_icon(glyph: &[u8], spec: &CompositeSpec) -> Result<RgbaImage> {
    if spec.width == 0 || spec.height == 0 {
        return Err(IconError::Render(format!(
            "drawable area is {}x{}",
            spec.width, spec.height
        )));
    }
    let background = Rgba(spec.background.rgba());

    let source = SourceImage::decode(glyph)?;
    let fitted = rasterize_to_fit(&source, spec.width, spec.height)?;
    let letterboxed = contain(&fitted, spec.width, spec.height, background);

    let canvas = underlay(&letterboxed, background);
    let padded = extend(&canvas, spec.padding, background);
    debug!(
        width = padded.width(),
        height = padded.height(),
        background = %spec.background.hex(),
        "composited icon"
    );
    Ok(padded)
}

/// Rasterizes a source and contain-fits it into `width x height` on a
/// transparent canvas.
///
/// SVGs are rendered at `BASE_DENSITY * target / natural`, taking the larger
/// of the horizontal and vertical densities, limited by [`render_scale`].
pub fn rasterize_to_fit(source: &SourceImage, width: u32, height: u32) -> Result<RgbaImage> {
    let raster = match source {
        SourceImage::Svg(tree) => {
            let natural = source.natural_size();
            let density = svg_density(natural, width, height);
            let scale = render_scale(natural, width, height);
            debug!(?density, scale, "rasterizing svg");
            render_tree(tree, scale)?
        }
        SourceImage::Raster(img) => img.to_rgba8(),
    };
    Ok(contain(&raster, width, height, TRANSPARENT))
}

/// The rasterization density for an SVG of natural size `natural`, or
/// `None` when neither dimension can be determined.
pub fn svg_density(natural: (f32, f32), width: u32, height: u32) -> Option<f32> {
    let (natural_w, natural_h) = natural;
    let w_density = if width > 0 && natural_w > 0.0 {
        BASE_DENSITY * width as f32 / natural_w
    } else {
        0.0
    };
    let h_density = if height > 0 && natural_h > 0.0 {
        BASE_DENSITY * height as f32 / natural_h
    } else {
        0.0
    };
    let density = w_density.max(h_density);
    (density > 0.0).then_some(density)
}

/// The scale an SVG of natural size `natural` is rendered at.
///
/// This is the density scale, capped so that neither side of the raster
/// exceeds [`MAX_OVERSAMPLE`] times the matching side of the drawable box.
/// Very thin glyphs would otherwise produce rasters far larger than the
/// icon itself.
pub fn render_scale(natural: (f32, f32), width: u32, height: u32) -> f32 {
    let density_scale = svg_density(natural, width, height).map_or(1.0, |d| d / BASE_DENSITY);
    let (natural_w, natural_h) = natural;
    let mut cap = f32::INFINITY;
    if natural_w > 0.0 {
        cap = cap.min(MAX_OVERSAMPLE * width as f32 / natural_w);
    }
    if natural_h > 0.0 {
        cap = cap.min(MAX_OVERSAMPLE * height as f32 / natural_h);
    }
    density_scale.min(cap)
}

/// Fits `image` inside `width x height` preserving aspect ratio, centered,
/// with `fill` in the uncovered area.
///
/// Pixels of the fitted image replace the fill rather than blending with it.
pub fn contain(image: &RgbaImage, width: u32, height: u32, fill: Rgba<u8>) -> RgbaImage {
    let (src_w, src_h) = image.dimensions();
    let scale = (width as f32 / src_w as f32).min(height as f32 / src_h as f32);
    let fit_w = ((src_w as f32 * scale).round() as u32).clamp(1, width);
    let fit_h = ((src_h as f32 * scale).round() as u32).clamp(1, height);

    let mut canvas = RgbaImage::from_pixel(width, height, fill);
    let x = i64::from((width - fit_w) / 2);
    let y = i64::from((height - fit_h) / 2);
    if (fit_w, fit_h) == (src_w, src_h) {
        imageops::replace(&mut canvas, image, x, y);
    } else {
        let resized = imageops::resize(image, fit_w, fit_h, FilterType::Lanczos3);
        imageops::replace(&mut canvas, &resized, x, y);
    }
    canvas
}

/// Draws `glyph` over a solid `background` of the same size.
pub fn underlay(glyph: &RgbaImage, background: Rgba<u8>) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(glyph.width(), glyph.height(), background);
    for (dst, src) in canvas.pixels_mut().zip(glyph.pixels()) {
        blend_over(dst, *src);
    }
    canvas
}

/// Straight-alpha source-over in integer arithmetic.
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let src_a = u32::from(src[3]);
    match src_a {
        0 => return,
        255 => {
            *dst = src;
            return;
        }
        _ => {}
    }
    let dst_a = u32::from(dst[3]) * (255 - src_a) / 255;
    let out_a = src_a + dst_a;
    for c in 0..3 {
        let mixed = u32::from(src[c]) * src_a + u32::from(dst[c]) * dst_a;
        dst[c] = ((mixed + out_a / 2) / out_a) as u8;
    }
    dst[3] = out_a as u8;
}

/// Extends `image` by `padding` pixels on every side, filled with `fill`.
pub fn extend(image: &RgbaImage, padding: u32, fill: Rgba<u8>) -> RgbaImage {
    if padding == 0 {
        return image.clone();
    }
    let mut canvas = RgbaImage::from_pixel(
        image.width() + 2 * padding,
        image.height() + 2 * padding,
        fill,
    );
    imageops::replace(&mut canvas, image, i64::from(padding), i64::from(padding));
    canvas
}

/// Encodes an RGBA image as PNG.
pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| IconError::Render(e.to_string()))?;
    Ok(buffer)
}
