//! Representative color extraction.
//!
//! SVG glyphs yield every color they declare: solid fills, then solid
//! strokes, then gradient stop colors, each in document order and without
//! duplicates. Raster glyphs are thumbnailed and reduced with median-cut
//! quantization, ordered by population.

use image::RgbaImage;
use palette::Srgb;
use resvg::usvg::{Group, Node, Paint, Tree};

use super::svg::SourceImage;
use crate::error::{IconError, Result};

/// Maximum number of colors quantized out of a raster glyph.
pub const MAX_COLORS: usize = 5;

/// Pixels with lower alpha are ignored when quantizing.
const ALPHA_THRESHOLD: u8 = 127;

/// Raster glyphs are thumbnailed to this size before quantizing.
const SAMPLE_SIZE: u32 = 64;

/// Extracts representative colors from glyph bytes, most significant first.
pub fn dominant_colors(glyph: &[u8]) -> Result<Vec<Srgb<u8>>> {
    let colors = match SourceImage::decode(glyph)? {
        SourceImage::Svg(tree) => paint_colors(&tree),
        SourceImage::Raster(img) => {
            let sample = img.thumbnail(SAMPLE_SIZE, SAMPLE_SIZE).to_rgba8();
            quantize(&sample, MAX_COLORS)
        }
    };
    if colors.is_empty() {
        return Err(IconError::Render("no colors found in glyph".into()));
    }
    Ok(colors)
}

// ============================================================================
// SVG paint colors
// ============================================================================

#[derive(Default)]
struct DeclaredColors {
    fills: Vec<Srgb<u8>>,
    strokes: Vec<Srgb<u8>>,
    stops: Vec<Srgb<u8>>,
}

impl DeclaredColors {
    fn visit(&mut self, group: &Group) {
        for node in group.children() {
            match node {
                Node::Group(child) => self.visit(child),
                Node::Path(path) => {
                    if let Some(fill) = path.fill() {
                        self.add(fill.paint(), true);
                    }
                    if let Some(stroke) = path.stroke() {
                        self.add(stroke.paint(), false);
                    }
                }
                _ => {}
            }
        }
    }

    fn add(&mut self, paint: &Paint, is_fill: bool) {
        match paint {
            Paint::Color(c) => {
                let color = Srgb::new(c.red, c.green, c.blue);
                if is_fill {
                    self.fills.push(color);
                } else {
                    self.strokes.push(color);
                }
            }
            Paint::LinearGradient(gradient) => self.add_stops(gradient.stops()),
            Paint::RadialGradient(gradient) => self.add_stops(gradient.stops()),
            Paint::Pattern(_) => {}
        }
    }

    fn add_stops(&mut self, stops: &[resvg::usvg::Stop]) {
        self.stops.extend(stops.iter().map(|stop| {
            let c = stop.color();
            Srgb::new(c.red, c.green, c.blue)
        }));
    }
}

/// Fill colors, then stroke colors, then gradient stop colors, in document
/// order and deduplicated. Patterns contribute nothing.
pub fn paint_colors(tree: &Tree) -> Vec<Srgb<u8>> {
    let mut declared = DeclaredColors::default();
    declared.visit(tree.root());

    let mut colors: Vec<Srgb<u8>> = Vec::new();
    for color in declared
        .fills
        .into_iter()
        .chain(declared.strokes)
        .chain(declared.stops)
    {
        if !colors.contains(&color) {
            colors.push(color);
        }
    }
    colors
}

// ============================================================================
// Median-cut quantization
// ============================================================================

/// Reduces an image to at most `max_colors` colors by median cut.
///
/// Boxes are split on their widest channel at the median until the budget
/// is reached or no box can be split. Each box contributes its mean color;
/// results are ordered by pixel count, largest first.
pub fn quantize(image: &RgbaImage, max_colors: usize) -> Vec<Srgb<u8>> {
    let pixels: Vec<[u8; 3]> = image
        .pixels()
        .filter(|p| p[3] >= ALPHA_THRESHOLD)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    if pixels.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut boxes: Vec<Vec<[u8; 3]>> = vec![pixels];
    while boxes.len() < max_colors {
        let Some((index, channel)) = widest_box(&boxes) else {
            break;
        };
        let mut bucket = boxes.swap_remove(index);
        bucket.sort_unstable_by_key(|p| p[channel]);
        let upper = bucket.split_off(split_point(&bucket, channel));
        boxes.push(bucket);
        boxes.push(upper);
    }

    boxes.sort_by_key(|b| std::cmp::Reverse(b.len()));
    boxes.iter().map(|b| mean(b)).collect()
}

/// Finds the box with the largest single-channel range, returning its index
/// and that channel. Boxes with a zero range cannot be split.
fn widest_box(boxes: &[Vec<[u8; 3]>]) -> Option<(usize, usize)> {
    boxes
        .iter()
        .enumerate()
        .filter(|(_, b)| b.len() > 1)
        .filter_map(|(i, b)| {
            (0..3)
                .map(|c| {
                    let (lo, hi) = b
                        .iter()
                        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[c]), hi.max(p[c])));
                    (hi - lo, c)
                })
                .max()
                .filter(|(range, _)| *range > 0)
                .map(|(range, c)| (range, i, c))
        })
        .max_by_key(|(range, _, _)| *range)
        .map(|(_, i, c)| (i, c))
}

/// Index splitting a sorted box at its median value so that equal values
/// never straddle the cut. Always in `1..len` for a box with nonzero range.
fn split_point(sorted: &[[u8; 3]], channel: usize) -> usize {
    let median = sorted[sorted.len() / 2][channel];
    match sorted.partition_point(|p| p[channel] < median) {
        0 => sorted.partition_point(|p| p[channel] <= median),
        index => index,
    }
}

fn mean(pixels: &[[u8; 3]]) -> Srgb<u8> {
    let n = pixels.len().max(1) as u64;
    let sum = pixels.iter().fold([0u64; 3], |mut acc, p| {
        for c in 0..3 {
            acc[c] += u64::from(p[c]);
        }
        acc
    });
    Srgb::new(
        ((sum[0] + n / 2) / n) as u8,
        ((sum[1] + n / 2) / n) as u8,
        ((sum[2] + n / 2) / n) as u8,
    )
}
