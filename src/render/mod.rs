//! Glyph decoding, color extraction and icon compositing.

pub mod compositor;
pub mod extract;
pub mod svg;

pub use compositor::{CompositeSpec, composite_icon, encode_png, render_icon};
pub use extract::{MAX_COLORS, dominant_colors};
pub use svg::SourceImage;
