//! Request normalization: canonical redirects, presets and size arithmetic.

use palette::Srgba;
use tracing::info;

use crate::color::{AutoColorStyle, canonical_color_hex, parse_hex};
use crate::error::{IconError, Result};
use crate::query::QueryParams;
use crate::unicode::{contains_double_byte, is_hex_codepoint, to_unicode};

// ============================================================================
// SizePreset
// ============================================================================

/// Output size preset selected by `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizePreset {
    /// 1024x1024 with 128px padding.
    #[default]
    Default,
    /// 2048x2048 with 832px padding.
    Splash,
    /// 48x48 with no padding.
    Favicon,
}

impl SizePreset {
    /// Maps a `kind` value to a preset; unknown or absent kinds are
    /// [`SizePreset::Default`].
    pub fn from_kind(kind: Option<&str>) -> Self {
        match kind {
            Some("splash") => Self::Splash,
            Some("favicon") => Self::Favicon,
            _ => Self::Default,
        }
    }

    /// Padding in pixels.
    pub fn padding(self) -> u32 {
        match self {
            Self::Default => 128,
            Self::Splash => 832,
            Self::Favicon => 0,
        }
    }

    /// Canvas width in pixels.
    pub fn width(self) -> u32 {
        match self {
            Self::Default => 1024,
            Self::Splash => 2048,
            Self::Favicon => 48,
        }
    }

    /// Canvas height in pixels.
    pub fn height(self) -> u32 {
        self.width()
    }
}

// ============================================================================
// IconRequest
// ============================================================================

/// How the caller identified the glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconIdentifier {
    /// Hex codepoints such as `1f600` or `1f44b-1f3fd`.
    Hex(String),
    /// An emoji short name from the lookup table.
    Name(String),
    /// Nothing given; a random glyph is used.
    Random,
}

/// A validated request ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct IconRequest {
    /// Which glyph to draw.
    pub identifier: IconIdentifier,
    /// The preset that supplied default dimensions.
    pub preset: SizePreset,
    /// Final canvas width.
    pub width: u32,
    /// Final canvas height.
    pub height: u32,
    /// Padding around the glyph box.
    pub padding: u32,
    /// Explicit background, if any.
    pub color: Option<Srgba<u8>>,
    /// Background derivation style when `color` is absent.
    pub auto_color_style: AutoColorStyle,
}

impl IconRequest {
    /// Width of the box the glyph is drawn into (`width - 2 * padding`).
    pub fn drawable_width(&self) -> u32 {
        self.width - 2 * self.padding
    }

    /// Height of the box the glyph is drawn into (`height - 2 * padding`).
    pub fn drawable_height(&self) -> u32 {
        self.height - 2 * self.padding
    }
}

/// Outcome of normalizing a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// The query is not canonical; redirect to this query string.
    Redirect(String),
    /// The query is canonical and validated.
    Render(IconRequest),
}

/// Normalizes a query into either a canonical redirect or a render request.
///
/// `path_kind` is the `kind` path segment when the route carries one; it
/// takes precedence over the `kind` query key. `max_dimension` bounds the
/// requested width and height.
pub fn normalize(
    query: &QueryParams,
    path_kind: Option<&str>,
    max_dimension: u32,
) -> Result<Normalized> {
    if let Some(icon) = query.first("icon") {
        if contains_double_byte(icon) {
            let mut canonical = query.clone();
            canonical.set("icon", to_unicode(icon));
            canonical.remove("kind");
            let redirect = canonical.to_query_string();
            info!(%redirect, "redirect emoji");
            return Ok(Normalized::Redirect(redirect));
        }
    }

    if let Some(color) = query.first("color").filter(|c| !c.is_empty()) {
        let hex = canonical_color_hex(color)?;
        let mut canonical = query.clone();
        canonical.set("color_hex", hex);
        canonical.remove("color");
        canonical.remove("kind");
        let redirect = canonical.to_query_string();
        info!(%redirect, "redirect color");
        return Ok(Normalized::Redirect(redirect));
    }

    let preset = SizePreset::from_kind(path_kind.or_else(|| query.first("kind")));

    let color = match query.first("color_hex").filter(|c| !c.is_empty()) {
        Some(hex) => Some(
            parse_hex(hex).ok_or_else(|| {
                IconError::invalid("color_hex", hex, "a 3, 6 or 8 digit hex color without '#'")
            })?,
        ),
        None => None,
    };

    let padding = query.numeric("padding")?.unwrap_or(preset.padding());
    let width = query.numeric("width")?.unwrap_or(preset.width());
    let height = query.numeric("height")?.unwrap_or(preset.height());

    for (key, value) in [("width", width), ("height", height)] {
        if value > max_dimension {
            return Err(IconError::invalid(
                key,
                value.to_string(),
                "a size no larger than the configured maximum",
            ));
        }
    }
    if u64::from(padding) * 2 >= u64::from(width.min(height)) {
        return Err(IconError::invalid(
            "padding",
            padding.to_string(),
            "padding smaller than half of the width and height",
        ));
    }

    Ok(Normalized::Render(IconRequest {
        identifier: identifier(query),
        preset,
        width,
        height,
        padding,
        color,
        auto_color_style: AutoColorStyle::from_param(query.first("auto_color_style")),
    }))
}

/// `icon` wins over `name`; an `icon` that is not a hex sequence is a name.
fn identifier(query: &QueryParams) -> IconIdentifier {
    match query.first("icon").filter(|s| !s.is_empty()) {
        Some(icon) if is_hex_codepoint(icon) => IconIdentifier::Hex(icon.to_string()),
        Some(icon) => IconIdentifier::Name(icon.to_string()),
        None => match query.first("name").filter(|s| !s.is_empty()) {
            Some(name) => IconIdentifier::Name(name.to_string()),
            None => IconIdentifier::Random,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 4096;

    fn normalize_str(raw: &str) -> Result<Normalized> {
        normalize(&QueryParams::parse(raw).unwrap(), None, MAX)
    }

    fn render(raw: &str) -> IconRequest {
        match normalize_str(raw).unwrap() {
            Normalized::Render(req) => req,
            other => panic!("expected render for {raw}, got {other:?}"),
        }
    }

    fn redirect(raw: &str) -> String {
        match normalize_str(raw).unwrap() {
            Normalized::Redirect(q) => q,
            other => panic!("expected redirect for {raw}, got {other:?}"),
        }
    }

    #[test]
    fn literal_glyph_redirects_to_hex() {
        assert_eq!(redirect("icon=%F0%9F%98%80"), "icon=1f600");
    }

    #[test]
    fn literal_glyph_redirect_strips_kind() {
        let q = redirect("icon=%F0%9F%91%8B%F0%9F%8F%BD&kind=favicon&width=64");
        assert_eq!(q, "icon=1f44b-1f3fd&width=64");
    }

    #[test]
    fn color_name_redirects_to_hex() {
        assert_eq!(redirect("color=red&kind=icon"), "color_hex=ff0000");
    }

    #[test]
    fn hex_color_redirects_without_hash() {
        for hex in ["fff", "a1b2c3", "a1b2c3d4"] {
            let q = redirect(&format!("icon=1f600&color={hex}&kind=splash"));
            assert_eq!(q, format!("icon=1f600&color_hex={hex}"));
        }
    }

    #[test]
    fn unknown_color_is_invalid() {
        let err = normalize_str("color=notacolor").unwrap_err();
        match err {
            IconError::InvalidParameter { key, value, .. } => {
                assert_eq!(key, "color");
                assert_eq!(value, "notacolor");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn presets() {
        let default = render("icon=1f600");
        assert_eq!((default.width, default.height, default.padding), (1024, 1024, 128));
        assert_eq!(default.drawable_width(), 768);

        let splash = render("icon=1f600&kind=splash");
        assert_eq!((splash.width, splash.height, splash.padding), (2048, 2048, 832));
        assert_eq!(splash.drawable_height(), 384);

        let favicon = render("icon=1f600&kind=favicon");
        assert_eq!((favicon.width, favicon.height, favicon.padding), (48, 48, 0));
    }

    #[test]
    fn path_kind_overrides_query_kind() {
        let q = QueryParams::parse("icon=1f600&kind=splash").unwrap();
        match normalize(&q, Some("favicon"), MAX).unwrap() {
            Normalized::Render(req) => assert_eq!(req.preset, SizePreset::Favicon),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn explicit_sizes_override_preset() {
        let req = render("icon=1f600&kind=favicon&width=100&height=80&padding=10");
        assert_eq!((req.width, req.height, req.padding), (100, 80, 10));
        assert_eq!((req.drawable_width(), req.drawable_height()), (80, 60));
    }

    #[test]
    fn oversized_padding_is_rejected() {
        let err = normalize_str("icon=1f600&kind=favicon&padding=24").unwrap_err();
        assert!(
            matches!(err, IconError::InvalidParameter { ref key, .. } if key == "padding"),
            "got {err:?}"
        );
        assert!(normalize_str("icon=1f600&kind=favicon&padding=23").is_ok());
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(normalize_str("icon=1f600&width=0&padding=0").is_err());
    }

    #[test]
    fn oversized_dimension_is_rejected() {
        let err = normalize_str("icon=1f600&width=5000").unwrap_err();
        assert!(matches!(err, IconError::InvalidParameter { ref key, .. } if key == "width"));
    }

    #[test]
    fn array_width_is_rejected() {
        assert!(normalize_str("icon=1f600&width=1&width=2").is_err());
    }

    #[test]
    fn color_hex_is_parsed() {
        let req = render("icon=1f600&color_hex=00ff00");
        assert_eq!(req.color, Some(Srgba::new(0, 255, 0, 255)));
        assert!(normalize_str("icon=1f600&color_hex=zzz").is_err());
    }

    #[test]
    fn identifier_precedence() {
        assert_eq!(render("icon=1F600&name=smile").identifier, IconIdentifier::Hex("1F600".into()));
        assert_eq!(render("name=smile").identifier, IconIdentifier::Name("smile".into()));
        assert_eq!(render("icon=smile").identifier, IconIdentifier::Name("smile".into()));
        assert_eq!(render("").identifier, IconIdentifier::Random);
    }

    #[test]
    fn auto_color_style_is_read() {
        assert_eq!(render("auto_color_style=flood").auto_color_style, AutoColorStyle::Flood);
        assert_eq!(render("").auto_color_style, AutoColorStyle::Contrast);
    }
}
