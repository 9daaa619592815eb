//! Background color parsing and derivation.
//!
//! Colors reach the compositor in one of three ways: an explicit `color_hex`
//! query value, a color derived from the glyph's dominant colors, or the
//! white fallback used when extraction fails.

use palette::{Clamp, IntoColor, Lab, LinSrgb, Srgb, Srgba};
use tracing::{debug, warn};

use crate::error::{IconError, Result};
use crate::render::extract::dominant_colors;

/// Lab lightness below which the averaged color is considered dark.
const DARK_LIGHTNESS: f32 = 80.0;
/// Fraction of the lightness used as the brighten/darken amount.
const ADJUST_FACTOR: f32 = 0.04;
/// Lab lightness units per unit of brighten/darken amount.
const LAB_KN: f32 = 18.0;

const COLOR_EXPECTED: &str = "a CSS color name or hex color without '#'";

// ============================================================================
// AutoColorStyle
// ============================================================================

/// How a background is derived when no explicit color is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoColorStyle {
    /// Use the most dominant glyph color verbatim.
    Flood,
    /// Shift the averaged glyph color away from its own lightness.
    #[default]
    Contrast,
}

impl AutoColorStyle {
    /// Reads the `auto_color_style` query value. Anything but `flood` is
    /// treated as contrast.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("flood") => Self::Flood,
            _ => Self::Contrast,
        }
    }
}

// ============================================================================
// ColorDecision
// ============================================================================

/// Where a background color came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    /// Supplied by the caller through `color_hex`.
    Explicit,
    /// Most dominant extracted color.
    DerivedFlood,
    /// Averaged extracted colors, brightened or darkened.
    DerivedContrast,
    /// Extraction failed; white is used.
    Fallback,
}

/// The background color chosen for a request, with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDecision {
    /// The background color.
    pub color: Srgba<u8>,
    /// How the color was chosen.
    pub source: ColorSource,
}

impl ColorDecision {
    /// An explicit caller-supplied color.
    pub fn explicit(color: Srgba<u8>) -> Self {
        Self {
            color,
            source: ColorSource::Explicit,
        }
    }

    /// The white fallback.
    pub fn fallback() -> Self {
        Self {
            color: Srgba::new(255, 255, 255, 255),
            source: ColorSource::Fallback,
        }
    }

    /// Formats the color as `#rrggbb`, or `#rrggbbaa` when translucent.
    pub fn hex(&self) -> String {
        let c = self.color;
        if c.alpha == 255 {
            format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", c.red, c.green, c.blue, c.alpha)
        }
    }

    /// Returns the color as an RGBA byte array.
    pub fn rgba(&self) -> [u8; 4] {
        let c = self.color;
        [c.red, c.green, c.blue, c.alpha]
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Returns true for `#` followed by 3, 6 or 8 hex digits.
pub fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 6 | 8) && digits.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

/// Parses a 3, 6 or 8 digit hex color, with or without the leading `#`.
pub fn parse_hex(s: &str) -> Option<Srgba<u8>> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if !is_hex_color(&format!("#{digits}")) {
        return None;
    }
    let channel = |i: usize, len: usize| u8::from_str_radix(&digits[i..i + len], 16).ok();
    match digits.len() {
        3 => {
            let expand = |i: usize| channel(i, 1).map(|v| v * 17);
            Some(Srgba::new(expand(0)?, expand(1)?, expand(2)?, 255))
        }
        6 => Some(Srgba::new(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, 255)),
        8 => Some(Srgba::new(
            channel(0, 2)?,
            channel(2, 2)?,
            channel(4, 2)?,
            channel(6, 2)?,
        )),
        _ => None,
    }
}

/// Looks up a CSS extended color keyword and returns it as `#rrggbb`.
pub fn css_name_to_hex(name: &str) -> Option<String> {
    let rgb: Srgb<u8> = palette::named::from_str(&name.to_ascii_lowercase())?;
    Some(format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue))
}

/// Canonicalizes a `color` query value to hex digits without the `#`.
///
/// Hex input is kept as written; CSS names are looked up. Anything else is
/// an [`IconError::InvalidParameter`].
pub fn canonical_color_hex(color: &str) -> Result<String> {
    let candidate = format!("#{color}");
    let hex = if is_hex_color(&candidate) {
        candidate
    } else {
        css_name_to_hex(color).ok_or_else(|| IconError::invalid("color", color, COLOR_EXPECTED))?
    };
    Ok(hex[1..].to_string())
}

// ============================================================================
// Derivation
// ============================================================================

/// Picks the background: the explicit color when given, otherwise one
/// derived from the glyph bytes.
///
/// Extraction failure is not an error: it is logged and white is used.
pub fn resolve_color(
    explicit: Option<Srgba<u8>>,
    glyph: &[u8],
    style: AutoColorStyle,
) -> ColorDecision {
    if let Some(color) = explicit {
        return ColorDecision::explicit(color);
    }
    match derive_color(glyph, style) {
        Ok(decision) => {
            debug!(color = %decision.hex(), ?style, "derived background color");
            decision
        }
        Err(err) => {
            warn!(error = %err, "error getting colors, falling back to white");
            ColorDecision::fallback()
        }
    }
}

/// Derives a background from the glyph's dominant colors.
pub fn derive_color(glyph: &[u8], style: AutoColorStyle) -> Result<ColorDecision> {
    let colors = dominant_colors(glyph)?;
    let (rgb, source) = match style {
        AutoColorStyle::Flood => (flood_color(&colors), ColorSource::DerivedFlood),
        AutoColorStyle::Contrast => (contrast_color(&colors), ColorSource::DerivedContrast),
    };
    let rgb = rgb.ok_or_else(|| IconError::Render("glyph has no opaque pixels".into()))?;
    Ok(ColorDecision {
        color: Srgba::new(rgb.red, rgb.green, rgb.blue, 255),
        source,
    })
}

/// The most dominant color, verbatim.
pub fn flood_color(colors: &[Srgb<u8>]) -> Option<Srgb<u8>> {
    colors.first().copied()
}

/// Averages the colors and nudges the result away from its own lightness:
/// dark averages are brightened, light ones darkened, by `L * 0.04`.
pub fn contrast_color(colors: &[Srgb<u8>]) -> Option<Srgb<u8>> {
    let average = average_color(colors)?;
    let lightness = lab_lightness(average);
    let amount = lightness * ADJUST_FACTOR;
    Some(if lightness < DARK_LIGHTNESS {
        brighten(average, amount)
    } else {
        darken(average, amount)
    })
}

/// Averages colors in linear RGB.
pub fn average_color(colors: &[Srgb<u8>]) -> Option<Srgb<u8>> {
    if colors.is_empty() {
        return None;
    }
    let (mut r, mut g, mut b) = (0.0f32, 0.0f32, 0.0f32);
    for color in colors {
        let linear: LinSrgb = color.into_format::<f32>().into_linear();
        r += linear.red;
        g += linear.green;
        b += linear.blue;
    }
    let n = colors.len() as f32;
    let average = Srgb::<f32>::from_linear(LinSrgb::new(r / n, g / n, b / n));
    Some(average.into_format())
}

/// CIE-Lab lightness (0-100) of a color.
pub fn lab_lightness(color: Srgb<u8>) -> f32 {
    let lab: Lab = color.into_format::<f32>().into_color();
    lab.l
}

/// Raises Lab lightness by `18 * amount`.
pub fn brighten(color: Srgb<u8>, amount: f32) -> Srgb<u8> {
    shift_lightness(color, LAB_KN * amount)
}

/// Lowers Lab lightness by `18 * amount`.
pub fn darken(color: Srgb<u8>, amount: f32) -> Srgb<u8> {
    shift_lightness(color, -LAB_KN * amount)
}

fn shift_lightness(color: Srgb<u8>, delta: f32) -> Srgb<u8> {
    let mut lab: Lab = color.into_format::<f32>().into_color();
    lab.l += delta;
    let shifted: Srgb = lab.into_color();
    shifted.clamp().into_format()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_lengths() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#FF0000"));
        assert!(is_hex_color("#ff000080"));
        assert!(!is_hex_color("#ff00"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#red"));
    }

    #[test]
    fn parse_hex_expands_short_form() {
        assert_eq!(parse_hex("fff"), Some(Srgba::new(255, 255, 255, 255)));
        assert_eq!(parse_hex("#1a2b3c"), Some(Srgba::new(0x1a, 0x2b, 0x3c, 255)));
        assert_eq!(parse_hex("ff000080"), Some(Srgba::new(255, 0, 0, 0x80)));
        assert_eq!(parse_hex("nothex"), None);
    }

    #[test]
    fn css_names_resolve() {
        assert_eq!(css_name_to_hex("red").as_deref(), Some("#ff0000"));
        assert_eq!(css_name_to_hex("RebeccaPurple").as_deref(), Some("#663399"));
        assert_eq!(css_name_to_hex("notacolor"), None);
    }

    #[test]
    fn canonical_color_prefers_hex() {
        assert_eq!(canonical_color_hex("abc").unwrap(), "abc");
        // "add" is valid hex, not a color name
        assert_eq!(canonical_color_hex("add").unwrap(), "add");
        assert_eq!(canonical_color_hex("red").unwrap(), "ff0000");
        assert_eq!(canonical_color_hex("FF00AA").unwrap(), "FF00AA");
    }

    #[test]
    fn canonical_color_rejects_unknown() {
        let err = canonical_color_hex("blurple").unwrap_err();
        assert!(err.to_string().contains("blurple"), "error should name the value: {err}");
    }

    #[test]
    fn flood_uses_first_color() {
        let colors = [Srgb::new(10, 20, 30), Srgb::new(200, 200, 200)];
        assert_eq!(flood_color(&colors), Some(Srgb::new(10, 20, 30)));
        assert_eq!(flood_color(&[]), None);
    }

    #[test]
    fn average_of_single_color_is_identity() {
        let c = Srgb::new(120, 60, 200);
        let avg = average_color(&[c, c]).unwrap();
        assert!(avg.red.abs_diff(c.red) <= 1, "red drifted: {avg:?}");
        assert!(avg.green.abs_diff(c.green) <= 1, "green drifted: {avg:?}");
        assert!(avg.blue.abs_diff(c.blue) <= 1, "blue drifted: {avg:?}");
    }

    #[test]
    fn average_is_linear_not_gamma() {
        let avg = average_color(&[Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)]).unwrap();
        // Linear-light midpoint sits well above the sRGB midpoint of 128.
        assert!(avg.red > 180, "expected linear average, got {avg:?}");
    }

    #[test]
    fn contrast_brightens_dark_colors() {
        let dark = Srgb::new(40, 20, 10);
        let result = contrast_color(&[dark]).unwrap();
        assert!(
            lab_lightness(result) > lab_lightness(dark),
            "dark average should be brightened"
        );
    }

    #[test]
    fn contrast_darkens_light_colors() {
        let light = Srgb::new(255, 230, 120);
        assert!(lab_lightness(light) >= DARK_LIGHTNESS);
        let result = contrast_color(&[light]).unwrap();
        assert!(
            lab_lightness(result) < lab_lightness(light),
            "light average should be darkened"
        );
    }

    #[test]
    fn contrast_shift_is_proportional_to_lightness() {
        // Grays stay in gamut, so the Lab shift survives the round trip.
        for (gray, factor) in [(60u8, 1.0 + 18.0 * 0.04), (230, 1.0 - 18.0 * 0.04)] {
            let c = Srgb::new(gray, gray, gray);
            let before = lab_lightness(average_color(&[c]).unwrap());
            let after = lab_lightness(contrast_color(&[c]).unwrap());
            let expected = before * factor;
            assert!(
                (after - expected).abs() < 0.5,
                "gray {gray}: L {before} -> {after}, expected {expected}"
            );
        }
    }

    #[test]
    fn contrast_threshold_is_lightness_80() {
        let below = Srgb::new(196, 196, 196);
        let above = Srgb::new(200, 200, 200);
        assert!(lab_lightness(below) < 80.0 && lab_lightness(above) > 80.0);

        // 79 * 1.72 is past white; 80.6 * 0.28 is a dark gray.
        assert_eq!(contrast_color(&[below]), Some(Srgb::new(255, 255, 255)));
        let darkened = contrast_color(&[above]).unwrap();
        assert!(
            (lab_lightness(darkened) - 80.6 * 0.28).abs() < 1.0,
            "got {darkened:?}"
        );
    }

    #[test]
    fn decision_hex_formatting() {
        assert_eq!(ColorDecision::fallback().hex(), "#ffffff");
        let translucent = ColorDecision::explicit(Srgba::new(255, 0, 0, 128));
        assert_eq!(translucent.hex(), "#ff000080");
        assert_eq!(translucent.rgba(), [255, 0, 0, 128]);
    }

    #[test]
    fn auto_color_style_param() {
        assert_eq!(AutoColorStyle::from_param(Some("flood")), AutoColorStyle::Flood);
        assert_eq!(AutoColorStyle::from_param(Some("contrast")), AutoColorStyle::Contrast);
        assert_eq!(AutoColorStyle::from_param(Some("anything")), AutoColorStyle::Contrast);
        assert_eq!(AutoColorStyle::from_param(None), AutoColorStyle::Contrast);
    }

    #[test]
    fn undecodable_glyph_falls_back_to_white() {
        let decision = resolve_color(None, b"definitely not an image", AutoColorStyle::Contrast);
        assert_eq!(decision, ColorDecision::fallback());
    }

    #[test]
    fn explicit_color_wins() {
        let red = Srgba::new(255, 0, 0, 255);
        let decision = resolve_color(Some(red), b"", AutoColorStyle::Flood);
        assert_eq!(decision.source, ColorSource::Explicit);
        assert_eq!(decision.color, red);
    }
}
