//! Conversion between literal emoji glyphs and their hex codepoint form.
//!
//! Glyph files on the CDN are named after the lowercase hex codepoints of the
//! emoji, joined with `-` for two-codepoint sequences (`1f44b-1f3fd`).

/// Returns true if `s` contains any character above U+00FF.
///
/// Such input is a literal glyph rather than a hex identifier and gets
/// redirected to its codepoint form.
pub fn contains_double_byte(s: &str) -> bool {
    s.chars().any(|c| u32::from(c) > 0xFF)
}

/// Encodes a literal glyph as hex codepoints.
///
/// Indexing is done on UTF-16 code units: inputs shorter than four units
/// yield the first codepoint alone, longer inputs yield the codepoints
/// starting at unit 0 and unit 2 joined by `-`. Sequences of three or more
/// codepoints are therefore truncated, which matches the CDN naming for the
/// common modifier pairs.
pub fn to_unicode(s: &str) -> String {
    let units: Vec<u16> = s.encode_utf16().collect();
    let Some(first) = code_point_at(&units, 0) else {
        return String::new();
    };
    if units.len() < 4 {
        return format!("{first:x}");
    }
    match code_point_at(&units, 2) {
        Some(second) => format!("{first:x}-{second:x}"),
        None => format!("{first:x}"),
    }
}

/// Converts `s` to hex codepoints if it is a literal glyph, otherwise
/// returns it unchanged.
pub fn ensure_unicode(s: &str) -> String {
    if contains_double_byte(s) {
        to_unicode(s)
    } else {
        s.to_string()
    }
}

/// Returns true if `s` looks like a dash-joined hex codepoint sequence
/// (`1f600`, `1F44B-1f3fd`).
pub fn is_hex_codepoint(s: &str) -> bool {
    !s.is_empty()
        && s.split('-').all(|part| {
            (1..=6).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_hexdigit())
        })
}

/// Reads the codepoint at a UTF-16 index, combining a surrogate pair when one
/// starts there. Lone surrogates are returned as their raw unit value.
fn code_point_at(units: &[u16], index: usize) -> Option<u32> {
    let high = *units.get(index)?;
    if (0xD800..0xDC00).contains(&high) {
        if let Some(&low) = units.get(index + 1) {
            if (0xDC00..0xE000).contains(&low) {
                let cp = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                return Some(cp);
            }
        }
    }
    Some(u32::from(high))
}
