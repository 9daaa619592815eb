//! Emoji identification: name lookup table and glyph URL resolution.
//!
//! # Resolution order
//!
//! 1. Hex codepoints are used directly (literal glyphs are converted first).
//! 2. Short names are looked up in the [`EmojiTable`]; the color variant
//!    (`c`) is preferred over the base codepoint (`b`).
//! 3. With neither, a glyph is picked at random from a curated pool.

mod random;

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{IconError, Result};
use crate::request::IconIdentifier;
use crate::unicode::ensure_unicode;

pub(crate) use random::RANDOM_EMOJI;

/// The table shipped with the crate.
const BUNDLED_TABLE: &str = include_str!("../../data/emoji.json");

// ============================================================================
// EmojiTable
// ============================================================================

/// Codepoints recorded for one emoji short name.
///
/// ```json
/// { "b": "1f44d", "c": "1f44d-1f3fd" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiRecord {
    /// Base codepoint(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,

    /// Color variant codepoint(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<String>,
}

impl EmojiRecord {
    /// The codepoints to use: the color variant if present, else the base.
    pub fn preferred(&self) -> Option<&str> {
        self.c
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.b.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Read-only mapping from emoji short names to codepoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmojiTable {
    entries: HashMap<String, EmojiRecord>,
}

impl EmojiTable {
    /// Parses a table from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The table bundled with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_TABLE)
    }

    /// Looks up a short name.
    pub fn get(&self, name: &str) -> Option<&EmojiRecord> {
        self.entries.get(name)
    }

    /// Number of names in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no names.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// IconResolver
// ============================================================================

/// A glyph chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    /// Fully-qualified glyph URL.
    pub source_url: String,
    /// Lowercase hex codepoints used to build the URL.
    pub canonical_hex: String,
    /// True when the glyph was picked at random.
    pub random: bool,
}

/// Maps identifiers to glyph URLs on the CDN.
#[derive(Debug, Clone)]
pub struct IconResolver {
    table: Arc<EmojiTable>,
    cdn_base: String,
}

impl IconResolver {
    /// Creates a resolver serving glyphs from `<cdn_base>/<hex>.svg`.
    pub fn new(table: Arc<EmojiTable>, cdn_base: impl Into<String>) -> Self {
        Self {
            table,
            cdn_base: cdn_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves an identifier, drawing from the thread-local RNG for
    /// [`IconIdentifier::Random`].
    pub fn resolve(&self, identifier: &IconIdentifier) -> Result<ResolvedIcon> {
        self.resolve_with_rng(identifier, &mut rand::thread_rng())
    }

    /// Resolves an identifier using the given RNG for random picks.
    pub fn resolve_with_rng<R: Rng + ?Sized>(
        &self,
        identifier: &IconIdentifier,
        rng: &mut R,
    ) -> Result<ResolvedIcon> {
        match identifier {
            // Names such as `bee` or `100` also look like hex codepoints.
            IconIdentifier::Hex(hex) if self.table.get(hex).is_some() => self.resolve_name(hex),
            IconIdentifier::Hex(hex) => Ok(self.resolve_hex(hex)),
            IconIdentifier::Name(name) => self.resolve_name(name),
            IconIdentifier::Random => Ok(self.resolve_random(rng)),
        }
    }

    /// Builds the glyph URL for hex codepoints (or a literal glyph).
    pub fn resolve_hex(&self, hex: &str) -> ResolvedIcon {
        let canonical_hex = ensure_unicode(hex).to_lowercase();
        let source_url = glyph_url(&self.cdn_base, &canonical_hex);
        info!(icon = hex, unicode = %canonical_hex, url = %source_url, "using emoji");
        ResolvedIcon {
            source_url,
            canonical_hex,
            random: false,
        }
    }

    /// Looks up a short name and resolves its preferred codepoints.
    pub fn resolve_name(&self, name: &str) -> Result<ResolvedIcon> {
        let record = self
            .table
            .get(name)
            .or_else(|| self.table.get(&name.to_lowercase()))
            .ok_or_else(|| IconError::NotFound {
                name: name.to_string(),
            })?;
        let hex = record.preferred().ok_or_else(|| IconError::Unresolvable {
            name: name.to_string(),
        })?;
        Ok(self.resolve_hex(hex))
    }

    /// Picks a glyph uniformly from the curated pool.
    pub fn resolve_random<R: Rng + ?Sized>(&self, rng: &mut R) -> ResolvedIcon {
        let hex = RANDOM_EMOJI.choose(rng).copied().unwrap_or("1f600");
        ResolvedIcon {
            random: true,
            ..self.resolve_hex(hex)
        }
    }
}

/// `<base>/<lowercase-hex>.svg`
pub fn glyph_url(cdn_base: &str, hex: &str) -> String {
    format!("{}/{}.svg", cdn_base.trim_end_matches('/'), hex.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const CDN: &str = "https://cdn.example/v/latest/svg";

    fn resolver() -> IconResolver {
        let table = EmojiTable::from_json(
            r#"{
                "smile": { "b": "1f604" },
                "bee": { "b": "1f41d" },
                "wave_tone2": { "b": "1f44b", "c": "1f44b-1f3fc" },
                "broken": {}
            }"#,
        )
        .unwrap();
        IconResolver::new(Arc::new(table), format!("{CDN}/"))
    }

    #[test]
    fn bundled_table_loads() {
        let table = EmojiTable::bundled().unwrap();
        assert!(table.len() > 100);
        assert_eq!(table.get("duck").and_then(EmojiRecord::preferred), Some("1f986"));
    }

    #[test]
    fn hex_builds_lowercase_url() {
        let icon = resolver().resolve_hex("1F600");
        assert_eq!(icon.source_url, format!("{CDN}/1f600.svg"));
        assert_eq!(icon.canonical_hex, "1f600");
        assert!(!icon.random);
    }

    #[test]
    fn hex_shaped_name_uses_table() {
        let resolver = resolver();
        let icon = resolver.resolve(&IconIdentifier::Hex("bee".into())).unwrap();
        assert_eq!(icon.canonical_hex, "1f41d");
        assert_eq!(icon.source_url, format!("{CDN}/1f41d.svg"));

        let icon = resolver.resolve(&IconIdentifier::Hex("1f600".into())).unwrap();
        assert_eq!(icon.canonical_hex, "1f600");
    }

    #[test]
    fn literal_glyph_is_converted() {
        let icon = resolver().resolve_hex("🦆");
        assert_eq!(icon.canonical_hex, "1f986");
    }

    #[test]
    fn name_prefers_color_variant() {
        let icon = resolver().resolve_name("wave_tone2").unwrap();
        assert_eq!(icon.canonical_hex, "1f44b-1f3fc");

        let icon = resolver().resolve_name("smile").unwrap();
        assert_eq!(icon.source_url, format!("{CDN}/1f604.svg"));
    }

    #[test]
    fn unknown_name_is_not_found() {
        let err = resolver().resolve_name("nope").unwrap_err();
        assert!(matches!(err, IconError::NotFound { .. }), "got {err:?}");
        assert_eq!(err.to_string(), "Icon \"nope\" not found");
    }

    #[test]
    fn empty_record_is_unresolvable() {
        let err = resolver().resolve_name("broken").unwrap_err();
        assert!(matches!(err, IconError::Unresolvable { .. }), "got {err:?}");
    }

    #[test]
    fn random_comes_from_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let icon = resolver()
            .resolve_with_rng(&IconIdentifier::Random, &mut rng)
            .unwrap();
        assert!(icon.random);
        assert!(RANDOM_EMOJI.contains(&icon.canonical_hex.as_str()));
    }
}
