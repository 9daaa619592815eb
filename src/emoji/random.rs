//! Curated pool of glyphs used when a request names no icon.

/// Hex codepoints drawn from uniformly at random.
pub(crate) const RANDOM_EMOJI: &[&str] = &[
    "1f600", "1f601", "1f602", "1f603", "1f604", "1f605", "1f606", "1f607",
    "1f608", "1f609", "1f60a", "1f60b", "1f60c", "1f60d", "1f60e", "1f60f",
    "1f610", "1f611", "1f612", "1f613", "1f614", "1f615", "1f616", "1f617",
    "1f618", "1f619", "1f61a", "1f61b", "1f61c", "1f61d", "1f61e", "1f61f",
    "1f620", "1f621", "1f622", "1f623", "1f624", "1f625", "1f626", "1f627",
    "1f628", "1f629", "1f62a", "1f62b", "1f62c", "1f62d", "1f62e", "1f62f",
    "1f630", "1f631", "1f632", "1f633", "1f634", "1f635", "1f636", "1f637",
    "1f400", "1f401", "1f402", "1f403", "1f404", "1f405", "1f406", "1f407",
    "1f408", "1f409", "1f40a", "1f40b", "1f40c", "1f40d", "1f40e", "1f40f",
    "1f410", "1f411", "1f412", "1f413", "1f414", "1f415", "1f416", "1f417",
    "1f418", "1f419", "1f41a", "1f41b", "1f41c", "1f41d", "1f41e", "1f41f",
    "1f420", "1f421", "1f422", "1f423", "1f424", "1f425", "1f426", "1f427",
    "1f428", "1f429", "1f42a", "1f42b", "1f42c", "1f42d", "1f42e", "1f42f",
    "1f430", "1f431", "1f432", "1f433", "1f434", "1f435", "1f436", "1f437",
    "1f438", "1f439", "1f43a", "1f43b", "1f43c", "1f680", "1f681", "1f682",
    "1f684", "1f3a8", "1f3b8", "1f3ae", "1f4a1", "1f4bb", "1f4da", "1f525",
    "1f308", "2b50", "26a1",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unicode::is_hex_codepoint;

    #[test]
    fn pool_entries_are_lowercase_hex() {
        assert!(RANDOM_EMOJI.len() > 100);
        for hex in RANDOM_EMOJI {
            assert!(is_hex_codepoint(hex), "{hex} is not a hex codepoint");
            assert_eq!(*hex, hex.to_lowercase());
        }
    }
}
