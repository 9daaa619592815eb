//! Ordered, multi-valued query string handling.
//!
//! A key may appear more than once (`?width=1&width=2`); scalar parameters
//! reject that shape while [`QueryParams::first`] tolerates it.

use crate::error::{IconError, Result};

const NUMERIC_EXPECTED: &str = "a single positive integer";

/// Query parameters in the order they were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses an `application/x-www-form-urlencoded` query string.
    pub fn parse(raw: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
            .map_err(|_| IconError::invalid("query", raw, "a URL-encoded query string"))?;
        Ok(Self { pairs })
    }

    /// Builds parameters from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns every value supplied for `key`.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first value for `key`, ignoring any repeats.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `key` is present at least once.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Parses `key` as a single non-negative integer.
    ///
    /// Absent keys yield `None`. Repeated keys and values that are not
    /// non-negative integers are rejected with the offending value named.
    pub fn numeric(&self, key: &str) -> Result<Option<u32>> {
        let values: Vec<&str> = self.values(key).collect();
        match values.as_slice() {
            [] => Ok(None),
            [value] => parse_non_negative(value)
                .map(Some)
                .ok_or_else(|| IconError::invalid(key, *value, NUMERIC_EXPECTED)),
            many => Err(IconError::invalid(key, many.join(","), NUMERIC_EXPECTED)),
        }
    }

    /// Replaces `key` with a single value, keeping the position of its first
    /// occurrence. Appends when the key is absent.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = 0;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Removes every occurrence of `key`.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Serializes back to a query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        // Encoding a sequence of string pairs cannot fail.
        serde_urlencoded::to_string(&self.pairs).unwrap_or_default()
    }
}

/// Accepts integral numerals such as `12`, `012` and `12.0`.
fn parse_non_negative(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return Some(n);
    }
    let float: f64 = trimmed.parse().ok()?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= f64::from(u32::MAX) {
        Some(float as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order_and_repeats() {
        let q = QueryParams::parse("icon=1f600&width=10&width=20&kind=favicon").unwrap();
        assert_eq!(q.first("icon"), Some("1f600"));
        assert_eq!(q.values("width").collect::<Vec<_>>(), vec!["10", "20"]);
        assert_eq!(q.first("missing"), None);
    }

    #[test]
    fn first_outlives_key() {
        let q = QueryParams::parse("icon=1f600&icon=1f601").unwrap();
        let icon = {
            let key = String::from("icon");
            q.first(&key)
        };
        assert_eq!(icon, Some("1f600"));
    }

    #[test]
    fn numeric_absent_is_none() {
        let q = QueryParams::parse("icon=1f600").unwrap();
        assert_eq!(q.numeric("width").unwrap(), None);
    }

    #[test]
    fn numeric_accepts_integers() {
        let q = QueryParams::parse("width=48&height=12.0&padding=0").unwrap();
        assert_eq!(q.numeric("width").unwrap(), Some(48));
        assert_eq!(q.numeric("height").unwrap(), Some(12));
        assert_eq!(q.numeric("padding").unwrap(), Some(0));
    }

    #[test]
    fn numeric_rejects_arrays() {
        let q = QueryParams::parse("width=1&width=2").unwrap();
        let err = q.numeric("width").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid query parameter: width=1,2. Expected a single positive integer."
        );
    }

    #[test]
    fn numeric_rejects_negative_and_fractional() {
        for raw in ["padding=-1", "padding=1.5", "padding=abc", "padding="] {
            let q = QueryParams::parse(raw).unwrap();
            assert!(
                matches!(q.numeric("padding"), Err(IconError::InvalidParameter { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn set_replaces_in_place_and_appends() {
        let mut q = QueryParams::parse("icon=%F0%9F%98%80&kind=icon&width=64").unwrap();
        q.set("icon", "1f600");
        q.remove("kind");
        assert_eq!(q.to_query_string(), "icon=1f600&width=64");

        q.set("color_hex", "ff0000");
        assert_eq!(q.to_query_string(), "icon=1f600&width=64&color_hex=ff0000");
    }

    #[test]
    fn set_collapses_repeats() {
        let mut q = QueryParams::parse("icon=a&width=1&icon=b").unwrap();
        q.set("icon", "c");
        assert_eq!(q.to_query_string(), "icon=c&width=1");
    }
}
