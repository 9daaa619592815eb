//! Error type shared by every stage of the icon pipeline.

use thiserror::Error;

/// Result alias using [`IconError`].
pub type Result<T> = std::result::Result<T, IconError>;

/// Errors produced while normalizing a request or generating an icon.
///
/// Only color extraction failures are recovered from (see
/// [`resolve_color`](crate::color::resolve_color)); every other variant aborts
/// the request.
#[derive(Debug, Error)]
pub enum IconError {
    /// A query parameter had the wrong shape or an unusable value.
    #[error("Invalid query parameter: {key}={value}. Expected {expected}.")]
    InvalidParameter {
        /// The offending query key.
        key: String,
        /// The offending value, as supplied.
        value: String,
        /// What a valid value looks like.
        expected: &'static str,
    },

    /// The emoji short name is not in the lookup table.
    #[error("Icon \"{name}\" not found")]
    NotFound {
        /// The requested short name.
        name: String,
    },

    /// The emoji short name exists but its record carries no codepoint.
    #[error("Icon \"{name}\" has no codepoint to resolve")]
    Unresolvable {
        /// The requested short name.
        name: String,
    },

    /// The upstream glyph could not be fetched.
    #[error("Failed to fetch glyph from {url}: {message}")]
    Fetch {
        /// The glyph URL that was requested.
        url: String,
        /// Transport or status description.
        message: String,
    },

    /// The fetched bytes are neither a raster image nor a parseable SVG.
    #[error("Failed to decode glyph image: {0}")]
    ImageDecode(String),

    /// Rasterization, compositing or PNG encoding failed.
    #[error("Failed to render icon: {0}")]
    Render(String),

    /// The emoji lookup table could not be parsed.
    #[error("Failed to load emoji table: {0}")]
    EmojiTable(#[from] serde_json::Error),
}

impl IconError {
    /// Builds an [`IconError::InvalidParameter`].
    pub fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }
}
