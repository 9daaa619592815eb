//! Upstream glyph retrieval.
//!
//! Glyphs are downloaded from the CDN with a bounded timeout. With the
//! `twemoji` feature and embedded glyphs enabled, codepoints bundled in
//! `twemoji-assets` are served from memory and only misses reach the network.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::emoji::ResolvedIcon;
use crate::error::{IconError, Result};

/// Fetches glyph bytes for resolved icons.
#[derive(Debug, Clone)]
pub struct GlyphFetcher {
    client: Client,
    embedded: bool,
}

impl GlyphFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            embedded: false,
        })
    }

    /// Serves glyphs from the bundled Twemoji set when available.
    ///
    /// Has no effect unless the `twemoji` feature is enabled.
    pub fn with_embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    /// Returns the glyph bytes for `icon`.
    pub async fn fetch(&self, icon: &ResolvedIcon) -> Result<Vec<u8>> {
        if self.embedded {
            if let Some(svg) = embedded_glyph(&icon.canonical_hex) {
                debug!(unicode = %icon.canonical_hex, "using embedded glyph");
                return Ok(svg.as_bytes().to_vec());
            }
        }
        self.fetch_url(&icon.source_url).await
    }

    /// Downloads `url`, treating any non-success status as a failure.
    pub async fn fetch_url(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_error = |message: String| IconError::Fetch {
            url: url.to_string(),
            message,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fetch_error(format!("upstream returned {status}")));
        }

        let bytes = resp.bytes().await.map_err(|e| fetch_error(e.to_string()))?;
        debug!(url, len = bytes.len(), "fetched glyph");
        Ok(bytes.to_vec())
    }
}

/// Looks up dash-separated hex codepoints in the bundled Twemoji set.
#[cfg(feature = "twemoji")]
pub fn embedded_glyph(hex: &str) -> Option<&'static str> {
    use twemoji_assets::svg::SvgTwemojiAsset;

    let emoji = hex
        .split('-')
        .map(|part| u32::from_str_radix(part, 16).ok().and_then(char::from_u32))
        .collect::<Option<String>>()?;
    let asset = SvgTwemojiAsset::from_emoji(&emoji)?;
    Some(asset.as_ref())
}

#[cfg(not(feature = "twemoji"))]
pub fn embedded_glyph(_hex: &str) -> Option<&'static str> {
    None
}
