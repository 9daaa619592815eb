//! Server configuration.
//!
//! With the `clap` feature, [`Config`] parses from command-line flags with
//! environment variable fallbacks. It also deserializes from JSON for
//! embedding the service in a larger application.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default glyph CDN root.
pub const DEFAULT_CDN_BASE: &str = "https://twemoji.maxcdn.com/v/latest/svg";

/// Runtime settings for the icon server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "clap", derive(clap::Parser))]
#[cfg_attr(feature = "clap", command(name = "emoji-icon-server", version, about))]
pub struct Config {
    /// Address to bind.
    #[cfg_attr(feature = "clap", arg(long, env = "EMOJI_ICON_HOST", default_value = "0.0.0.0"))]
    pub host: String,

    /// Port to bind.
    #[cfg_attr(feature = "clap", arg(long, env = "EMOJI_ICON_PORT", default_value_t = 3000))]
    pub port: u16,

    /// Root URL glyphs are fetched from as `<cdn-base>/<hex>.svg`.
    #[cfg_attr(
        feature = "clap",
        arg(long, env = "EMOJI_ICON_CDN_BASE", default_value = DEFAULT_CDN_BASE)
    )]
    pub cdn_base: String,

    /// Upstream fetch timeout in seconds.
    #[cfg_attr(
        feature = "clap",
        arg(long, env = "EMOJI_ICON_FETCH_TIMEOUT", default_value_t = 10)
    )]
    pub fetch_timeout_secs: u64,

    /// JSON emoji table to use instead of the bundled one.
    #[cfg_attr(feature = "clap", arg(long, env = "EMOJI_ICON_TABLE"))]
    pub emoji_table: Option<PathBuf>,

    /// Largest accepted width or height.
    #[cfg_attr(
        feature = "clap",
        arg(long, env = "EMOJI_ICON_MAX_DIMENSION", default_value_t = 4096)
    )]
    pub max_dimension: u32,

    /// Serve glyphs bundled with the `twemoji` feature before trying the CDN.
    #[cfg_attr(feature = "clap", arg(long, env = "EMOJI_ICON_EMBEDDED_GLYPHS"))]
    pub embedded_glyphs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cdn_base: DEFAULT_CDN_BASE.to_string(),
            fetch_timeout_secs: 10,
            emoji_table: None,
            max_dimension: 4096,
            embedded_glyphs: false,
        }
    }
}

impl Config {
    /// `host:port`, for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upstream fetch timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_dimension, 4096);
    }

    #[test]
    fn json_fills_missing_fields() {
        let config: Config =
            serde_json::from_str(r#"{"port": 8080, "cdnBase": "http://cdn"}"#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cdn_base, "http://cdn");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[cfg(feature = "clap")]
    #[test]
    fn flags_match_defaults() {
        use clap::Parser;

        let parsed = Config::try_parse_from(["emoji-icon-server"]).unwrap();
        assert_eq!(parsed, Config::default());

        let parsed = Config::try_parse_from([
            "emoji-icon-server",
            "--port",
            "9000",
            "--max-dimension",
            "512",
            "--embedded-glyphs",
        ])
        .unwrap();
        assert_eq!(parsed.port, 9000);
        assert_eq!(parsed.max_dimension, 512);
        assert!(parsed.embedded_glyphs);
    }
}
