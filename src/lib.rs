//! emoji-icon-renderer: on-demand emoji icon PNGs over HTTP
//!
//! This crate turns a query such as `?icon=1f600&kind=favicon` into a PNG:
//! the emoji glyph is fetched from a CDN, a background is derived from its
//! dominant colors (or taken from `color_hex`), and the glyph is composited
//! over a padded canvas of the requested size.
//!
//! # Example
//!
//! ```
//! use emoji_icon_renderer::{Normalized, QueryParams, normalize};
//!
//! let query = QueryParams::parse("icon=1f600&kind=favicon").unwrap();
//! let Normalized::Render(request) = normalize(&query, None, 4096).unwrap() else {
//!     panic!("canonical query should render");
//! };
//! assert_eq!((request.width, request.height), (48, 48));
//!
//! // Literal glyphs and color names redirect to their canonical form.
//! let query = QueryParams::parse("color=red&kind=icon").unwrap();
//! assert_eq!(
//!     normalize(&query, None, 4096).unwrap(),
//!     Normalized::Redirect("color_hex=ff0000".into())
//! );
//! ```
//!
//! # Serving
//!
//! ```no_run
//! use emoji_icon_renderer::{AppState, Config, EmojiTable, router};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let state = AppState::from_config(&config, EmojiTable::bundled()?)?;
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, router(state)).await?;
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod config;
pub mod emoji;
pub mod error;
pub mod fetch;
pub mod query;
pub mod render;
pub mod request;
pub mod server;
pub mod unicode;

pub use color::{AutoColorStyle, ColorDecision, ColorSource, resolve_color};
pub use config::Config;
pub use emoji::{EmojiRecord, EmojiTable, IconResolver, ResolvedIcon};
pub use error::{IconError, Result};
pub use fetch::GlyphFetcher;
pub use query::QueryParams;
pub use render::{CompositeSpec, render_icon};
pub use request::{IconIdentifier, IconRequest, Normalized, SizePreset, normalize};
pub use server::{AppState, router};
