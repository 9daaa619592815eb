//! HTTP surface: routing, the icon handler and error responses.
//!
//! # Routes
//!
//! - `GET /api/{kind}` - icon with the preset taken from the path
//! - `GET /api`, `GET /` - icon with the preset taken from the `kind` query
//! - `GET /health` - liveness check

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use tracing::{error, info, instrument, warn};

use crate::color::resolve_color;
use crate::config::Config;
use crate::emoji::{EmojiTable, IconResolver};
use crate::error::{IconError, Result};
use crate::fetch::GlyphFetcher;
use crate::query::QueryParams;
use crate::render::{CompositeSpec, render_icon};
use crate::request::{Normalized, normalize};

const PNG_CONTENT_TYPE: &str = "image/png";
const CACHE_PUBLIC: &str = "public, max-age=86400";
const CACHE_NONE: &str = "no-store";

// ============================================================================
// AppState
// ============================================================================

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    resolver: IconResolver,
    fetcher: GlyphFetcher,
    max_dimension: u32,
}

impl AppState {
    /// Builds state from explicit parts.
    pub fn new(resolver: IconResolver, fetcher: GlyphFetcher, max_dimension: u32) -> Self {
        Self {
            resolver,
            fetcher,
            max_dimension,
        }
    }

    /// Builds state from configuration and a loaded emoji table.
    pub fn from_config(config: &Config, table: EmojiTable) -> reqwest::Result<Self> {
        let resolver = IconResolver::new(Arc::new(table), config.cdn_base.clone());
        let fetcher =
            GlyphFetcher::new(config.fetch_timeout())?.with_embedded(config.embedded_glyphs);
        Ok(Self::new(resolver, fetcher, config.max_dimension))
    }
}

/// The application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(icon))
        .route("/api", get(icon))
        .route("/api/{kind}", get(icon_for_kind))
        .route("/health", get(health))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

async fn icon(State(state): State<AppState>, uri: Uri) -> Result<Response> {
    serve_icon(&state, None, &uri).await
}

async fn icon_for_kind(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    uri: Uri,
) -> Result<Response> {
    serve_icon(&state, Some(&kind), &uri).await
}

/// Normalizes the query, then either redirects to its canonical form or
/// renders the icon.
#[instrument(skip_all, fields(path = %uri.path(), query = uri.query().unwrap_or("")))]
async fn serve_icon(state: &AppState, kind: Option<&str>, uri: &Uri) -> Result<Response> {
    let query = QueryParams::parse(uri.query().unwrap_or(""))?;

    let request = match normalize(&query, kind, state.max_dimension)? {
        Normalized::Redirect(canonical) => {
            return Ok(Redirect::temporary(&location(uri.path(), &canonical)).into_response());
        }
        Normalized::Render(request) => request,
    };

    let icon = state.resolver.resolve(&request.identifier)?;
    let glyph = state.fetcher.fetch(&icon).await?;

    let png = tokio::task::spawn_blocking(move || {
        let background = resolve_color(request.color, &glyph, request.auto_color_style);
        let spec = CompositeSpec::for_request(&request, background);
        info!(
            width = request.width,
            height = request.height,
            padding = request.padding,
            color = %background.hex(),
            "rendering icon"
        );
        render_icon(&glyph, &spec)
    })
    .await
    .map_err(|e| IconError::Render(e.to_string()))??;

    let cache_control = if icon.random { CACHE_NONE } else { CACHE_PUBLIC };
    Ok((
        [
            (header::CONTENT_TYPE, PNG_CONTENT_TYPE.to_string()),
            (header::CONTENT_LENGTH, png.len().to_string()),
            (header::CACHE_CONTROL, cache_control.to_string()),
        ],
        png,
    )
        .into_response())
}

fn location(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

// ============================================================================
// Error responses
// ============================================================================

impl IconError {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unresolvable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Fetch { .. } | Self::ImageDecode(_) => StatusCode::BAD_GATEWAY,
            Self::Render(_) | Self::EmojiTable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IconError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "icon request failed");
        } else {
            warn!(error = %self, %status, "icon request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
