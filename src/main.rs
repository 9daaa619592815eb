//! `emoji-icon-server`: serves emoji icon PNGs.
//!
//! Logging is configured through `RUST_LOG` (default `info`). See
//! [`Config`] for the remaining flags and environment variables.

use anyhow::Context;
use clap::Parser;
use emoji_icon_renderer::{AppState, Config, EmojiTable, router};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let table = match &config.emoji_table {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read emoji table {}", path.display()))?;
            EmojiTable::from_json(&json)
                .with_context(|| format!("Failed to parse emoji table {}", path.display()))?
        }
        None => EmojiTable::bundled().context("Failed to load bundled emoji table")?,
    };
    info!(names = table.len(), "loaded emoji table");

    if config.embedded_glyphs && !cfg!(feature = "twemoji") {
        warn!("--embedded-glyphs has no effect without the twemoji feature");
    }

    let state = AppState::from_config(&config, table).context("Failed to build HTTP client")?;
    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address {bind_addr}"))?;
    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        address = %listener.local_addr()?,
        cdn = %config.cdn_base,
        "Server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Axum server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
