//! Realtime order book for one bitFlyer product.
//!
//! Run with: `cargo run --release -- --product-code BTC_JPY`

use anyhow::{Context, Result};
use clap::Parser;
use lobsync::config::Config;
use lobsync::render::{CLEAR_SCREEN, render_board};
use lobsync_engine::{BookView, ReconciliationEngine};
use lobsync_feed::{BoardStream, ChannelRouter, FeedHandler, HttpSnapshotSource};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_dir: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let path = dir.join("lobsync.log");
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn draw(view: &BookView) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{CLEAR_SCREEN}{}", render_board(view))?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::parse();
    init_tracing(config.log_dir.as_deref())?;

    tracing::info!(
        "Starting lobsync for {} ({} / {})",
        config.product_code,
        config.api_base_url,
        config.rpc_url
    );

    let engine = Arc::new(ReconciliationEngine::with_config(config.engine_config()));

    let depth = config.depth;
    engine.on_update(move |engine| {
        draw(&engine.get_book(depth))?;
        Ok(())
    });
    draw(&engine.get_book(depth))?;

    let source = HttpSnapshotSource::with_timeout(
        &config.api_base_url,
        config.product_code.as_str(),
        config.snapshot_timeout(),
    )?;
    let handler = FeedHandler::new(Arc::clone(&engine), Arc::new(source));
    let mut stream = BoardStream::new(
        config.stream_config(),
        ChannelRouter::for_product(config.product_code.as_str()),
        handler,
    );

    tokio::select! {
        result = stream.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    let stats = engine.stats();
    tracing::info!(
        "Applied {} snapshots and {} diffs ({} buffered, {} dropped)",
        stats.snapshots_applied,
        stats.diffs_applied,
        stats.diffs_buffered,
        stats.diffs_dropped
    );
    Ok(())
}
