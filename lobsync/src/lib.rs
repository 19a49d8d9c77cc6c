//! # lobsync
//!
//! Realtime limit order book reconciliation.
//!
//! A full book snapshot and an independent stream of incremental level diffs
//! are merged into one consistent, queryable book. Diffs that arrive before
//! the snapshot are buffered and replayed in order once it lands.
//!
//! ## Features
//!
//! - **Tolerant price keys** - levels match within a relative epsilon
//! - **Initialization gate** - bounded buffer of early diffs, replayed once
//! - **Reference-price reclassification** - crossed levels move sides atomically
//! - **Change notification** - synchronous listeners after every mutation
//! - **Live feed** - reconnecting JSON-RPC WebSocket stream plus REST snapshot
//!
//! ## Quick Start
//!
//! ```ignore
//! use lobsync::prelude::*;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(ReconciliationEngine::new());
//! engine.on_update(|engine| {
//!     println!("spread: {:?}", engine.spread());
//!     Ok(())
//! });
//!
//! let source = Arc::new(HttpSnapshotSource::new("https://api.bitflyer.com/v1", "BTC_JPY"));
//! let handler = FeedHandler::new(Arc::clone(&engine), source);
//! let mut stream = BoardStream::new(
//!     StreamConfig::default(),
//!     ChannelRouter::for_product("BTC_JPY"),
//!     handler,
//! );
//! stream.run().await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Price levels, level sets, price tolerance
//! - [`engine`] - Book, initialization gate, notifier, reconciliation engine
//! - [`feed`] - Message model, routing, snapshot source, reconnecting stream
//! - [`render`] - Terminal rendering of a book view
//! - [`config`] - Command-line and environment configuration

pub mod config;
pub mod prelude;
pub mod render;

/// Price levels and level sets.
pub mod core {
    pub use lobsync_core::*;
}

/// Reconciliation engine.
pub mod engine {
    pub use lobsync_engine::*;
}

/// Exchange feed collaborators.
pub mod feed {
    pub use lobsync_feed::*;
}

pub use lobsync_core::{PriceLevel, PriceLevelSet, Side};
pub use lobsync_engine::{BookSnapshot, BookView, DiffEvent, ReconciliationEngine};
pub use lobsync_feed::{BoardStream, FeedError};
