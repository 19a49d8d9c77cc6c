//! Prelude module for convenient imports.
//!
//! ```ignore
//! use lobsync::prelude::*;
//! ```

// Core types
pub use lobsync_core::{PriceLevel, PriceLevelSet, Side, SortOrder, approx_eq, is_zero};

// Engine types
pub use lobsync_engine::{
    BookSnapshot, BookView, DiffEvent, DiffOutcome, EngineConfig, EngineState, EngineStats,
    GateConfig, ListenerError, ListenerId, OverflowPolicy, ReconciliationEngine,
};

// Feed types
pub use lobsync_feed::{
    BoardStream, ChannelRouter, FeedError, FeedEvent, FeedHandler, HttpSnapshotSource,
    ReconnectConfig, SnapshotSource, StreamConfig,
};
