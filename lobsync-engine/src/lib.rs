//! # lobsync Engine
//!
//! Reconciliation engine for a single-instrument price-level order book.
//!
//! This crate provides:
//! - Snapshot and diff application under one exclusive lock
//! - An initialization gate that buffers diffs until the first snapshot
//! - Reference-price reclassification of crossed levels
//! - Consistent top-N projections and a synchronous change notifier

pub mod book;
pub mod engine;
pub mod error;
pub mod gate;
pub mod notifier;

pub use book::{Book, BookSnapshot, BookView, DiffEvent};
pub use engine::{DiffOutcome, EngineConfig, EngineState, EngineStats, ReconciliationEngine};
pub use error::ListenerError;
pub use gate::{Admission, GateConfig, InitializationGate, OverflowPolicy};
pub use notifier::{ChangeNotifier, ListenerId};
