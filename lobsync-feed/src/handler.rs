//! Feed handler: turns routed events into engine calls.

use crate::error::FeedError;
use crate::router::FeedEvent;
use crate::snapshot::SnapshotSource;
use lobsync_engine::{DiffEvent, DiffOutcome, ReconciliationEngine};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Drives a [`ReconciliationEngine`] from feed events.
#[derive(Clone)]
pub struct FeedHandler {
    engine: Arc<ReconciliationEngine>,
    source: Arc<dyn SnapshotSource>,
}

impl FeedHandler {
    /// Creates a handler for `engine`, fetching snapshots from `source`.
    #[must_use]
    pub fn new(engine: Arc<ReconciliationEngine>, source: Arc<dyn SnapshotSource>) -> Self {
        Self { engine, source }
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<ReconciliationEngine> {
        &self.engine
    }

    /// Fetches a snapshot and applies it.
    ///
    /// # Errors
    /// Returns the snapshot source's error; the engine is left untouched.
    pub async fn initialize(&self) -> Result<(), FeedError> {
        let snapshot = self.source.fetch().await?;
        tracing::info!(
            "Snapshot fetched: {} bids, {} asks, mid {}",
            snapshot.bids.len(),
            snapshot.asks.len(),
            snapshot.reference_price
        );
        self.engine.apply_snapshot(snapshot);
        Ok(())
    }

    /// Runs [`initialize`](Self::initialize) on a new task.
    ///
    /// Diffs keep flowing to the engine, and are buffered, while it runs.
    #[must_use]
    pub fn spawn_snapshot(&self) -> JoinHandle<Result<(), FeedError>> {
        let handler = self.clone();
        tokio::spawn(async move { handler.initialize().await })
    }

    /// Hands a diff to the engine.
    pub fn apply(&self, diff: DiffEvent) -> DiffOutcome {
        self.engine.apply_diff(diff)
    }

    /// Handles one event inline, awaiting the snapshot on `InitTrigger`.
    ///
    /// # Errors
    /// Returns the snapshot source's error.
    pub async fn handle(&self, event: FeedEvent) -> Result<(), FeedError> {
        match event {
            FeedEvent::InitTrigger => self.initialize().await,
            FeedEvent::Diff(diff) => {
                self.apply(diff);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for FeedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedHandler")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
