//! Reconciliation engine: the authoritative, lock-protected book.

use crate::book::{Book, BookSnapshot, BookView, DiffEvent};
use crate::error::ListenerError;
use crate::gate::{Admission, GateConfig, InitializationGate};
use crate::notifier::{ChangeNotifier, ListenerId};
use lobsync_core::PriceLevel;
use parking_lot::RwLock;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting for the first snapshot; diffs are buffered.
    Uninitialized,
    /// Snapshot applied; diffs are applied as they arrive.
    Initialized,
}

/// What happened to a diff passed to [`ReconciliationEngine::apply_diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Applied to the book and listeners notified.
    Applied,
    /// Buffered until the snapshot arrives.
    Buffered {
        /// Buffer length after the push.
        pending: usize,
    },
    /// Discarded because the pending buffer was full.
    Dropped,
}

/// Counters describing engine activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Snapshots applied.
    pub snapshots_applied: u64,
    /// Diffs applied, replayed diffs included.
    pub diffs_applied: u64,
    /// Diffs placed in the pending buffer.
    pub diffs_buffered: u64,
    /// Diffs lost to pending-buffer overflow.
    pub diffs_dropped: u64,
    /// Levels moved between sides by reference-price updates.
    pub levels_reclassified: u64,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Pending-diff buffer settings.
    pub gate: GateConfig,
    /// Pre-allocated levels per side.
    pub level_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            level_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Sets the pending-diff buffer settings.
    #[must_use]
    pub fn gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }

    /// Sets the pre-allocated levels per side.
    #[must_use]
    pub fn level_capacity(mut self, capacity: usize) -> Self {
        self.level_capacity = capacity;
        self
    }
}

struct EngineInner {
    book: Book,
    gate: InitializationGate,
    stats: EngineStats,
}

impl EngineInner {
    fn apply(&mut self, diff: &DiffEvent) {
        let moved = self.book.apply_diff(diff);
        self.stats.diffs_applied += 1;
        self.stats.levels_reclassified += moved as u64;
    }
}

/// Owns the book, the initialization gate and the listener registry.
///
/// Every mutation (snapshot, buffered-diff replay, live diff, spread
/// recompute) runs under one write lock, so readers never observe a
/// partially applied diff and concurrent callers serialize. Listeners run
/// after the lock is released and may call [`get_book`](Self::get_book).
pub struct ReconciliationEngine {
    inner: RwLock<EngineInner>,
    notifier: ChangeNotifier<ReconciliationEngine>,
}

impl ReconciliationEngine {
    /// Creates an uninitialized engine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an uninitialized engine.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            inner: RwLock::new(EngineInner {
                book: Book::with_capacity(config.level_capacity),
                gate: InitializationGate::new(config.gate),
                stats: EngineStats::default(),
            }),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Replaces the book with a full snapshot and replays buffered diffs.
    ///
    /// Replacement, replay in arrival order and the spread recompute happen
    /// under one lock. Listeners are notified once for the whole call. A
    /// second snapshot re-runs the same path and replaces the book again.
    pub fn apply_snapshot(&self, snapshot: BookSnapshot) {
        {
            let mut inner = self.inner.write();
            let reference_price = snapshot.reference_price;
            inner.book.replace(snapshot);

            let pending = inner.gate.open();
            let replayed = pending.len();
            for diff in &pending {
                inner.apply(diff);
            }

            inner.book.recompute_spread();
            inner.stats.snapshots_applied += 1;

            tracing::debug!(
                "Snapshot applied: {} bids, {} asks, reference {}, replayed {} diffs",
                inner.book.bids().len(),
                inner.book.asks().len(),
                reference_price,
                replayed
            );
        }

        self.notifier.notify(self);
    }

    /// Applies a diff, or buffers it if no snapshot has landed yet.
    ///
    /// When initialized, reclassification and level application run as one
    /// atomic unit, then the spread is recomputed and listeners notified.
    pub fn apply_diff(&self, diff: DiffEvent) -> DiffOutcome {
        {
            let mut inner = self.inner.write();

            match inner.gate.admit(diff) {
                Admission::Pass(diff) => {
                    inner.apply(&diff);
                    inner.book.recompute_spread();
                }
                Admission::Held { pending } => {
                    inner.stats.diffs_buffered += 1;
                    return DiffOutcome::Buffered { pending };
                }
                Admission::Evicted { pending } => {
                    inner.stats.diffs_buffered += 1;
                    inner.stats.diffs_dropped += 1;
                    tracing::warn!(
                        "Pending diff buffer full ({} of {}), evicted oldest diff",
                        pending,
                        inner.gate.config().max_pending
                    );
                    return DiffOutcome::Buffered { pending };
                }
                Admission::Rejected => {
                    inner.stats.diffs_dropped += 1;
                    tracing::warn!(
                        "Pending diff buffer full ({} of {}), dropped incoming diff",
                        inner.gate.pending_len(),
                        inner.gate.config().max_pending
                    );
                    return DiffOutcome::Dropped;
                }
            }
        }

        self.notifier.notify(self);
        DiffOutcome::Applied
    }

    /// Returns a consistent projection of the top `depth` levels per side.
    ///
    /// Before initialization this is an empty view with no reference price
    /// or spread.
    #[must_use]
    pub fn get_book(&self, depth: usize) -> BookView {
        let inner = self.inner.read();
        if !inner.gate.is_open() {
            return BookView::empty();
        }
        inner.book.view(depth, true)
    }

    /// Registers a listener invoked after every applied snapshot or diff.
    pub fn on_update<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ReconciliationEngine) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.notifier.register(listener)
    }

    /// Unregisters a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.notifier.remove(id)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        if self.inner.read().gate.is_open() {
            EngineState::Initialized
        } else {
            EngineState::Uninitialized
        }
    }

    /// Returns true once a snapshot has been applied.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state() == EngineState::Initialized
    }

    /// Returns the number of buffered diffs.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.read().gate.pending_len()
    }

    /// Returns the best bid.
    #[must_use]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.inner.read().book.best_bid()
    }

    /// Returns the best ask.
    #[must_use]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.inner.read().book.best_ask()
    }

    /// Returns the current spread.
    #[must_use]
    pub fn spread(&self) -> Option<f64> {
        self.inner.read().book.spread()
    }

    /// Returns the current reference price.
    #[must_use]
    pub fn reference_price(&self) -> Option<f64> {
        self.inner.read().book.reference_price()
    }

    /// Returns activity counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.inner.read().stats
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ReconciliationEngine")
            .field("initialized", &inner.gate.is_open())
            .field("pending", &inner.gate.pending_len())
            .field("bids", &inner.book.bids().len())
            .field("asks", &inner.book.asks().len())
            .field("sequence", &inner.book.sequence())
            .field("listeners", &self.notifier.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::OverflowPolicy;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lv(price: f64, size: f64) -> PriceLevel {
        PriceLevel::new(price, size)
    }

    fn prices(levels: &[PriceLevel]) -> Vec<f64> {
        levels.iter().map(|l| l.price).collect()
    }

    fn snapshot(bids: &[f64], asks: &[f64], reference_price: f64) -> BookSnapshot {
        BookSnapshot {
            bids: bids.iter().map(|p| lv(*p, 1.0)).collect(),
            asks: asks.iter().map(|p| lv(*p, 1.0)).collect(),
            reference_price,
        }
    }

    #[test]
    fn test_engine_new_is_uninitialized() {
        let engine = ReconciliationEngine::new();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(!engine.is_initialized());
        assert_eq!(engine.get_book(10), BookView::empty());
    }

    #[test]
    fn test_diffs_before_snapshot_are_buffered() {
        let engine = ReconciliationEngine::new();

        let outcome = engine.apply_diff(DiffEvent::levels(vec![lv(90.0, 1.0)], vec![]));
        assert_eq!(outcome, DiffOutcome::Buffered { pending: 1 });

        let outcome = engine.apply_diff(DiffEvent::reference(96.0));
        assert_eq!(outcome, DiffOutcome::Buffered { pending: 2 });

        let view = engine.get_book(10);
        assert!(view.bids.is_empty());
        assert!(view.asks.is_empty());
        assert!(view.reference_price.is_none());
        assert!(view.spread.is_none());
        assert_eq!(engine.pending_len(), 2);
    }

    #[test]
    fn test_snapshot_replays_buffer_in_order() {
        let engine = ReconciliationEngine::new();

        engine.apply_diff(DiffEvent::levels(vec![lv(91.0, 1.0)], vec![lv(101.0, 1.0)]));
        engine.apply_diff(DiffEvent::levels(vec![lv(91.0, 2.0)], vec![lv(101.0, 0.0)]));
        engine.apply_diff(DiffEvent::levels(vec![], vec![lv(94.0, 1.0)]).with_reference_price(96.0));

        engine.apply_snapshot(snapshot(&[90.0, 95.0], &[100.0, 105.0], 97.5));

        let view = engine.get_book(10);
        assert!(view.initialized);
        // 94 arrives as an ask after the reclassification in the same diff.
        assert_eq!(prices(&view.bids), vec![95.0, 91.0, 90.0]);
        assert_eq!(prices(&view.asks), vec![94.0, 100.0, 105.0]);
        assert_eq!(view.bids[1].size, 2.0);
        assert_eq!(view.reference_price, Some(96.0));
        assert_eq!(view.spread, Some(94.0 - 95.0));
        assert_eq!(engine.pending_len(), 0);
        assert_eq!(view.sequence, 4);
    }

    #[test]
    fn test_snapshot_replaces_previous_state() {
        let engine = ReconciliationEngine::new();
        engine.apply_snapshot(snapshot(&[90.0], &[100.0], 95.0));
        engine.apply_snapshot(snapshot(&[80.0], &[120.0], 100.0));

        let view = engine.get_book(10);
        assert_eq!(prices(&view.bids), vec![80.0]);
        assert_eq!(prices(&view.asks), vec![120.0]);
        assert_eq!(view.spread, Some(40.0));
        assert_eq!(engine.stats().snapshots_applied, 2);
    }

    #[test]
    fn test_snapshot_ignores_zero_size_levels() {
        let engine = ReconciliationEngine::new();
        engine.apply_snapshot(BookSnapshot {
            bids: vec![lv(90.0, 0.0), lv(89.0, 1.0)],
            asks: vec![lv(100.0, 1.0)],
            reference_price: 95.0,
        });

        assert_eq!(prices(&engine.get_book(10).bids), vec![89.0]);
    }

    #[test]
    fn test_zero_size_diff() {
        let engine = ReconciliationEngine::new();
        engine.apply_snapshot(snapshot(&[90.0, 95.0], &[100.0], 97.0));

        engine.apply_diff(DiffEvent::levels(vec![lv(93.0, 0.0)], vec![]));
        assert_eq!(prices(&engine.get_book(10).bids), vec![95.0, 90.0]);

        engine.apply_diff(DiffEvent::levels(vec![lv(95.0, 0.0)], vec![]));
        assert_eq!(prices(&engine.get_book(10).bids), vec![90.0]);
    }

    #[test]
    fn test_reclassification_example() {
        let engine = ReconciliationEngine::new();
        engine.apply_snapshot(snapshot(&[90.0, 95.0], &[94.0, 105.0], 97.0));

        engine.apply_diff(DiffEvent::reference(96.0));

        let view = engine.get_book(10);
        assert_eq!(prices(&view.bids), vec![95.0, 94.0, 90.0]);
        assert_eq!(prices(&view.asks), vec![105.0]);
        assert_eq!(engine.stats().levels_reclassified, 1);
    }

    #[test]
    fn test_spread_computation() {
        let engine = ReconciliationEngine::new();
        engine.apply_snapshot(snapshot(&[90.0, 95.0], &[100.0, 105.0], 97.5));
        assert_eq!(engine.spread(), Some(5.0));

        engine.apply_diff(DiffEvent::levels(vec![], vec![lv(100.0, 0.0), lv(105.0, 0.0)]));
        assert_eq!(engine.spread(), None);
        assert!(engine.best_ask().is_none());
        assert_eq!(engine.best_bid().unwrap().price, 95.0);
    }

    #[test]
    fn test_depth_limiting() {
        let engine = ReconciliationEngine::new();
        engine.apply_snapshot(snapshot(&[90.0, 95.0, 92.0], &[100.0, 105.0, 101.0], 97.5));

        let view = engine.get_book(1);
        assert_eq!(prices(&view.bids), vec![95.0]);
        assert_eq!(prices(&view.asks), vec![100.0]);
    }

    #[test]
    fn test_notifies_once_per_call() {
        let engine = ReconciliationEngine::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        engine.on_update(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        engine.apply_diff(DiffEvent::reference(1.0));
        engine.apply_diff(DiffEvent::reference(2.0));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        engine.apply_snapshot(snapshot(&[90.0], &[100.0], 95.0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        engine.apply_diff(DiffEvent::reference(96.0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_can_read_book() {
        let engine = ReconciliationEngine::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.on_update(move |engine| {
            sink.lock().push(engine.get_book(1).spread);
            Ok(())
        });

        engine.apply_snapshot(snapshot(&[90.0], &[100.0], 95.0));
        engine.apply_diff(DiffEvent::levels(vec![lv(92.0, 1.0)], vec![]));

        assert_eq!(*seen.lock(), vec![Some(10.0), Some(8.0)]);
    }

    #[test]
    fn test_failing_listener_leaves_state_intact() {
        let engine = ReconciliationEngine::new();
        engine.on_update(|_| Err(ListenerError::failed("render failed")));

        engine.apply_snapshot(snapshot(&[90.0], &[100.0], 95.0));
        engine.apply_diff(DiffEvent::levels(vec![lv(91.0, 1.0)], vec![]));

        assert_eq!(prices(&engine.get_book(10).bids), vec![91.0, 90.0]);
    }

    #[test]
    fn test_remove_listener() {
        let engine = ReconciliationEngine::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = engine.on_update(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        engine.apply_snapshot(snapshot(&[90.0], &[100.0], 95.0));
        assert!(engine.remove_listener(id));
        engine.apply_diff(DiffEvent::reference(96.0));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_overflow_drop_newest() {
        let engine = ReconciliationEngine::with_config(EngineConfig {
            gate: GateConfig {
                max_pending: 1,
                overflow: OverflowPolicy::DropNewest,
            },
            ..EngineConfig::default()
        });

        assert_eq!(
            engine.apply_diff(DiffEvent::levels(vec![lv(91.0, 1.0)], vec![])),
            DiffOutcome::Buffered { pending: 1 }
        );
        assert_eq!(
            engine.apply_diff(DiffEvent::levels(vec![lv(92.0, 1.0)], vec![])),
            DiffOutcome::Dropped
        );

        engine.apply_snapshot(snapshot(&[90.0], &[100.0], 95.0));
        assert_eq!(prices(&engine.get_book(10).bids), vec![91.0, 90.0]);

        let stats = engine.stats();
        assert_eq!(stats.diffs_buffered, 1);
        assert_eq!(stats.diffs_dropped, 1);
        assert_eq!(stats.diffs_applied, 1);
    }

    #[test]
    fn test_overflow_drop_oldest() {
        let engine = ReconciliationEngine::with_config(EngineConfig {
            gate: GateConfig {
                max_pending: 1,
                overflow: OverflowPolicy::DropOldest,
            },
            ..EngineConfig::default()
        });

        engine.apply_diff(DiffEvent::levels(vec![lv(91.0, 1.0)], vec![]));
        assert_eq!(
            engine.apply_diff(DiffEvent::levels(vec![lv(92.0, 1.0)], vec![])),
            DiffOutcome::Buffered { pending: 1 }
        );

        engine.apply_snapshot(snapshot(&[90.0], &[100.0], 95.0));
        assert_eq!(prices(&engine.get_book(10).bids), vec![92.0, 90.0]);
        assert_eq!(engine.stats().diffs_dropped, 1);
    }

    #[test]
    fn test_concurrent_diffs_serialize() {
        let engine = Arc::new(ReconciliationEngine::new());
        engine.apply_snapshot(snapshot(&[], &[], 1_000.0));

        let writers: u32 = 4;
        let per_writer: u32 = 250;

        std::thread::scope(|scope| {
            for w in 0..writers {
                let engine = Arc::clone(&engine);
                scope.spawn(move || {
                    for i in 0..per_writer {
                        let tick = f64::from(w * per_writer + i);
                        engine.apply_diff(DiffEvent::levels(
                            vec![lv(500.0 - tick * 0.1, 1.0)],
                            vec![lv(1_500.0 + tick * 0.1, 1.0)],
                        ));
                    }
                });
            }

            let reader = Arc::clone(&engine);
            scope.spawn(move || {
                let mut last_sequence = 0;
                for _ in 0..500 {
                    let view = reader.get_book(usize::MAX);
                    assert!(view.sequence >= last_sequence);
                    last_sequence = view.sequence;
                    assert!(view.bids.windows(2).all(|w| w[0].price > w[1].price));
                    assert!(view.asks.windows(2).all(|w| w[0].price < w[1].price));
                    assert!(view.bids.iter().chain(&view.asks).all(|l| l.size > 0.0));
                    // Every diff adds one level per side.
                    assert_eq!(view.bids.len(), view.asks.len());
                }
            });
        });

        let view = engine.get_book(usize::MAX);
        let total = (writers * per_writer) as usize;
        assert_eq!(view.bids.len(), total);
        assert_eq!(view.asks.len(), total);
        assert_eq!(view.sequence, 1 + total as u64);
        assert_eq!(engine.stats().diffs_applied, total as u64);
    }

    #[test]
    fn test_concurrent_diffs_during_snapshot() {
        let engine = Arc::new(ReconciliationEngine::new());

        std::thread::scope(|scope| {
            let feeder = Arc::clone(&engine);
            scope.spawn(move || {
                for i in 0..500u32 {
                    feeder.apply_diff(DiffEvent::levels(
                        vec![lv(100.0 - f64::from(i) * 0.01, 1.0)],
                        vec![],
                    ));
                }
            });

            let initializer = Arc::clone(&engine);
            scope.spawn(move || {
                initializer.apply_snapshot(snapshot(&[], &[200.0], 150.0));
            });
        });

        // Buffered or live, every diff ends up applied exactly once.
        let view = engine.get_book(usize::MAX);
        assert_eq!(view.bids.len(), 500);
        assert_eq!(engine.pending_len(), 0);
        assert_eq!(engine.stats().diffs_applied, 500);
    }

    #[test]
    fn test_engine_debug() {
        let engine = ReconciliationEngine::new();
        let debug_str = format!("{:?}", engine);
        assert!(debug_str.contains("ReconciliationEngine"));
        assert!(debug_str.contains("initialized: false"));
    }
}
