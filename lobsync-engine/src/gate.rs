//! Initialization gate: buffer diffs until the first snapshot lands.

use crate::book::DiffEvent;
use std::collections::VecDeque;

/// What to do when the pending buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest buffered diff to make room.
    #[default]
    DropOldest,
    /// Discard the incoming diff.
    DropNewest,
}

/// Configuration for the pending-diff buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Maximum number of buffered diffs (0 = unbounded).
    pub max_pending: usize,
    /// Overflow behavior once `max_pending` is reached.
    pub overflow: OverflowPolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_pending: 65_536,
            overflow: OverflowPolicy::DropOldest,
        }
    }
}

impl GateConfig {
    /// Returns a configuration with no buffer bound.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            max_pending: 0,
            ..Self::default()
        }
    }

    /// Sets the buffer bound (0 = unbounded).
    #[must_use]
    pub fn max_pending(mut self, max: usize) -> Self {
        self.max_pending = max;
        self
    }

    /// Sets the overflow policy.
    #[must_use]
    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }
}

/// Result of offering a diff to the gate.
#[derive(Debug, PartialEq)]
pub enum Admission {
    /// The gate is open; the diff should be applied now.
    Pass(DiffEvent),
    /// The diff was buffered.
    Held {
        /// Buffer length after the push.
        pending: usize,
    },
    /// The diff was buffered after evicting the oldest one.
    Evicted {
        /// Buffer length after the push.
        pending: usize,
    },
    /// The buffer was full and the diff was discarded.
    Rejected,
}

/// Buffer-until-ready, replay-once, discard-after.
#[derive(Debug)]
pub struct InitializationGate {
    config: GateConfig,
    pending: VecDeque<DiffEvent>,
    open: bool,
}

impl InitializationGate {
    /// Creates a closed gate.
    #[must_use]
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
            open: false,
        }
    }

    /// Offers a diff to the gate.
    pub fn admit(&mut self, diff: DiffEvent) -> Admission {
        if self.open {
            return Admission::Pass(diff);
        }

        let max = self.config.max_pending;
        if max > 0 && self.pending.len() >= max {
            match self.config.overflow {
                OverflowPolicy::DropOldest => {
                    self.pending.pop_front();
                    self.pending.push_back(diff);
                    return Admission::Evicted {
                        pending: self.pending.len(),
                    };
                }
                OverflowPolicy::DropNewest => return Admission::Rejected,
            }
        }

        self.pending.push_back(diff);
        Admission::Held {
            pending: self.pending.len(),
        }
    }

    /// Opens the gate and hands back the buffered diffs in arrival order.
    ///
    /// The buffer is emptied. Calling this again returns nothing.
    pub fn open(&mut self) -> VecDeque<DiffEvent> {
        self.open = true;
        std::mem::take(&mut self.pending)
    }

    /// Returns true once a snapshot has opened the gate.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns the number of buffered diffs.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns the gate configuration.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

impl Default for InitializationGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}
