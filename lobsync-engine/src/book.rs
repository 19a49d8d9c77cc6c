//! Two-sided book state and the messages that mutate it.

use lobsync_core::{PriceLevel, PriceLevelSet, Side};

/// Incremental batch of level changes for both sides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffEvent {
    /// Bid level upserts/deletes, in arrival order.
    pub bids: Vec<PriceLevel>,
    /// Ask level upserts/deletes, in arrival order.
    pub asks: Vec<PriceLevel>,
    /// New reference price, if the message carried one.
    pub reference_price: Option<f64>,
}

impl DiffEvent {
    /// Creates a diff carrying level changes only.
    #[must_use]
    pub fn levels(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self {
            bids,
            asks,
            reference_price: None,
        }
    }

    /// Creates a diff carrying only a reference price update.
    #[must_use]
    pub fn reference(price: f64) -> Self {
        Self {
            bids: Vec::new(),
            asks: Vec::new(),
            reference_price: Some(price),
        }
    }

    /// Sets the reference price.
    #[must_use]
    pub fn with_reference_price(mut self, price: f64) -> Self {
        self.reference_price = Some(price);
        self
    }

    /// Returns true if the diff changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty() && self.reference_price.is_none()
    }
}

/// Full two-sided book used to initialize the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BookSnapshot {
    /// Bid levels.
    pub bids: Vec<PriceLevel>,
    /// Ask levels.
    pub asks: Vec<PriceLevel>,
    /// Reference price at snapshot time.
    pub reference_price: f64,
}

/// Point-in-time projection of the book.
#[derive(Debug, Clone, PartialEq)]
pub struct BookView {
    /// Best bids, highest price first.
    pub bids: Vec<PriceLevel>,
    /// Best asks, lowest price first.
    pub asks: Vec<PriceLevel>,
    /// Current reference price.
    pub reference_price: Option<f64>,
    /// Best ask minus best bid, when both sides are populated.
    pub spread: Option<f64>,
    /// Whether a snapshot has been applied.
    pub initialized: bool,
    /// Mutation counter at the time of the projection.
    pub sequence: u64,
}

impl BookView {
    /// Returns the projection of an uninitialized book.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bids: Vec::new(),
            asks: Vec::new(),
            reference_price: None,
            spread: None,
            initialized: false,
            sequence: 0,
        }
    }

    /// Returns the best bid in the projection.
    #[must_use]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.first().copied()
    }

    /// Returns the best ask in the projection.
    #[must_use]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.first().copied()
    }
}

/// Two-sided price-level book.
///
/// `Book` is not synchronized. [`ReconciliationEngine`](crate::ReconciliationEngine)
/// wraps it with the lock, the initialization gate and the notifier.
#[derive(Debug, Clone, Default)]
pub struct Book {
    bids: PriceLevelSet,
    asks: PriceLevelSet,
    reference_price: Option<f64>,
    spread: Option<f64>,
    sequence: u64,
}

impl Book {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty book with pre-allocated capacity per side.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bids: PriceLevelSet::with_capacity(capacity),
            asks: PriceLevelSet::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Replaces both sides and the reference price wholesale.
    ///
    /// The spread is left stale. Call [`Book::recompute_spread`] once any
    /// follow-up diffs have been applied.
    pub fn replace(&mut self, snapshot: BookSnapshot) {
        self.bids = PriceLevelSet::from_levels(snapshot.bids);
        self.asks = PriceLevelSet::from_levels(snapshot.asks);
        self.reference_price = Some(snapshot.reference_price);
        self.sequence += 1;
    }

    /// Applies one diff: reclassification first, then level changes.
    ///
    /// Returns the number of levels that moved between sides. The spread is
    /// left stale.
    pub fn apply_diff(&mut self, diff: &DiffEvent) -> usize {
        let moved = match diff.reference_price {
            Some(price) => self.reclassify(price),
            None => 0,
        };

        for level in &diff.bids {
            self.bids.upsert_or_delete(*level);
        }
        for level in &diff.asks {
            self.asks.upsert_or_delete(*level);
        }

        self.sequence += 1;
        moved
    }

    /// Sets a new reference price and moves levels that crossed it.
    ///
    /// Asks strictly below the reference become bids and bids strictly above
    /// it become asks. A moved level replaces any level already resting at the
    /// same price on its new side.
    pub fn reclassify(&mut self, reference_price: f64) -> usize {
        self.reference_price = Some(reference_price);

        let crossed_asks = self.asks.drain_below(reference_price);
        let crossed_bids = self.bids.drain_above(reference_price);
        let moved = crossed_asks.len() + crossed_bids.len();

        self.bids.extend(crossed_asks);
        self.asks.extend(crossed_bids);
        moved
    }

    /// Recomputes the spread from the current best levels.
    pub fn recompute_spread(&mut self) {
        self.spread = match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        };
    }

    /// Returns the best (highest) bid.
    #[inline]
    #[must_use]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.best(Side::Bid.best_first())
    }

    /// Returns the best (lowest) ask.
    #[inline]
    #[must_use]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.best(Side::Ask.best_first())
    }

    /// Returns the last computed spread.
    #[must_use]
    pub fn spread(&self) -> Option<f64> {
        self.spread
    }

    /// Returns the reference price.
    #[must_use]
    pub fn reference_price(&self) -> Option<f64> {
        self.reference_price
    }

    /// Returns the mutation counter.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Levels on `side`.
    #[must_use]
    pub fn side(&self, side: Side) -> &PriceLevelSet {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Bid side.
    #[must_use]
    pub fn bids(&self) -> &PriceLevelSet {
        &self.bids
    }

    /// Ask side.
    #[must_use]
    pub fn asks(&self) -> &PriceLevelSet {
        &self.asks
    }

    /// Projects the top `depth` levels of each side.
    #[must_use]
    pub fn view(&self, depth: usize, initialized: bool) -> BookView {
        BookView {
            bids: self.bids.top_k(depth, Side::Bid.best_first()),
            asks: self.asks.top_k(depth, Side::Ask.best_first()),
            reference_price: self.reference_price,
            spread: self.spread,
            initialized,
            sequence: self.sequence,
        }
    }
}
