//! Terminal rendering of a book view.

use lobsync_engine::BookView;
use std::fmt;

const RULE_WIDTH: usize = 30;
const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";

/// ANSI sequence that clears the screen and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Displays a [`BookView`] as a two-column size/price ladder.
///
/// Asks are listed highest first in red, then the reference price, then
/// bids highest first in green.
pub struct BoardDisplay<'a>(pub &'a BookView);

impl fmt::Display for BoardDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        let rule = "-".repeat(RULE_WIDTH);

        match (view.initialized, view.reference_price, view.spread) {
            (true, Some(_), Some(spread)) => writeln!(f, "Realtime LOB\nSpread: {spread:.2}")?,
            _ => writeln!(f, "Realtime LOB | Waiting for data...")?,
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "{:>10} | {:>10}", "Size", "Price")?;
        writeln!(f, "{rule}")?;

        for ask in view.asks.iter().rev() {
            writeln!(f, "{RED}{:>10.4} | {:>10.2}{RESET}", ask.size, ask.price)?;
        }
        writeln!(f, "{rule}")?;

        match view.reference_price {
            Some(mid) => writeln!(f, "{:>10} | {:>10.2}", "", mid)?,
            None => writeln!(f, "{:>10} | {:>10}", "", "-")?,
        }
        writeln!(f, "{rule}")?;

        for bid in &view.bids {
            writeln!(f, "{GREEN}{:>10.4} | {:>10.2}{RESET}", bid.size, bid.price)?;
        }
        writeln!(f, "{rule}")
    }
}

/// Renders `view` to a string.
#[must_use]
pub fn render_board(view: &BookView) -> String {
    BoardDisplay(view).to_string()
}
