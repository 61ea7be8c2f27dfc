//! Dashboard window totals.

use chrono::NaiveDate;

use crate::{Engine, WindowTotals, finance};

impl Engine {
    /// Aggregates one user's books over `[start, end]`, both ends inclusive.
    pub fn statistics(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> WindowTotals {
        self.ledger(user_id)
            .map(|ledger| {
                finance::aggregate_over_window(&ledger.freights, &ledger.expenses, start, end)
            })
            .unwrap_or_default()
    }
}
