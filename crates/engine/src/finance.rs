//! Pure financial derivation.
//!
//! Everything here is stateless arithmetic over primitive fields; no I/O, no
//! clock. The owner split applies to line haul only: surcharges, loading,
//! unloading and accessorials pass through 100% to the owner.

use chrono::NaiveDate;

use crate::{
    MoneyCents,
    freights::{Freight, FreightStatus, LoadExpense},
    ledger::Tombstone,
    expenses::StandaloneExpense,
};

/// Gross revenue of a load: the five components summed.
pub fn revenue(
    line_haul: MoneyCents,
    fuel_surcharge: MoneyCents,
    accessorials: MoneyCents,
    loading: MoneyCents,
    unloading: MoneyCents,
) -> MoneyCents {
    line_haul + fuel_surcharge + accessorials + loading + unloading
}

/// Owner share before expenses: `line_haul * pct/100` plus the pass-through
/// components. `owner_percentage` of 0 and 100 are both valid (fully
/// managed-for-others, fully owner-operated).
pub fn owner_amount(
    line_haul: MoneyCents,
    owner_percentage: u8,
    fuel_surcharge: MoneyCents,
    accessorials: MoneyCents,
    loading: MoneyCents,
    unloading: MoneyCents,
) -> MoneyCents {
    line_haul.percent(owner_percentage) + fuel_surcharge + accessorials + loading + unloading
}

/// Sum of the live expense lines. Soft-deleted lines stay in the slice but
/// count zero.
pub fn total_expenses(expenses: &[LoadExpense]) -> MoneyCents {
    expenses
        .iter()
        .filter(|e| !e.is_deleted())
        .map(|e| e.amount)
        .sum()
}

/// May be negative; a loss is rendered distinctly, never rejected.
pub fn net_profit(owner_amount: MoneyCents, total_expenses: MoneyCents) -> MoneyCents {
    owner_amount - total_expenses
}

/// Rollup over a date window for the dashboard and charts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowTotals {
    pub revenue: MoneyCents,
    pub owner_revenue: MoneyCents,
    pub expenses: MoneyCents,
    pub profit: MoneyCents,
    /// In-window loads awaiting delivery; they count no revenue yet.
    pub pending_count: usize,
    pub cancelled_count: usize,
}

/// Aggregates freights and standalone expenses over `[start, end]`
/// (inclusive on both ends).
///
/// Revenue recognition gates, in order:
/// - soft-deleted records never count;
/// - `Cancelled` loads only bump `cancelled_count`;
/// - loads failing the validity gate (no driver name, no comments) count
///   zero everywhere;
/// - non-`Delivered` loads only bump `pending_count`.
pub fn aggregate_over_window(
    freights: &[Freight],
    standalone: &[StandaloneExpense],
    start: NaiveDate,
    end: NaiveDate,
) -> WindowTotals {
    let mut totals = WindowTotals::default();

    for freight in freights {
        if freight.is_deleted() || freight.date < start || freight.date > end {
            continue;
        }
        if freight.status == FreightStatus::Cancelled {
            totals.cancelled_count += 1;
            continue;
        }
        if !freight.passes_validity_gate() {
            continue;
        }
        if freight.status != FreightStatus::Delivered {
            totals.pending_count += 1;
            continue;
        }
        totals.revenue += freight.revenue;
        totals.owner_revenue += freight.owner_amount;
        totals.expenses += freight.total_expenses;
    }

    for expense in standalone {
        if expense.is_deleted() || expense.date < start || expense.date > end {
            continue;
        }
        totals.expenses += expense.amount;
    }

    totals.profit = totals.owner_revenue - totals.expenses;
    totals
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::categories::ExpenseCategory;
    use crate::expenses::ExpenseLink;
    use crate::freights::tests::freight;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn standalone(cents: i64, date: NaiveDate) -> StandaloneExpense {
        StandaloneExpense {
            id: Uuid::new_v4(),
            category: ExpenseCategory::from("insurance"),
            description: "policy".to_string(),
            amount: MoneyCents::new(cents),
            date,
            link: ExpenseLink::None,
            comments: Vec::new(),
            is_deleted: false,
            deleted_at: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn revenue_is_the_sum_of_all_five_components() {
        let total = revenue(
            MoneyCents::new(100_000),
            MoneyCents::new(10_000),
            MoneyCents::new(1_000),
            MoneyCents::new(500),
            MoneyCents::new(250),
        );
        assert_eq!(total.cents(), 111_750);
    }

    #[test]
    fn owner_amount_splits_only_the_line_haul() {
        let owner = owner_amount(
            MoneyCents::new(100_000),
            65,
            MoneyCents::new(10_000),
            MoneyCents::new(1_000),
            MoneyCents::new(500),
            MoneyCents::new(250),
        );
        assert_eq!(owner.cents(), 65_000 + 11_750);

        // 0 and 100 are the managed-for-others / owner-operated edge cases.
        let zero = owner_amount(
            MoneyCents::new(100_000),
            0,
            MoneyCents::ZERO,
            MoneyCents::ZERO,
            MoneyCents::ZERO,
            MoneyCents::ZERO,
        );
        assert_eq!(zero.cents(), 0);
        let full = owner_amount(
            MoneyCents::new(100_000),
            100,
            MoneyCents::ZERO,
            MoneyCents::ZERO,
            MoneyCents::ZERO,
            MoneyCents::ZERO,
        );
        assert_eq!(full.cents(), 100_000);
    }

    #[test]
    fn net_profit_may_be_a_loss() {
        let profit = net_profit(MoneyCents::new(1_000), MoneyCents::new(2_500));
        assert_eq!(profit.cents(), -1_500);
    }

    #[test]
    fn window_counts_only_delivered_loads() {
        let mut pending = freight(100_000, 0);
        pending.status = FreightStatus::InRoute;
        pending.date = day(10);
        let mut delivered = freight(50_000, 0);
        delivered.date = day(12);

        let totals = aggregate_over_window(&[pending, delivered], &[], day(1), day(31));
        assert_eq!(totals.owner_revenue.cents(), 32_500);
        assert_eq!(totals.pending_count, 1);
        assert_eq!(totals.cancelled_count, 0);
    }

    #[test]
    fn invalid_loads_count_zero_even_when_delivered() {
        let mut no_driver = freight(100_000, 0);
        no_driver.driver_name = None;
        no_driver.date = day(5);
        let mut no_comments = freight(100_000, 0);
        no_comments.comments.clear();
        no_comments.date = day(6);

        let totals = aggregate_over_window(&[no_driver, no_comments], &[], day(1), day(31));
        assert_eq!(totals, WindowTotals::default());
    }

    #[test]
    fn cancelled_loads_are_counted_apart() {
        let mut cancelled = freight(100_000, 0);
        cancelled.status = FreightStatus::Cancelled;
        cancelled.date = day(5);

        let totals = aggregate_over_window(&[cancelled], &[], day(1), day(31));
        assert_eq!(totals.cancelled_count, 1);
        assert_eq!(totals.revenue.cents(), 0);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let mut first = freight(10_000, 0);
        first.date = day(1);
        let mut last = freight(10_000, 0);
        last.date = day(31);
        let mut outside = freight(10_000, 0);
        outside.date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();

        let totals = aggregate_over_window(&[first, last, outside], &[], day(1), day(31));
        assert_eq!(totals.owner_revenue.cents(), 13_000);
    }

    #[test]
    fn standalone_expenses_reduce_profit() {
        let mut load = freight(100_000, 10_000);
        load.date = day(10);
        let out_of_window = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        let expenses = vec![standalone(20_000, day(11)), standalone(5_000, out_of_window)];

        let totals = aggregate_over_window(&[load], &expenses, day(1), day(31));
        assert_eq!(totals.owner_revenue.cents(), 75_000);
        assert_eq!(totals.expenses.cents(), 20_000);
        assert_eq!(totals.profit.cents(), 55_000);
    }

    #[test]
    fn deleted_records_never_count() {
        let mut load = freight(100_000, 0);
        load.date = day(10);
        load.is_deleted = true;
        let mut gone = standalone(9_000, day(10));
        gone.is_deleted = true;

        let totals = aggregate_over_window(&[load], &[gone], day(1), day(31));
        assert_eq!(totals, WindowTotals::default());
    }
}
