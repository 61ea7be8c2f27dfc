//! Activity feed over one user's ledger.

use crate::{Engine, activity::{self, ActivityEvent, ActivityFilter}};

impl Engine {
    /// Projects the filtered activity feed. Pure: repeated calls over an
    /// unchanged ledger return byte-identical output.
    pub fn activity(&self, user_id: &str, filter: &ActivityFilter) -> Vec<ActivityEvent> {
        self.ledger(user_id)
            .map(|ledger| activity::project_filtered(&ledger.freights, &ledger.expenses, filter))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        ActivityFilter, ActivityKind, ops::freights::tests::new_cmd, test_support,
    };

    #[tokio::test]
    async fn deleting_a_freight_empties_its_feed_entries() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_freight(
                "carol",
                new_cmd("L-100", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), 100_000),
            )
            .await
            .unwrap();

        let feed = engine.activity("carol", &ActivityFilter::default());
        assert!(feed.iter().any(|e| e.kind == ActivityKind::Revenue));

        engine.delete_freight("carol", id).await.unwrap();
        assert!(engine.activity("carol", &ActivityFilter::default()).is_empty());
    }
}
