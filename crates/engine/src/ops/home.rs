//! Home transaction operations. No soft delete here: removal is final.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine,
    commands::{HomeNew, HomePatch},
    home::HomeTransaction,
    ledger,
    util,
};

impl Engine {
    pub async fn new_home_transaction(
        &mut self,
        user_id: &str,
        cmd: HomeNew,
    ) -> ResultEngine<Uuid> {
        util::validate_positive(cmd.amount, "amount")?;
        let description = util::normalize_required_text(&cmd.description, "description")?;
        let tx = HomeTransaction {
            id: Uuid::new_v4(),
            kind: cmd.kind,
            amount: cmd.amount,
            category: cmd.category.trim().to_string(),
            description,
            date: cmd.date,
            updated_at: Utc::now(),
        };
        let tx_id = tx.id;

        self.ledger_mut(user_id).home.insert(0, tx);
        self.persist_home(user_id, tx_id).await;
        Ok(tx_id)
    }

    /// Newest first.
    pub fn list_home_transactions(&self, user_id: &str) -> Vec<HomeTransaction> {
        self.ledger(user_id)
            .map(|ledger| ledger.home.clone())
            .unwrap_or_default()
    }

    pub async fn update_home_transaction(
        &mut self,
        user_id: &str,
        tx_id: Uuid,
        patch: HomePatch,
    ) -> ResultEngine<()> {
        if let Some(amount) = patch.amount {
            util::validate_positive(amount, "amount")?;
        }
        let description = patch
            .description
            .map(|d| util::normalize_required_text(&d, "description"))
            .transpose()?;

        let ledger = self.ledger_mut(user_id);
        let tx = ledger::find_mut(&mut ledger.home, tx_id)
            .ok_or_else(|| EngineError::KeyNotFound("home transaction not exists".to_string()))?;
        if let Some(kind) = patch.kind {
            tx.kind = kind;
        }
        if let Some(amount) = patch.amount {
            tx.amount = amount;
        }
        if let Some(category) = patch.category {
            tx.category = category.trim().to_string();
        }
        if let Some(description) = description {
            tx.description = description;
        }
        if let Some(date) = patch.date {
            tx.date = date;
        }
        tx.updated_at = Utc::now();

        self.persist_home(user_id, tx_id).await;
        Ok(())
    }

    /// Final removal; there is no recycle bin for home transactions. A
    /// missing id is a silent no-op.
    pub async fn purge_home_transaction(
        &mut self,
        user_id: &str,
        tx_id: Uuid,
    ) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        if ledger::purge(&mut ledger.home, tx_id).is_some() {
            self.persist_home(user_id, tx_id).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{HomeKind, MoneyCents, commands::HomeNew, test_support};

    #[tokio::test]
    async fn purge_is_final_and_silent_on_repeat() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_home_transaction(
                "carol",
                HomeNew {
                    kind: HomeKind::Expense,
                    amount: MoneyCents::new(9_900),
                    category: "utilities".to_string(),
                    description: "electric bill".to_string(),
                    date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
                },
            )
            .await
            .unwrap();
        assert_eq!(engine.list_home_transactions("carol").len(), 1);

        engine.purge_home_transaction("carol", id).await.unwrap();
        assert!(engine.list_home_transactions("carol").is_empty());
        engine.purge_home_transaction("carol", id).await.unwrap();
    }
}
