//! Standalone expense operations.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine,
    commands::{CommentNew, ExpenseNew, ExpensePatch},
    expenses::{ExpenseLink, StandaloneExpense},
    freights::LoadComment,
    ledger::{self, Tombstone},
    util,
};

impl Engine {
    /// Creates a standalone expense, resolving the optional driver or asset
    /// link and snapshotting its name. At most one link target is allowed.
    pub async fn new_expense(&mut self, user_id: &str, cmd: ExpenseNew) -> ResultEngine<Uuid> {
        let description = util::normalize_required_text(&cmd.description, "expense description")?;
        util::validate_positive(cmd.amount, "expense amount")?;

        let link = match (cmd.driver_id, cmd.asset_id) {
            (Some(_), Some(_)) => {
                return Err(EngineError::InvalidField(
                    "an expense links to a driver or an asset, not both".to_string(),
                ));
            }
            (Some(driver_id), None) => {
                let (id, name) = self.driver_snapshot(user_id, driver_id)?;
                ExpenseLink::Driver { id, name }
            }
            (None, Some(asset_id)) => {
                let (id, name) = self.asset_snapshot(user_id, asset_id)?;
                ExpenseLink::Asset { id, name }
            }
            (None, None) => ExpenseLink::None,
        };

        let expense = StandaloneExpense {
            id: Uuid::new_v4(),
            category: cmd.category,
            description,
            amount: cmd.amount,
            date: cmd.date,
            link,
            comments: Vec::new(),
            is_deleted: false,
            deleted_at: None,
            updated_at: Utc::now(),
        };
        let expense_id = expense.id;

        self.ledger_mut(user_id).expenses.insert(0, expense);
        self.persist_expense(user_id, expense_id).await;
        Ok(expense_id)
    }

    pub fn expense(&self, user_id: &str, expense_id: Uuid) -> ResultEngine<StandaloneExpense> {
        self.ledger(user_id)
            .and_then(|ledger| ledger::find(&ledger.expenses, expense_id))
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
    }

    /// Live standalone expenses, newest first.
    pub fn list_expenses(&self, user_id: &str) -> Vec<StandaloneExpense> {
        self.ledger(user_id)
            .map(|ledger| {
                ledger
                    .expenses
                    .iter()
                    .filter(|e| !e.is_deleted())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn update_expense(
        &mut self,
        user_id: &str,
        expense_id: Uuid,
        patch: ExpensePatch,
    ) -> ResultEngine<()> {
        if let Some(amount) = patch.amount {
            util::validate_positive(amount, "expense amount")?;
        }
        let description = patch
            .description
            .map(|d| util::normalize_required_text(&d, "expense description"))
            .transpose()?;

        let ledger = self.ledger_mut(user_id);
        let expense = ledger::find_mut(&mut ledger.expenses, expense_id)
            .filter(|e| !e.is_deleted())
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        if let Some(category) = patch.category {
            expense.category = category;
        }
        if let Some(description) = description {
            expense.description = description;
        }
        if let Some(amount) = patch.amount {
            expense.amount = amount;
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }
        expense.updated_at = Utc::now();

        self.persist_expense(user_id, expense_id).await;
        Ok(())
    }

    pub async fn delete_expense(&mut self, user_id: &str, expense_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        ledger::soft_delete(&mut ledger.expenses, expense_id, Utc::now())
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        self.persist_expense(user_id, expense_id).await;
        Ok(())
    }

    pub async fn restore_expense(&mut self, user_id: &str, expense_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        ledger::restore(&mut ledger.expenses, expense_id)
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        self.persist_expense(user_id, expense_id).await;
        Ok(())
    }

    pub async fn purge_expense(&mut self, user_id: &str, expense_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        if ledger::purge(&mut ledger.expenses, expense_id).is_some() {
            self.persist_expense(user_id, expense_id).await;
        }
        Ok(())
    }

    /// Appends a manual comment to a standalone expense.
    pub async fn add_expense_comment(
        &mut self,
        user_id: &str,
        expense_id: Uuid,
        cmd: CommentNew,
    ) -> ResultEngine<Uuid> {
        let text = util::normalize_required_text(&cmd.text, "comment")?;
        let comment = LoadComment::manual(&text, &cmd.author, cmd.event_date);
        let comment_id = comment.id;

        let ledger = self.ledger_mut(user_id);
        let expense = ledger::find_mut(&mut ledger.expenses, expense_id)
            .filter(|e| !e.is_deleted())
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        expense.comments.insert(0, comment);
        expense.updated_at = Utc::now();

        self.persist_expense(user_id, expense_id).await;
        Ok(comment_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        ExpenseCategory, ExpenseLink, MoneyCents, PayRate,
        commands::{DriverNew, ExpenseNew},
        test_support,
    };

    fn expense_cmd(amount: i64) -> ExpenseNew {
        ExpenseNew {
            category: ExpenseCategory::from("maintenance"),
            description: "oil change".to_string(),
            amount: MoneyCents::new(amount),
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            driver_id: None,
            asset_id: None,
        }
    }

    #[tokio::test]
    async fn link_snapshot_is_taken_at_create_time() {
        let (mut engine, _dir) = test_support::engine().await;
        let driver_id = engine
            .new_driver(
                "carol",
                DriverNew {
                    name: "Alice".to_string(),
                    pay: PayRate::Percentage { percent: 25 },
                    images: Vec::new(),
                },
            )
            .await
            .unwrap();

        let mut cmd = expense_cmd(12_000);
        cmd.driver_id = Some(driver_id);
        let id = engine.new_expense("carol", cmd).await.unwrap();

        let expense = engine.expense("carol", id).unwrap();
        assert_eq!(
            expense.link,
            ExpenseLink::Driver {
                id: driver_id,
                name: "Alice".to_string()
            }
        );
    }

    #[tokio::test]
    async fn double_link_is_rejected() {
        let (mut engine, _dir) = test_support::engine().await;
        let mut cmd = expense_cmd(12_000);
        cmd.driver_id = Some(uuid::Uuid::new_v4());
        cmd.asset_id = Some(uuid::Uuid::new_v4());
        assert!(engine.new_expense("carol", cmd).await.is_err());
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let (mut engine, _dir) = test_support::engine().await;
        assert!(engine.new_expense("carol", expense_cmd(0)).await.is_err());
        assert!(engine.new_expense("carol", expense_cmd(-500)).await.is_err());
    }
}
