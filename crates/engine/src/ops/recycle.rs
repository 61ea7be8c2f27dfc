//! Recycle bin: one surface over every tombstoned record.
//!
//! Stateless: listings are derived from the ledger on every call.
//! Restore and purge are routed by a kind tag; missing ids are silent
//! no-ops because the bin view can race a double click or another session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine,
    ledger::{self, Tombstone},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecycleKind {
    Freight,
    Asset,
    Driver,
    Expense,
}

impl RecycleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Freight => "freight",
            Self::Asset => "asset",
            Self::Driver => "driver",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for RecycleKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "freight" => Ok(Self::Freight),
            "asset" => Ok(Self::Asset),
            "driver" => Ok(Self::Driver),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidField(format!(
                "invalid recycle kind: {other}"
            ))),
        }
    }
}

/// One tombstoned record as shown in the bin.
#[derive(Clone, Debug, PartialEq)]
pub struct RecycleEntry {
    pub kind: RecycleKind,
    pub id: Uuid,
    /// Whatever names the record to a human: load label, unit number,
    /// driver name or expense description.
    pub label: String,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set for expense lines still owned by a live freight.
    pub freight_id: Option<Uuid>,
}

impl Engine {
    /// Everything currently in the bin, newest deletion first. Expense lines
    /// of live freights are listed too; lines buried inside a deleted
    /// freight travel with their parent instead.
    pub fn recycle_bin(&self, user_id: &str) -> Vec<RecycleEntry> {
        let Some(ledger) = self.ledger(user_id) else {
            return Vec::new();
        };
        let mut entries = Vec::new();

        for freight in ledger.freights.iter().filter(|f| f.is_deleted()) {
            entries.push(RecycleEntry {
                kind: RecycleKind::Freight,
                id: freight.id,
                label: freight.label.clone(),
                deleted_at: freight.deleted_at,
                freight_id: None,
            });
        }
        for freight in ledger.freights.iter().filter(|f| !f.is_deleted()) {
            for expense in freight.expenses.iter().filter(|e| e.is_deleted()) {
                entries.push(RecycleEntry {
                    kind: RecycleKind::Expense,
                    id: expense.id,
                    label: expense.description.clone(),
                    deleted_at: expense.deleted_at,
                    freight_id: Some(freight.id),
                });
            }
        }
        for asset in ledger.assets.iter().filter(|a| a.is_deleted()) {
            entries.push(RecycleEntry {
                kind: RecycleKind::Asset,
                id: asset.id,
                label: asset.identifier.clone(),
                deleted_at: asset.deleted_at,
                freight_id: None,
            });
        }
        for driver in ledger.drivers.iter().filter(|d| d.is_deleted()) {
            entries.push(RecycleEntry {
                kind: RecycleKind::Driver,
                id: driver.id,
                label: driver.name.clone(),
                deleted_at: driver.deleted_at,
                freight_id: None,
            });
        }
        for expense in ledger.expenses.iter().filter(|e| e.is_deleted()) {
            entries.push(RecycleEntry {
                kind: RecycleKind::Expense,
                id: expense.id,
                label: expense.description.clone(),
                deleted_at: expense.deleted_at,
                freight_id: None,
            });
        }

        entries.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        entries
    }

    /// Restores a tombstoned record by kind and id. A missing id, a record
    /// that is already live, or a nested expense whose parent freight is
    /// deleted are all silent no-ops.
    pub async fn restore_recycled(
        &mut self,
        user_id: &str,
        kind: RecycleKind,
        id: Uuid,
    ) -> ResultEngine<()> {
        match kind {
            RecycleKind::Freight => {
                let ledger = self.ledger_mut(user_id);
                if ledger::restore(&mut ledger.freights, id).is_some() {
                    self.persist_freight(user_id, id).await;
                }
            }
            RecycleKind::Asset => {
                let ledger = self.ledger_mut(user_id);
                if ledger::restore(&mut ledger.assets, id).is_some() {
                    self.persist_asset(user_id, id).await;
                }
            }
            RecycleKind::Driver => {
                let ledger = self.ledger_mut(user_id);
                if ledger::restore(&mut ledger.drivers, id).is_some() {
                    self.persist_driver(user_id, id).await;
                }
            }
            RecycleKind::Expense => {
                let ledger = self.ledger_mut(user_id);
                if ledger::restore(&mut ledger.expenses, id).is_some() {
                    self.persist_expense(user_id, id).await;
                } else if let Some(freight_id) = restore_nested(ledger, id) {
                    self.persist_freight(user_id, freight_id).await;
                }
            }
        }
        Ok(())
    }

    /// Removes a record for good by kind and id. Missing ids are silent
    /// no-ops.
    pub async fn purge_recycled(
        &mut self,
        user_id: &str,
        kind: RecycleKind,
        id: Uuid,
    ) -> ResultEngine<()> {
        match kind {
            RecycleKind::Freight => self.purge_freight(user_id, id).await,
            RecycleKind::Asset => self.purge_asset(user_id, id).await,
            RecycleKind::Driver => self.purge_driver(user_id, id).await,
            RecycleKind::Expense => {
                let ledger = self.ledger_mut(user_id);
                if ledger::purge(&mut ledger.expenses, id).is_some() {
                    self.persist_expense(user_id, id).await;
                } else if let Some(freight_id) = purge_nested(ledger, id) {
                    self.persist_freight(user_id, freight_id).await;
                }
                Ok(())
            }
        }
    }
}

/// Restores an expense line nested in a live freight, returning the parent
/// id when something changed.
fn restore_nested(ledger: &mut crate::Ledger, expense_id: Uuid) -> Option<Uuid> {
    let freight = ledger
        .freights
        .iter_mut()
        .filter(|f| !f.is_deleted())
        .find(|f| f.expense(expense_id).is_some())?;
    ledger::restore(&mut freight.expenses, expense_id)?;
    freight.recompute_derived();
    freight.updated_at = Utc::now();
    Some(freight.id)
}

fn purge_nested(ledger: &mut crate::Ledger, expense_id: Uuid) -> Option<Uuid> {
    let freight = ledger
        .freights
        .iter_mut()
        .filter(|f| !f.is_deleted())
        .find(|f| f.expense(expense_id).is_some())?;
    ledger::purge(&mut freight.expenses, expense_id)?;
    freight.recompute_derived();
    freight.updated_at = Utc::now();
    Some(freight.id)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        ExpenseCategory, MoneyCents, commands::LoadExpenseNew,
        ops::freights::tests::new_cmd, test_support,
    };

    use super::RecycleKind;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[tokio::test]
    async fn bin_lists_every_kind_and_nested_lines_of_live_parents() {
        let (mut engine, _dir) = test_support::engine().await;
        let freight_id = engine
            .new_freight("carol", new_cmd("L-100", day(2), 100_000))
            .await
            .unwrap();
        let expense_id = engine
            .add_load_expense(
                "carol",
                freight_id,
                LoadExpenseNew {
                    category: ExpenseCategory::from("fuel"),
                    description: "fill up".to_string(),
                    amount: MoneyCents::new(5_000),
                    date: None,
                },
            )
            .await
            .unwrap();
        engine
            .delete_load_expense("carol", freight_id, expense_id)
            .await
            .unwrap();

        let bin = engine.recycle_bin("carol");
        assert_eq!(bin.len(), 1);
        assert_eq!(bin[0].kind, RecycleKind::Expense);
        assert_eq!(bin[0].freight_id, Some(freight_id));

        // Once the parent goes to the bin, the nested line travels with it.
        engine.delete_freight("carol", freight_id).await.unwrap();
        let bin = engine.recycle_bin("carol");
        assert_eq!(bin.len(), 1);
        assert_eq!(bin[0].kind, RecycleKind::Freight);
    }

    #[tokio::test]
    async fn nested_restore_needs_a_live_parent() {
        let (mut engine, _dir) = test_support::engine().await;
        let freight_id = engine
            .new_freight("carol", new_cmd("L-100", day(2), 100_000))
            .await
            .unwrap();
        let expense_id = engine
            .add_load_expense(
                "carol",
                freight_id,
                LoadExpenseNew {
                    category: ExpenseCategory::from("fuel"),
                    description: "fill up".to_string(),
                    amount: MoneyCents::new(5_000),
                    date: None,
                },
            )
            .await
            .unwrap();
        engine
            .delete_load_expense("carol", freight_id, expense_id)
            .await
            .unwrap();
        engine.delete_freight("carol", freight_id).await.unwrap();

        // Parent is in the bin: restoring the nested line is a no-op.
        engine
            .restore_recycled("carol", RecycleKind::Expense, expense_id)
            .await
            .unwrap();
        let freight = engine.freight("carol", freight_id).unwrap();
        assert!(freight.expenses[0].is_deleted);

        engine
            .restore_recycled("carol", RecycleKind::Freight, freight_id)
            .await
            .unwrap();
        engine
            .restore_recycled("carol", RecycleKind::Expense, expense_id)
            .await
            .unwrap();
        let freight = engine.freight("carol", freight_id).unwrap();
        assert!(!freight.expenses[0].is_deleted);
        assert_eq!(freight.total_expenses.cents(), 5_000);
    }

    #[tokio::test]
    async fn purge_by_kind_ignores_unknown_ids() {
        let (mut engine, _dir) = test_support::engine().await;
        engine
            .purge_recycled("carol", RecycleKind::Driver, uuid::Uuid::new_v4())
            .await
            .unwrap();
        engine
            .restore_recycled("carol", RecycleKind::Asset, uuid::Uuid::new_v4())
            .await
            .unwrap();
    }
}
