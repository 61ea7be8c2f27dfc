//! Freight operations: CRUD, the soft-delete lifecycle, nested expense
//! lines and comments.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine,
    commands::{CommentNew, FreightNew, FreightPatch, LoadExpenseNew, LoadExpensePatch},
    freights::{Freight, LoadComment, LoadExpense},
    ledger::{self, Tombstone},
    util,
};

use super::ListCursor;

/// One page of the freight list, newest first.
#[derive(Clone, Debug)]
pub struct FreightPage {
    pub freights: Vec<Freight>,
    pub next_cursor: Option<String>,
}

impl Engine {
    /// Creates a freight. Driver and asset references are resolved against
    /// the live collections and their names are snapshotted here; the
    /// snapshot is never refreshed afterwards.
    pub async fn new_freight(&mut self, user_id: &str, cmd: FreightNew) -> ResultEngine<Uuid> {
        let label = util::normalize_required_text(&cmd.label, "freight label")?;
        let (driver_id, driver_name) = match cmd.driver_id {
            Some(id) => {
                let (id, name) = self.driver_snapshot(user_id, id)?;
                (Some(id), Some(name))
            }
            None => (None, None),
        };
        let (asset_id, asset_name) = match cmd.asset_id {
            Some(id) => {
                let (id, name) = self.asset_snapshot(user_id, id)?;
                (Some(id), Some(name))
            }
            None => (None, None),
        };

        let comments = cmd
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| vec![LoadComment::manual(text, &cmd.author, None)])
            .unwrap_or_default();

        let mut freight = Freight {
            id: Uuid::new_v4(),
            label,
            origin: cmd.origin.trim().to_string(),
            destination: cmd.destination.trim().to_string(),
            distance_miles: cmd.distance_miles,
            weight_lbs: cmd.weight_lbs,
            date: cmd.date,
            driver_id,
            driver_name,
            asset_id,
            asset_name,
            line_haul: cmd.line_haul,
            fuel_surcharge: cmd.fuel_surcharge,
            loading: cmd.loading,
            unloading: cmd.unloading,
            accessorials: cmd.accessorials,
            owner_percentage: cmd
                .owner_percentage
                .unwrap_or(crate::freights::DEFAULT_OWNER_PERCENTAGE),
            revenue: crate::MoneyCents::ZERO,
            owner_amount: crate::MoneyCents::ZERO,
            total_expenses: crate::MoneyCents::ZERO,
            net_profit: crate::MoneyCents::ZERO,
            expenses: Vec::new(),
            comments,
            status: cmd.status,
            is_deleted: false,
            deleted_at: None,
            updated_at: Utc::now(),
        };
        freight.validate()?;
        freight.recompute_derived();
        let freight_id = freight.id;

        self.ledger_mut(user_id).freights.insert(0, freight);
        self.persist_freight(user_id, freight_id).await;
        Ok(freight_id)
    }

    /// Returns one freight, deleted or not. The recycle bin links here.
    pub fn freight(&self, user_id: &str, freight_id: Uuid) -> ResultEngine<Freight> {
        self.ledger(user_id)
            .and_then(|ledger| ledger::find(&ledger.freights, freight_id))
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound("freight not exists".to_string()))
    }

    /// Lists live freights newest first with cursor pagination.
    pub fn list_freights(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResultEngine<FreightPage> {
        let limit = limit.clamp(1, 200);
        let mut live: Vec<&Freight> = self
            .ledger(user_id)
            .map(|ledger| {
                ledger
                    .freights
                    .iter()
                    .filter(|f| !f.is_deleted())
                    .collect()
            })
            .unwrap_or_default();
        live.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

        if let Some(cursor) = cursor {
            let cursor = ListCursor::decode(cursor)?;
            live.retain(|f| {
                f.date < cursor.date || (f.date == cursor.date && f.id < cursor.id)
            });
        }

        let has_more = live.len() > limit;
        live.truncate(limit);
        let next_cursor = if has_more {
            live.last()
                .map(|f| {
                    ListCursor {
                        date: f.date,
                        id: f.id,
                    }
                    .encode()
                })
                .transpose()?
        } else {
            None
        };

        Ok(FreightPage {
            freights: live.into_iter().cloned().collect(),
            next_cursor,
        })
    }

    /// Applies a patch to a live freight. Any edit that touches a revenue
    /// component requires a non-empty edit note, appended as a System
    /// comment.
    pub async fn update_freight(
        &mut self,
        user_id: &str,
        freight_id: Uuid,
        patch: FreightPatch,
    ) -> ResultEngine<()> {
        let edit_note = if patch.touches_revenue() {
            let note = patch
                .edit_note
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    EngineError::InvalidField(
                        "an edit note is required when changing revenue figures".to_string(),
                    )
                })?;
            Some(note.to_string())
        } else {
            patch
                .edit_note
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        };

        let driver = match patch.driver_id {
            Some(Some(id)) => Some(Some(self.driver_snapshot(user_id, id)?)),
            Some(None) => Some(None),
            None => None,
        };
        let asset = match patch.asset_id {
            Some(Some(id)) => Some(Some(self.asset_snapshot(user_id, id)?)),
            Some(None) => Some(None),
            None => None,
        };

        // Merge into a copy so validation failures leave the ledger intact.
        let mut updated = self.live_freight(user_id, freight_id)?.clone();
        if let Some(label) = patch.label {
            updated.label = util::normalize_required_text(&label, "freight label")?;
        }
        if let Some(origin) = patch.origin {
            updated.origin = origin.trim().to_string();
        }
        if let Some(destination) = patch.destination {
            updated.destination = destination.trim().to_string();
        }
        if let Some(distance) = patch.distance_miles {
            updated.distance_miles = distance;
        }
        if let Some(weight) = patch.weight_lbs {
            updated.weight_lbs = weight;
        }
        if let Some(date) = patch.date {
            updated.date = date;
        }
        match driver {
            Some(Some((id, name))) => {
                updated.driver_id = Some(id);
                updated.driver_name = Some(name);
            }
            Some(None) => {
                updated.driver_id = None;
                updated.driver_name = None;
            }
            None => {}
        }
        match asset {
            Some(Some((id, name))) => {
                updated.asset_id = Some(id);
                updated.asset_name = Some(name);
            }
            Some(None) => {
                updated.asset_id = None;
                updated.asset_name = None;
            }
            None => {}
        }
        if let Some(line_haul) = patch.line_haul {
            updated.line_haul = line_haul;
        }
        if let Some(fuel_surcharge) = patch.fuel_surcharge {
            updated.fuel_surcharge = fuel_surcharge;
        }
        if let Some(loading) = patch.loading {
            updated.loading = loading;
        }
        if let Some(unloading) = patch.unloading {
            updated.unloading = unloading;
        }
        if let Some(accessorials) = patch.accessorials {
            updated.accessorials = accessorials;
        }
        if let Some(pct) = patch.owner_percentage {
            updated.owner_percentage = pct;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        updated.validate()?;
        updated.recompute_derived();
        if let Some(note) = edit_note {
            updated
                .comments
                .insert(0, LoadComment::system(&note, &patch.author));
        }
        updated.updated_at = Utc::now();

        *self.live_freight_mut(user_id, freight_id)? = updated;
        self.persist_freight(user_id, freight_id).await;
        Ok(())
    }

    /// Moves a freight to the recycle bin. A second call is a no-op and
    /// keeps the original `deleted_at`.
    pub async fn delete_freight(&mut self, user_id: &str, freight_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        ledger::soft_delete(&mut ledger.freights, freight_id, Utc::now())
            .ok_or_else(|| EngineError::KeyNotFound("freight not exists".to_string()))?;
        self.persist_freight(user_id, freight_id).await;
        Ok(())
    }

    /// Brings a freight back from the recycle bin. Restoring a live freight
    /// is a no-op.
    pub async fn restore_freight(&mut self, user_id: &str, freight_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        ledger::restore(&mut ledger.freights, freight_id)
            .ok_or_else(|| EngineError::KeyNotFound("freight not exists".to_string()))?;
        self.persist_freight(user_id, freight_id).await;
        Ok(())
    }

    /// Removes a freight for good, straight from any state. A missing id is
    /// a silent no-op.
    pub async fn purge_freight(&mut self, user_id: &str, freight_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        if ledger::purge(&mut ledger.freights, freight_id).is_some() {
            self.persist_freight(user_id, freight_id).await;
        }
        Ok(())
    }

    /// Appends an expense line and recomputes the parent's derived figures.
    pub async fn add_load_expense(
        &mut self,
        user_id: &str,
        freight_id: Uuid,
        cmd: LoadExpenseNew,
    ) -> ResultEngine<Uuid> {
        let description = util::normalize_required_text(&cmd.description, "expense description")?;
        let expense = LoadExpense::new(cmd.category, &description, cmd.amount, cmd.date)?;
        let expense_id = expense.id;

        let freight = self.live_freight_mut(user_id, freight_id)?;
        freight.expenses.push(expense);
        freight.recompute_derived();
        freight.updated_at = Utc::now();

        self.persist_freight(user_id, freight_id).await;
        Ok(expense_id)
    }

    /// Patches an expense line in place and recomputes the parent.
    pub async fn update_load_expense(
        &mut self,
        user_id: &str,
        freight_id: Uuid,
        expense_id: Uuid,
        patch: LoadExpensePatch,
    ) -> ResultEngine<()> {
        if let Some(amount) = patch.amount {
            util::validate_positive(amount, "expense amount")?;
        }
        let description = patch
            .description
            .map(|d| util::normalize_required_text(&d, "expense description"))
            .transpose()?;

        let freight = self.live_freight_mut(user_id, freight_id)?;
        let expense = freight
            .expense_mut(expense_id)
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
        freight.recompute_derived();
        freight.updated_at = Utc::now();

        self.persist_freight(user_id, freight_id).await;
        Ok(())
    }

    /// Soft-deletes an expense line. The line stays in the array for the
    /// recycle bin; the parent's totals drop immediately.
    pub async fn delete_load_expense(
        &mut self,
        user_id: &str,
        freight_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<()> {
        let freight = self.live_freight_mut(user_id, freight_id)?;
        ledger::soft_delete(&mut freight.expenses, expense_id, Utc::now())
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        freight.recompute_derived();
        freight.updated_at = Utc::now();

        self.persist_freight(user_id, freight_id).await;
        Ok(())
    }

    /// Restores a soft-deleted expense line. The parent freight must be
    /// live.
    pub async fn restore_load_expense(
        &mut self,
        user_id: &str,
        freight_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<()> {
        let freight = self.live_freight_mut(user_id, freight_id)?;
        ledger::restore(&mut freight.expenses, expense_id)
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        freight.recompute_derived();
        freight.updated_at = Utc::now();

        self.persist_freight(user_id, freight_id).await;
        Ok(())
    }

    /// Removes an expense line for good. Missing parent or line is a silent
    /// no-op. Purging an already-deleted line cannot re-subtract: the
    /// recompute only counts live entries.
    pub async fn purge_load_expense(
        &mut self,
        user_id: &str,
        freight_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<()> {
        let Ok(freight) = self.live_freight_mut(user_id, freight_id) else {
            return Ok(());
        };
        if ledger::purge(&mut freight.expenses, expense_id).is_none() {
            return Ok(());
        }
        freight.recompute_derived();
        freight.updated_at = Utc::now();

        self.persist_freight(user_id, freight_id).await;
        Ok(())
    }

    /// Appends a manual comment at the head.
    pub async fn add_freight_comment(
        &mut self,
        user_id: &str,
        freight_id: Uuid,
        cmd: CommentNew,
    ) -> ResultEngine<Uuid> {
        let text = util::normalize_required_text(&cmd.text, "comment")?;
        let comment = LoadComment::manual(&text, &cmd.author, cmd.event_date);
        let comment_id = comment.id;

        let freight = self.live_freight_mut(user_id, freight_id)?;
        freight.comments.insert(0, comment);
        freight.updated_at = Utc::now();

        self.persist_freight(user_id, freight_id).await;
        Ok(comment_id)
    }

    fn live_freight(&self, user_id: &str, freight_id: Uuid) -> ResultEngine<&Freight> {
        self.ledger(user_id)
            .and_then(|ledger| ledger::find(&ledger.freights, freight_id))
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| EngineError::KeyNotFound("freight not exists".to_string()))
    }

    fn live_freight_mut(&mut self, user_id: &str, freight_id: Uuid) -> ResultEngine<&mut Freight> {
        let ledger = self.ledger_mut(user_id);
        ledger::find_mut(&mut ledger.freights, freight_id)
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| EngineError::KeyNotFound("freight not exists".to_string()))
    }

    pub(crate) fn driver_snapshot(
        &self,
        user_id: &str,
        driver_id: Uuid,
    ) -> ResultEngine<(Uuid, String)> {
        self.ledger(user_id)
            .and_then(|ledger| ledger::find(&ledger.drivers, driver_id))
            .filter(|d| !d.is_deleted())
            .map(|d| (d.id, d.name.clone()))
            .ok_or_else(|| EngineError::KeyNotFound("driver not exists".to_string()))
    }

    pub(crate) fn asset_snapshot(
        &self,
        user_id: &str,
        asset_id: Uuid,
    ) -> ResultEngine<(Uuid, String)> {
        self.ledger(user_id)
            .and_then(|ledger| ledger::find(&ledger.assets, asset_id))
            .filter(|a| !a.is_deleted())
            .map(|a| (a.id, a.identifier.clone()))
            .ok_or_else(|| EngineError::KeyNotFound("asset not exists".to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use crate::{
        CommentKind, ExpenseCategory, FreightStatus, MoneyCents, StoreEvent,
        commands::{FreightNew, FreightPatch, LoadExpenseNew},
        test_support,
    };

    pub(crate) fn new_cmd(label: &str, date: NaiveDate, line_haul: i64) -> FreightNew {
        FreightNew {
            label: label.to_string(),
            origin: "Columbus, OH".to_string(),
            destination: "Nashville, TN".to_string(),
            distance_miles: 380.0,
            weight_lbs: 42_000.0,
            date,
            driver_id: None,
            asset_id: None,
            line_haul: MoneyCents::new(line_haul),
            fuel_surcharge: MoneyCents::ZERO,
            loading: MoneyCents::ZERO,
            unloading: MoneyCents::ZERO,
            accessorials: MoneyCents::ZERO,
            owner_percentage: None,
            status: FreightStatus::Delivered,
            comment: Some("booked".to_string()),
            author: "dispatch".to_string(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_freight("carol", new_cmd("L-100", day(2), 100_000))
            .await
            .unwrap();

        let freight = engine.freight("carol", id).unwrap();
        assert_eq!(freight.label, "L-100");
        assert_eq!(freight.owner_amount.cents(), 65_000);
        assert_eq!(freight.comments.len(), 1);
    }

    #[tokio::test]
    async fn revenue_edit_without_note_is_rejected() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_freight("carol", new_cmd("L-100", day(2), 100_000))
            .await
            .unwrap();

        let patch = FreightPatch {
            line_haul: Some(MoneyCents::new(120_000)),
            author: "carol".to_string(),
            ..FreightPatch::default()
        };
        let err = engine.update_freight("carol", id, patch).await.unwrap_err();
        assert!(matches!(err, crate::EngineError::InvalidField(_)));
        // Nothing changed.
        assert_eq!(engine.freight("carol", id).unwrap().line_haul.cents(), 100_000);
    }

    #[tokio::test]
    async fn revenue_edit_with_note_recomputes_and_logs_a_system_comment() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_freight("carol", new_cmd("L-100", day(2), 100_000))
            .await
            .unwrap();

        let patch = FreightPatch {
            line_haul: Some(MoneyCents::new(120_000)),
            edit_note: Some("broker bumped the rate".to_string()),
            author: "carol".to_string(),
            ..FreightPatch::default()
        };
        engine.update_freight("carol", id, patch).await.unwrap();

        let freight = engine.freight("carol", id).unwrap();
        assert_eq!(freight.revenue.cents(), 120_000);
        assert_eq!(freight.owner_amount.cents(), 78_000);
        assert_eq!(freight.comments[0].kind, CommentKind::System);
        assert_eq!(freight.comments[0].text, "broker bumped the rate");
    }

    #[tokio::test]
    async fn second_soft_delete_keeps_the_first_deleted_at() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_freight("carol", new_cmd("L-100", day(2), 100_000))
            .await
            .unwrap();

        engine.delete_freight("carol", id).await.unwrap();
        let first = engine.freight("carol", id).unwrap().deleted_at.unwrap();
        engine.delete_freight("carol", id).await.unwrap();
        assert_eq!(engine.freight("carol", id).unwrap().deleted_at, Some(first));

        engine.restore_freight("carol", id).await.unwrap();
        let freight = engine.freight("carol", id).unwrap();
        assert!(!freight.is_deleted);
        assert!(freight.deleted_at.is_none());
    }

    #[tokio::test]
    async fn purge_of_a_missing_id_is_silent() {
        let (mut engine, _dir) = test_support::engine().await;
        engine
            .purge_freight("carol", uuid::Uuid::new_v4())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn nested_expense_lifecycle_tracks_parent_totals() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_freight("carol", new_cmd("L-100", day(2), 100_000))
            .await
            .unwrap();
        let expense_id = engine
            .add_load_expense(
                "carol",
                id,
                LoadExpenseNew {
                    category: ExpenseCategory::from("fuel"),
                    description: "fill up".to_string(),
                    amount: MoneyCents::new(5_000),
                    date: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(engine.freight("carol", id).unwrap().net_profit.cents(), 60_000);

        engine
            .delete_load_expense("carol", id, expense_id)
            .await
            .unwrap();
        assert_eq!(engine.freight("carol", id).unwrap().net_profit.cents(), 65_000);

        engine
            .restore_load_expense("carol", id, expense_id)
            .await
            .unwrap();
        assert_eq!(engine.freight("carol", id).unwrap().net_profit.cents(), 60_000);

        // Purge from the deleted state must not subtract twice.
        engine
            .delete_load_expense("carol", id, expense_id)
            .await
            .unwrap();
        engine
            .purge_load_expense("carol", id, expense_id)
            .await
            .unwrap();
        let freight = engine.freight("carol", id).unwrap();
        assert!(freight.expenses.is_empty());
        assert_eq!(freight.net_profit.cents(), 65_000);
    }

    #[tokio::test]
    async fn failed_persist_keeps_the_mutation_and_notifies() {
        let mut engine = test_support::failing_engine();
        let mut events = engine.subscribe();

        let id = engine
            .new_freight("carol", new_cmd("L-100", day(2), 100_000))
            .await
            .unwrap();
        // The write failed remotely but the ledger kept the freight.
        assert_eq!(engine.freight("carol", id).unwrap().label, "L-100");
        assert!(matches!(
            events.try_recv().unwrap(),
            StoreEvent::WriteFailed { .. }
        ));
    }

    #[tokio::test]
    async fn list_paginates_newest_first() {
        let (mut engine, _dir) = test_support::engine().await;
        for d in 1..=5 {
            engine
                .new_freight("carol", new_cmd(&format!("L-10{d}"), day(d), 100_000))
                .await
                .unwrap();
        }

        let first = engine.list_freights("carol", 3, None).unwrap();
        assert_eq!(first.freights.len(), 3);
        assert_eq!(first.freights[0].date, day(5));
        let cursor = first.next_cursor.unwrap();

        let second = engine.list_freights("carol", 3, Some(&cursor)).unwrap();
        assert_eq!(second.freights.len(), 2);
        assert_eq!(second.freights[1].date, day(1));
        assert!(second.next_cursor.is_none());
    }
}
