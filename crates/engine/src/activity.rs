//! Activity feed projector.
//!
//! A pure derivation over the freight and standalone-expense collections:
//! safe to call on every read, never mutates. Event ids are deterministic
//! (source id plus a type prefix) so re-projection is idempotent and
//! diffable, and the ordering is total: date descending, id ascending as the
//! tiebreak, so ties never reorder between recomputations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    MoneyCents,
    expenses::StandaloneExpense,
    freights::{CommentKind, Freight, FreightStatus},
    ledger::Tombstone,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Revenue,
    Expense,
    Update,
}

/// Where an event links back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityLink {
    Freight { id: Uuid },
    Expense { id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Deterministic: `rev-`/`exp-`/`note-` plus the source record id.
    pub id: String,
    pub kind: ActivityKind,
    pub date: NaiveDate,
    pub title: String,
    /// Signed: positive for revenue, negative for expenses, zero for notes.
    pub amount: MoneyCents,
    /// Display label: load status, expense category, or note kind.
    pub status: String,
    pub link: Option<ActivityLink>,
}

impl ActivityEvent {
    /// Presentation classification only; carries no semantics.
    pub fn presentation(&self) -> &'static str {
        match self.kind {
            ActivityKind::Revenue => "inflow",
            ActivityKind::Expense => "outflow",
            ActivityKind::Update => "note",
        }
    }
}

/// Feed filters, all optional and combined with AND.
#[derive(Clone, Debug, Default)]
pub struct ActivityFilter {
    /// Case-insensitive substring over the title.
    pub search: Option<String>,
    /// Allow-list of kinds.
    pub kinds: Option<Vec<ActivityKind>>,
    /// Inclusive date range.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ActivityFilter {
    fn keeps(&self, event: &ActivityEvent) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !event.title.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(kinds) = &self.kinds
            && !kinds.contains(&event.kind)
        {
            return false;
        }
        if self.from.is_some_and(|from| event.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| event.date > to) {
            return false;
        }
        true
    }
}

fn note_label(kind: CommentKind) -> &'static str {
    match kind {
        CommentKind::System => "System",
        CommentKind::Manual => "Note",
    }
}

/// Projects the full feed, newest first.
pub fn project(freights: &[Freight], standalone: &[StandaloneExpense]) -> Vec<ActivityEvent> {
    let mut events = Vec::new();

    for freight in freights.iter().filter(|f| !f.is_deleted()) {
        if freight.status == FreightStatus::Delivered {
            events.push(ActivityEvent {
                id: format!("rev-{}", freight.id),
                kind: ActivityKind::Revenue,
                date: freight.date,
                title: format!(
                    "Load {}: {} to {}",
                    freight.label, freight.origin, freight.destination
                ),
                amount: freight.owner_amount,
                status: freight.status.as_str().to_string(),
                link: Some(ActivityLink::Freight { id: freight.id }),
            });
        }

        for expense in freight.expenses.iter().filter(|e| !e.is_deleted()) {
            events.push(ActivityEvent {
                id: format!("exp-{}", expense.id),
                kind: ActivityKind::Expense,
                date: expense.date.unwrap_or(freight.date),
                title: expense.description.clone(),
                amount: -expense.amount,
                status: expense.category.name().to_string(),
                link: Some(ActivityLink::Freight { id: freight.id }),
            });
        }

        for comment in &freight.comments {
            events.push(ActivityEvent {
                id: format!("note-{}", comment.id),
                kind: ActivityKind::Update,
                date: comment.event_date.unwrap_or(comment.created_at.date_naive()),
                title: comment.text.clone(),
                amount: MoneyCents::ZERO,
                status: note_label(comment.kind).to_string(),
                link: Some(ActivityLink::Freight { id: freight.id }),
            });
        }
    }

    for expense in standalone.iter().filter(|e| !e.is_deleted()) {
        events.push(ActivityEvent {
            id: format!("exp-{}", expense.id),
            kind: ActivityKind::Expense,
            date: expense.date,
            title: expense.description.clone(),
            amount: -expense.amount,
            status: expense.category.name().to_string(),
            link: Some(ActivityLink::Expense { id: expense.id }),
        });

        for comment in &expense.comments {
            events.push(ActivityEvent {
                id: format!("note-{}", comment.id),
                kind: ActivityKind::Update,
                date: comment.event_date.unwrap_or(comment.created_at.date_naive()),
                title: comment.text.clone(),
                amount: MoneyCents::ZERO,
                status: note_label(comment.kind).to_string(),
                link: Some(ActivityLink::Expense { id: expense.id }),
            });
        }
    }

    events.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    events
}

/// Projects and filters in one pass.
pub fn project_filtered(
    freights: &[Freight],
    standalone: &[StandaloneExpense],
    filter: &ActivityFilter,
) -> Vec<ActivityEvent> {
    project(freights, standalone)
        .into_iter()
        .filter(|event| filter.keeps(event))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::categories::ExpenseCategory;
    use crate::expenses::ExpenseLink;
    use crate::freights::{LoadExpense, tests::freight};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn standalone(cents: i64, date: NaiveDate, description: &str) -> StandaloneExpense {
        StandaloneExpense {
            id: uuid::Uuid::new_v4(),
            category: ExpenseCategory::from("insurance"),
            description: description.to_string(),
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
    fn feed_is_newest_first() {
        let mut old = freight(10_000, 0);
        old.date = day(1);
        old.comments.clear();
        let mut new = freight(20_000, 0);
        new.date = day(20);
        new.comments.clear();

        let events = project(&[old, new], &[]);
        assert_eq!(events.len(), 2);
        assert!(events[0].date > events[1].date);
        assert_eq!(events[0].amount.cents(), 13_000);
    }

    #[test]
    fn ties_keep_the_same_order_across_calls() {
        let mut a = freight(10_000, 0);
        a.date = day(10);
        a.comments.clear();
        let mut b = freight(20_000, 0);
        b.date = day(10);
        b.comments.clear();
        let freights = vec![a, b];

        let first = project(&freights, &[]);
        let second = project(&freights, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn ids_are_deterministic_and_prefixed() {
        let mut load = freight(10_000, 0);
        load.comments.clear();
        load.expenses
            .push(LoadExpense::new(ExpenseCategory::from("fuel"), "fill", 100.into(), None).unwrap());
        let expense_id = load.expenses[0].id;
        let load_id = load.id;

        let events = project(&[load], &[]);
        assert!(events.iter().any(|e| e.id == format!("rev-{load_id}")));
        assert!(events.iter().any(|e| e.id == format!("exp-{expense_id}")));
    }

    #[test]
    fn load_expense_without_date_falls_back_to_the_load_date() {
        let mut load = freight(10_000, 0);
        load.date = day(7);
        load.comments.clear();
        load.status = crate::freights::FreightStatus::InRoute;
        load.expenses
            .push(LoadExpense::new(ExpenseCategory::from("fuel"), "fill", 100.into(), None).unwrap());

        let events = project(&[load], &[]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, day(7));
        assert_eq!(events[0].amount.cents(), -100);
    }

    #[test]
    fn comments_become_zero_amount_updates() {
        let load = freight(10_000, 0);
        let events = project(&[load], &[]);
        let note = events
            .iter()
            .find(|e| e.kind == ActivityKind::Update)
            .unwrap();
        assert!(note.amount.is_zero());
        assert_eq!(note.status, "Note");
    }

    #[test]
    fn filters_compose_with_and() {
        let mut load = freight(10_000, 0);
        load.date = day(10);
        load.comments.clear();
        let fuel = standalone(500, day(12), "Tank fill");
        let toll = standalone(300, day(25), "Toll pass");

        let filter = ActivityFilter {
            search: Some("tank".to_string()),
            kinds: Some(vec![ActivityKind::Expense]),
            from: Some(day(1)),
            to: Some(day(20)),
        };
        let events = project_filtered(&[load], &[fuel, toll], &filter);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Tank fill");
    }

    #[test]
    fn deleted_sources_emit_nothing() {
        let mut load = freight(10_000, 0);
        load.is_deleted = true;
        let mut gone = standalone(500, day(12), "old");
        gone.is_deleted = true;

        assert!(project(&[load], &[gone]).is_empty());
    }
}
