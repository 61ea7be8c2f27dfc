//! The `Ledger` holds one user's collections. Collections are ordered newest
//! first and are mutated only through the engine operations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    assets::Asset, categories::CustomCategory, drivers::Driver, expenses::StandaloneExpense,
    freights::Freight, home::HomeTransaction,
};

/// Soft-delete lifecycle shared by every recoverable record.
///
/// State machine: Active →(`bury`)→ Deleted →(`exhume`)→ Active. Burying an
/// already-buried record or exhuming a live one is a no-op, so double clicks
/// and stale recycle-bin views cannot corrupt timestamps.
pub trait Tombstone {
    fn is_deleted(&self) -> bool;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn bury(&mut self, at: DateTime<Utc>);
    fn exhume(&mut self);
}

/// Identity lookup shared by all ledger records.
pub trait HasId {
    fn record_id(&self) -> Uuid;
}

macro_rules! impl_has_id {
    ($($ty:ty),+ $(,)?) => {
        $(impl HasId for $ty {
            fn record_id(&self) -> Uuid {
                self.id
            }
        })+
    };
}

impl_has_id!(
    Freight,
    Asset,
    Driver,
    StandaloneExpense,
    HomeTransaction,
    CustomCategory,
    crate::freights::LoadExpense,
);

/// One user's books.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    pub user_id: String,
    pub freights: Vec<Freight>,
    pub assets: Vec<Asset>,
    pub drivers: Vec<Driver>,
    pub expenses: Vec<StandaloneExpense>,
    pub home: Vec<HomeTransaction>,
    pub categories: Vec<CustomCategory>,
}

impl Ledger {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Self::default()
        }
    }
}

/// Find a record by id.
pub fn find<T: HasId>(items: &[T], id: Uuid) -> Option<&T> {
    items.iter().find(|item| item.record_id() == id)
}

/// Find a record by id, mutable.
pub fn find_mut<T: HasId>(items: &mut [T], id: Uuid) -> Option<&mut T> {
    items.iter_mut().find(|item| item.record_id() == id)
}

/// Marks a record deleted. Returns the record when it exists; a second call
/// leaves the original `deleted_at` untouched.
pub fn soft_delete<T: HasId + Tombstone>(
    items: &mut [T],
    id: Uuid,
    at: DateTime<Utc>,
) -> Option<&T> {
    let item = find_mut(items, id)?;
    if !item.is_deleted() {
        item.bury(at);
    }
    Some(item)
}

/// Clears the tombstone. A record that is not deleted is left untouched.
pub fn restore<T: HasId + Tombstone>(items: &mut [T], id: Uuid) -> Option<&T> {
    let item = find_mut(items, id)?;
    if item.is_deleted() {
        item.exhume();
    }
    Some(item)
}

/// Removes a record for good. A missing id is a no-op, never an error: the
/// recycle bin may race the user or another session.
pub fn purge<T: HasId>(items: &mut Vec<T>, id: Uuid) -> Option<T> {
    let index = items.iter().position(|item| item.record_id() == id)?;
    Some(items.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freights::tests::freight;

    #[test]
    fn soft_delete_then_restore_round_trips() {
        let original = freight(100_000, 0);
        let id = original.id;
        let mut items = vec![original.clone()];

        soft_delete(&mut items, id, Utc::now()).unwrap();
        assert!(items[0].is_deleted);
        assert!(items[0].deleted_at.is_some());

        restore(&mut items, id).unwrap();
        assert_eq!(items[0], original);
    }

    #[test]
    fn second_soft_delete_keeps_the_first_timestamp() {
        let record = freight(100_000, 0);
        let id = record.id;
        let mut items = vec![record];

        let first = chrono::DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        soft_delete(&mut items, id, first).unwrap();
        soft_delete(&mut items, id, Utc::now()).unwrap();
        assert_eq!(items[0].deleted_at, Some(first));
    }

    #[test]
    fn purge_is_terminal_and_safe_to_repeat() {
        let record = freight(100_000, 0);
        let id = record.id;
        let mut items = vec![record];

        assert!(purge(&mut items, id).is_some());
        assert!(items.is_empty());
        assert!(purge(&mut items, id).is_none());
        assert!(restore(&mut items, id).is_none());
    }

    #[test]
    fn restore_of_a_live_record_is_a_no_op() {
        let record = freight(100_000, 0);
        let id = record.id;
        let mut items = vec![record.clone()];

        restore(&mut items, id).unwrap();
        assert_eq!(items[0], record);
    }
}
