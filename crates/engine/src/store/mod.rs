//! Persistence behind the in-memory ledgers.
//!
//! The engine serves every read from memory and writes through to one of two
//! backends: a SQL database via sea-orm, or a per-user JSON directory when no
//! database is configured. Writes are optimistic with no rollback: the ledger
//! mutates first, the backend write follows, and a failed write is reported
//! through [`StoreEvent::WriteFailed`] while the in-memory state stands.

mod local;

pub use local::LocalStore;

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, assets::Asset, categories::CustomCategory, drivers::Driver,
    expenses::StandaloneExpense, freights::Freight, home::HomeTransaction, ledger::Ledger, users,
};

/// How the engine reconciles memory and storage on a failed write.
///
/// There is a single mode today. Reads never block on the backend and a
/// backend failure never unwinds an applied mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsistencyMode {
    #[default]
    OptimisticNoRollback,
}

/// The entity collections a user's ledger is split into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Freights,
    Assets,
    Drivers,
    Expenses,
    Home,
    Categories,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Freights => "freights",
            Self::Assets => "assets",
            Self::Drivers => "drivers",
            Self::Expenses => "expenses",
            Self::Home => "home",
            Self::Categories => "categories",
        }
    }

    /// Storage key of the collection in the local backend.
    fn key(self) -> &'static str {
        match self {
            Self::Freights => "freights.v1.json",
            Self::Assets => "assets.v1.json",
            Self::Drivers => "drivers.v1.json",
            Self::Expenses => "expenses.v1.json",
            Self::Home => "home.v1.json",
            Self::Categories => "categories.v1.json",
        }
    }
}

/// Broadcast to subscribers after every write attempt.
#[derive(Clone, Debug)]
pub enum StoreEvent {
    Saved {
        user_id: String,
        collection: Collection,
    },
    WriteFailed {
        user_id: String,
        collection: Collection,
        message: String,
    },
}

/// A write-through backend for ledger collections.
///
/// Save and delete calls take both the changed record and the full collection
/// snapshot: the database backend upserts the single row, the local backend
/// rewrites the collection file.
pub enum Store {
    Database(DatabaseConnection),
    Local(LocalStore),
    /// Rejects every write. Only used to exercise the no-rollback path.
    #[cfg(test)]
    Failing,
}

macro_rules! persisted_collection {
    ($save:ident, $delete:ident, $ty:ty, $module:ident, $collection:expr) => {
        pub async fn $save(
            &self,
            user_id: &str,
            record: &$ty,
            snapshot: &[$ty],
        ) -> ResultEngine<()> {
            match self {
                Self::Database(db) => {
                    let exists = crate::$module::Entity::find_by_id(record.id.to_string())
                        .one(db)
                        .await?
                        .is_some();
                    let mut active = crate::$module::ActiveModel::from(record);
                    active.user_id = ActiveValue::Set(user_id.to_string());
                    if exists {
                        active.update(db).await?;
                    } else {
                        active.insert(db).await?;
                    }
                    Ok(())
                }
                Self::Local(store) => store.write_collection(user_id, $collection.key(), snapshot),
                #[cfg(test)]
                Self::Failing => Err(EngineError::Storage("injected write failure".to_string())),
            }
        }

        pub async fn $delete(
            &self,
            user_id: &str,
            id: Uuid,
            snapshot: &[$ty],
        ) -> ResultEngine<()> {
            match self {
                Self::Database(db) => {
                    crate::$module::Entity::delete_by_id(id.to_string())
                        .exec(db)
                        .await?;
                    Ok(())
                }
                Self::Local(store) => store.write_collection(user_id, $collection.key(), snapshot),
                #[cfg(test)]
                Self::Failing => Err(EngineError::Storage("injected write failure".to_string())),
            }
        }
    };
}

macro_rules! load_collection {
    ($self:expr, $user_id:expr, $module:ident, $collection:expr) => {
        match $self {
            Store::Database(db) => crate::$module::Entity::find()
                .filter(crate::$module::Column::UserId.eq($user_id))
                .all(db)
                .await?
                .into_iter()
                .map(TryFrom::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            Store::Local(store) => store.read_collection($user_id, $collection.key())?,
            #[cfg(test)]
            Store::Failing => Vec::new(),
        }
    };
}

impl Store {
    pub fn consistency(&self) -> ConsistencyMode {
        ConsistencyMode::OptimisticNoRollback
    }

    persisted_collection!(save_freight, delete_freight, Freight, freights, Collection::Freights);
    persisted_collection!(save_asset, delete_asset, Asset, assets, Collection::Assets);
    persisted_collection!(save_driver, delete_driver, Driver, drivers, Collection::Drivers);
    persisted_collection!(
        save_expense,
        delete_expense,
        StandaloneExpense,
        expenses,
        Collection::Expenses
    );
    persisted_collection!(save_home, delete_home, HomeTransaction, home, Collection::Home);
    persisted_collection!(
        save_category,
        delete_category,
        CustomCategory,
        categories,
        Collection::Categories
    );

    /// Usernames with persisted state, used to hydrate ledgers at startup.
    pub async fn user_ids(&self) -> ResultEngine<Vec<String>> {
        match self {
            Self::Database(db) => Ok(users::Entity::find()
                .all(db)
                .await?
                .into_iter()
                .map(|user| user.username)
                .collect()),
            Self::Local(store) => store.user_ids(),
            #[cfg(test)]
            Self::Failing => Ok(Vec::new()),
        }
    }

    /// Loads one user's full ledger.
    pub async fn load_ledger(&self, user_id: &str) -> ResultEngine<Ledger> {
        Ok(Ledger {
            user_id: user_id.to_string(),
            freights: load_collection!(self, user_id, freights, Collection::Freights),
            assets: load_collection!(self, user_id, assets, Collection::Assets),
            drivers: load_collection!(self, user_id, drivers, Collection::Drivers),
            expenses: load_collection!(self, user_id, expenses, Collection::Expenses),
            home: load_collection!(self, user_id, home, Collection::Home),
            categories: load_collection!(self, user_id, categories, Collection::Categories),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freights::tests::freight;

    #[tokio::test]
    async fn local_store_round_trips_a_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::Local(LocalStore::new(dir.path()));
        let load = freight(100_000, 10_000);

        store
            .save_freight("carol", &load, &[load.clone()])
            .await
            .unwrap();
        let ledger = store.load_ledger("carol").await.unwrap();
        assert_eq!(ledger.freights, vec![load.clone()]);
        assert!(ledger.assets.is_empty());

        store.delete_freight("carol", load.id, &[]).await.unwrap();
        let ledger = store.load_ledger("carol").await.unwrap();
        assert!(ledger.freights.is_empty());
    }

    #[tokio::test]
    async fn failing_store_rejects_writes_but_loads_empty() {
        let store = Store::Failing;
        let load = freight(100_000, 0);
        assert!(store.save_freight("carol", &load, &[]).await.is_err());
        assert!(store.load_ledger("carol").await.unwrap().freights.is_empty());
    }
}
