use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;

pub use activity::{ActivityEvent, ActivityFilter, ActivityKind, ActivityLink};
pub use assets::{Asset, AssetKind};
pub use categories::{CustomCategory, ExpenseCategory, PredefinedCategory};
pub use commands::{
    AssetNew, AssetPatch, CommentNew, DriverNew, DriverPatch, ExpenseNew, ExpensePatch,
    FreightNew, FreightPatch, HomeNew, HomePatch, LoadExpenseNew, LoadExpensePatch,
};
pub use drivers::{Driver, PayRate};
pub use error::EngineError;
pub use expenses::{ExpenseLink, StandaloneExpense};
pub use finance::WindowTotals;
pub use freights::{
    CommentKind, DEFAULT_OWNER_PERCENTAGE, Freight, FreightStatus, LoadComment, LoadExpense,
};
pub use home::{HomeKind, HomeTransaction};
pub use ledger::{Ledger, Tombstone};
pub use money::MoneyCents;
pub use ops::FreightPage;
pub use ops::recycle::{RecycleEntry, RecycleKind};
pub use store::{Collection, ConsistencyMode, LocalStore, Store, StoreEvent};

pub mod activity;
mod assets;
mod categories;
mod commands;
mod drivers;
mod error;
mod expenses;
pub mod finance;
mod freights;
mod home;
pub mod ledger;
mod money;
mod ops;
mod store;
pub mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Event channel depth. Slow subscribers lag rather than block writers.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The bookkeeping core: every user's ledger in memory, a write-through
/// store behind it.
///
/// All reads are served from memory. Writes mutate the ledger first and then
/// persist; under [`ConsistencyMode::OptimisticNoRollback`] a failed persist
/// leaves the mutation in place and surfaces as a [`StoreEvent::WriteFailed`]
/// on the event channel.
pub struct Engine {
    ledgers: HashMap<String, Ledger>,
    store: Store,
    events: broadcast::Sender<StoreEvent>,
}

impl Engine {
    /// Return a builder for `Engine`.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Subscribe to write outcomes. Every persisted or failed write is
    /// broadcast here.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// A user's ledger, read-only. Unknown users read as an empty ledger.
    fn ledger(&self, user_id: &str) -> Option<&Ledger> {
        self.ledgers.get(user_id)
    }

    /// A user's ledger for mutation, created on first write.
    fn ledger_mut(&mut self, user_id: &str) -> &mut Ledger {
        self.ledgers
            .entry(user_id.to_string())
            .or_insert_with(|| Ledger::new(user_id))
    }

    /// Records a write outcome: log and broadcast, never propagate. The
    /// in-memory mutation this write followed is already applied and stays.
    fn report(&self, user_id: &str, collection: Collection, result: ResultEngine<()>) {
        let event = match result {
            Ok(()) => StoreEvent::Saved {
                user_id: user_id.to_string(),
                collection,
            },
            Err(err) => {
                tracing::warn!(
                    user_id,
                    collection = collection.as_str(),
                    error = %err,
                    "write-through failed, in-memory state kept"
                );
                StoreEvent::WriteFailed {
                    user_id: user_id.to_string(),
                    collection,
                    message: err.to_string(),
                }
            }
        };
        let _ = self.events.send(event);
    }
}

/// The builder for `Engine`.
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
    local: Option<LocalStore>,
}

impl EngineBuilder {
    /// Persist through a database.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Persist through a local JSON directory. Used when no database is
    /// configured.
    pub fn local_store(mut self, store: LocalStore) -> EngineBuilder {
        self.local = Some(store);
        self
    }

    /// Construct `Engine`, hydrating every known user's ledger from the
    /// backend.
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = match (self.database, self.local) {
            (Some(db), _) => Store::Database(db),
            (None, Some(local)) => Store::Local(local),
            (None, None) => {
                return Err(EngineError::Storage(
                    "engine needs a database or a local store".to_string(),
                ));
            }
        };

        let mut ledgers = HashMap::new();
        for user_id in store.user_ids().await? {
            let ledger = store.load_ledger(&user_id).await?;
            tracing::debug!(
                user_id,
                freights = ledger.freights.len(),
                "ledger hydrated"
            );
            ledgers.insert(user_id, ledger);
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Engine {
            ledgers,
            store,
            events,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// An engine over a throwaway local store.
    pub(crate) async fn engine() -> (Engine, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::builder()
            .local_store(LocalStore::new(dir.path()))
            .build()
            .await
            .unwrap();
        (engine, dir)
    }

    /// An engine whose every write fails at the store.
    pub(crate) fn failing_engine() -> Engine {
        let (events, _) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Engine {
            ledgers: HashMap::new(),
            store: Store::Failing,
            events,
        }
    }
}
