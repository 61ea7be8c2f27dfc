//! Engine operations, grouped per collection.
//!
//! Every write op follows the same shape: validate, mutate the in-memory
//! ledger, persist through the store, report the outcome on the event
//! channel. The persistence leg never fails the op.

pub mod activity;
pub mod assets;
pub mod categories;
pub mod drivers;
pub mod expenses;
pub mod freights;
pub mod home;
pub mod recycle;
pub mod statistics;

pub use freights::FreightPage;

use base64::Engine as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Engine, EngineError, ResultEngine, ledger, store::Collection};

/// Flush one changed record to the store and report the outcome. A record
/// missing from the ledger was purged, so the flush is a hard delete.
macro_rules! persist_one {
    ($name:ident, $field:ident, $save:ident, $delete:ident, $collection:expr) => {
        pub(crate) async fn $name(&self, user_id: &str, changed: Uuid) {
            let Some(ledger) = self.ledger(user_id) else {
                return;
            };
            let result = match ledger::find(&ledger.$field, changed) {
                Some(record) => {
                    self.store
                        .$save(user_id, record, &ledger.$field)
                        .await
                }
                None => {
                    self.store
                        .$delete(user_id, changed, &ledger.$field)
                        .await
                }
            };
            self.report(user_id, $collection, result);
        }
    };
}

impl Engine {
    persist_one!(
        persist_freight,
        freights,
        save_freight,
        delete_freight,
        Collection::Freights
    );
    persist_one!(
        persist_asset,
        assets,
        save_asset,
        delete_asset,
        Collection::Assets
    );
    persist_one!(
        persist_driver,
        drivers,
        save_driver,
        delete_driver,
        Collection::Drivers
    );
    persist_one!(
        persist_expense,
        expenses,
        save_expense,
        delete_expense,
        Collection::Expenses
    );
    persist_one!(persist_home, home, save_home, delete_home, Collection::Home);
    persist_one!(
        persist_category,
        categories,
        save_category,
        delete_category,
        Collection::Categories
    );
}

/// Opaque list-pagination cursor: position of the last item on the previous
/// page under the (date desc, id desc) ordering.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ListCursor {
    date: NaiveDate,
    id: Uuid,
}

impl ListCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidField("invalid list cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidField("invalid list cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidField("invalid list cursor".to_string()))
    }
}
