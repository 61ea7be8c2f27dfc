//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Patch structs use `Option`
//! fields: `None` leaves the stored value untouched.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    MoneyCents,
    assets::AssetKind,
    categories::ExpenseCategory,
    drivers::PayRate,
    freights::FreightStatus,
    home::HomeKind,
};

/// Create a freight.
#[derive(Clone, Debug)]
pub struct FreightNew {
    pub label: String,
    pub origin: String,
    pub destination: String,
    pub distance_miles: f64,
    pub weight_lbs: f64,
    pub date: NaiveDate,
    /// Resolved against the driver collection; the name snapshot is taken
    /// here and never refreshed.
    pub driver_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub line_haul: MoneyCents,
    pub fuel_surcharge: MoneyCents,
    pub loading: MoneyCents,
    pub unloading: MoneyCents,
    pub accessorials: MoneyCents,
    /// Defaults to [`DEFAULT_OWNER_PERCENTAGE`] when absent.
    ///
    /// [`DEFAULT_OWNER_PERCENTAGE`]: crate::freights::DEFAULT_OWNER_PERCENTAGE
    pub owner_percentage: Option<u8>,
    pub status: FreightStatus,
    /// First manual comment, e.g. the booking note.
    pub comment: Option<String>,
    pub author: String,
}

/// Patch an existing freight.
///
/// Touching any revenue component (or the owner percentage) requires
/// `edit_note`; it is appended as a System comment for the audit trail.
#[derive(Clone, Debug, Default)]
pub struct FreightPatch {
    pub label: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub distance_miles: Option<f64>,
    pub weight_lbs: Option<f64>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the assignment, `Some(Some(id))` re-links and
    /// takes a fresh name snapshot.
    pub driver_id: Option<Option<Uuid>>,
    pub asset_id: Option<Option<Uuid>>,
    pub line_haul: Option<MoneyCents>,
    pub fuel_surcharge: Option<MoneyCents>,
    pub loading: Option<MoneyCents>,
    pub unloading: Option<MoneyCents>,
    pub accessorials: Option<MoneyCents>,
    pub owner_percentage: Option<u8>,
    pub status: Option<FreightStatus>,
    pub edit_note: Option<String>,
    pub author: String,
}

impl FreightPatch {
    /// True when the patch touches a field that feeds the derived figures.
    pub fn touches_revenue(&self) -> bool {
        self.line_haul.is_some()
            || self.fuel_surcharge.is_some()
            || self.loading.is_some()
            || self.unloading.is_some()
            || self.accessorials.is_some()
            || self.owner_percentage.is_some()
    }
}

/// Append an expense line to a freight.
#[derive(Clone, Debug)]
pub struct LoadExpenseNew {
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: MoneyCents,
    pub date: Option<NaiveDate>,
}

/// Patch an expense line inside a freight.
#[derive(Clone, Debug, Default)]
pub struct LoadExpensePatch {
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub date: Option<Option<NaiveDate>>,
}

/// Append a manual comment.
#[derive(Clone, Debug)]
pub struct CommentNew {
    pub text: String,
    pub author: String,
    pub event_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct AssetNew {
    pub kind: AssetKind,
    pub identifier: String,
    pub description: Option<String>,
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AssetPatch {
    pub kind: Option<AssetKind>,
    pub identifier: Option<String>,
    pub description: Option<Option<String>>,
    pub images: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct DriverNew {
    pub name: String,
    pub pay: PayRate,
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DriverPatch {
    pub name: Option<String>,
    pub pay: Option<PayRate>,
    pub images: Option<Vec<String>>,
}

/// Create a standalone expense. At most one link target may be set; linking
/// to a freight is not expressed here (that appends a load expense instead).
#[derive(Clone, Debug)]
pub struct ExpenseNew {
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub driver_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default)]
pub struct ExpensePatch {
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct HomeNew {
    pub kind: HomeKind,
    pub amount: MoneyCents,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, Default)]
pub struct HomePatch {
    pub kind: Option<HomeKind>,
    pub amount: Option<MoneyCents>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}
