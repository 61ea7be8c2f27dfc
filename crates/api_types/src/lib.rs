use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod freight {
    use super::*;

    /// Request body for creating a freight. All money fields are integer
    /// cents.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FreightNew {
        pub label: String,
        pub origin: String,
        pub destination: String,
        pub distance_miles: f64,
        pub weight_lbs: f64,
        pub date: NaiveDate,
        pub driver_id: Option<Uuid>,
        pub asset_id: Option<Uuid>,
        pub line_haul_cents: i64,
        #[serde(default)]
        pub fuel_surcharge_cents: i64,
        #[serde(default)]
        pub loading_cents: i64,
        #[serde(default)]
        pub unloading_cents: i64,
        #[serde(default)]
        pub accessorials_cents: i64,
        pub owner_percentage: Option<u8>,
        pub status: Option<String>,
        pub comment: Option<String>,
    }

    /// Patch body. Absent fields stay untouched; `driver_id`/`asset_id`
    /// distinguish "leave alone" (absent) from "clear" (explicit null)
    /// via the double option.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FreightPatch {
        pub label: Option<String>,
        pub origin: Option<String>,
        pub destination: Option<String>,
        pub distance_miles: Option<f64>,
        pub weight_lbs: Option<f64>,
        pub date: Option<NaiveDate>,
        #[serde(default, with = "serde_double_option")]
        pub driver_id: Option<Option<Uuid>>,
        #[serde(default, with = "serde_double_option")]
        pub asset_id: Option<Option<Uuid>>,
        pub line_haul_cents: Option<i64>,
        pub fuel_surcharge_cents: Option<i64>,
        pub loading_cents: Option<i64>,
        pub unloading_cents: Option<i64>,
        pub accessorials_cents: Option<i64>,
        pub owner_percentage: Option<u8>,
        pub status: Option<String>,
        /// Required whenever a revenue component changes.
        pub edit_note: Option<String>,
    }

    /// Full freight view.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FreightView {
        pub id: Uuid,
        pub label: String,
        pub origin: String,
        pub destination: String,
        pub distance_miles: f64,
        pub weight_lbs: f64,
        pub date: NaiveDate,
        pub driver_id: Option<Uuid>,
        pub driver_name: Option<String>,
        pub asset_id: Option<Uuid>,
        pub asset_name: Option<String>,
        pub line_haul_cents: i64,
        pub fuel_surcharge_cents: i64,
        pub loading_cents: i64,
        pub unloading_cents: i64,
        pub accessorials_cents: i64,
        pub owner_percentage: u8,
        pub revenue_cents: i64,
        pub owner_amount_cents: i64,
        pub total_expenses_cents: i64,
        pub net_profit_cents: i64,
        pub status: String,
        pub expenses: Vec<LoadExpenseView>,
        pub comments: Vec<CommentView>,
        pub is_deleted: bool,
        pub deleted_at: Option<DateTime<Utc>>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoadExpenseView {
        pub id: Uuid,
        pub category: String,
        pub description: String,
        pub amount_cents: i64,
        pub date: Option<NaiveDate>,
        pub is_deleted: bool,
        pub deleted_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommentView {
        pub id: Uuid,
        pub text: String,
        pub author: String,
        pub created_at: DateTime<Utc>,
        pub event_date: Option<NaiveDate>,
        pub kind: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoadExpenseNew {
        pub category: String,
        pub description: String,
        pub amount_cents: i64,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LoadExpensePatch {
        pub category: Option<String>,
        pub description: Option<String>,
        pub amount_cents: Option<i64>,
        #[serde(default, with = "serde_double_option")]
        pub date: Option<Option<NaiveDate>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommentNew {
        pub text: String,
        pub event_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FreightList {
        pub freights: Vec<FreightView>,
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FreightListQuery {
        pub limit: Option<usize>,
        pub cursor: Option<String>,
    }
}

pub mod asset {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetNew {
        pub kind: String,
        pub identifier: String,
        pub description: Option<String>,
        #[serde(default)]
        pub images: Vec<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AssetPatch {
        pub kind: Option<String>,
        pub identifier: Option<String>,
        #[serde(default, with = "serde_double_option")]
        pub description: Option<Option<String>>,
        pub images: Option<Vec<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetView {
        pub id: Uuid,
        pub kind: String,
        pub identifier: String,
        pub description: Option<String>,
        pub images: Vec<String>,
        pub is_deleted: bool,
        pub deleted_at: Option<DateTime<Utc>>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod driver {
    use super::*;

    /// `pay_type` is `per_mile` (rate in cents per mile) or `percentage`
    /// (whole percent of load revenue).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DriverNew {
        pub name: String,
        pub pay_type: String,
        pub pay_rate: i64,
        #[serde(default)]
        pub images: Vec<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DriverPatch {
        pub name: Option<String>,
        pub pay_type: Option<String>,
        pub pay_rate: Option<i64>,
        pub images: Option<Vec<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DriverView {
        pub id: Uuid,
        pub name: String,
        pub pay_type: String,
        pub pay_rate: i64,
        pub images: Vec<String>,
        pub is_deleted: bool,
        pub deleted_at: Option<DateTime<Utc>>,
        pub updated_at: DateTime<Utc>,
    }

    /// Request body for the payroll projection: the subset of load ids to
    /// pay out.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayrollRequest {
        pub freight_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayrollResponse {
        pub total_cents: i64,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub category: String,
        pub description: String,
        pub amount_cents: i64,
        pub date: NaiveDate,
        pub driver_id: Option<Uuid>,
        pub asset_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpensePatch {
        pub category: Option<String>,
        pub description: Option<String>,
        pub amount_cents: Option<i64>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub category: String,
        pub description: String,
        pub amount_cents: i64,
        pub date: NaiveDate,
        pub link_kind: String,
        pub link_id: Option<Uuid>,
        pub link_name: Option<String>,
        pub is_deleted: bool,
        pub deleted_at: Option<DateTime<Utc>>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod home {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HomeNew {
        pub kind: String,
        pub amount_cents: i64,
        pub category: String,
        pub description: String,
        pub date: NaiveDate,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HomePatch {
        pub kind: Option<String>,
        pub amount_cents: Option<i64>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HomeView {
        pub id: Uuid,
        pub kind: String,
        pub amount_cents: i64,
        pub category: String,
        pub description: String,
        pub date: NaiveDate,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod activity {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ActivityQuery {
        pub search: Option<String>,
        /// Comma-separated allow-list: `revenue,expense,update`.
        pub kinds: Option<String>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivityEventView {
        pub id: String,
        pub kind: String,
        pub date: NaiveDate,
        pub title: String,
        pub amount_cents: i64,
        pub status: String,
        pub presentation: String,
        pub link_kind: Option<String>,
        pub link_id: Option<Uuid>,
    }
}

pub mod recycle {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecycleEntryView {
        pub kind: String,
        pub id: Uuid,
        pub label: String,
        pub deleted_at: Option<DateTime<Utc>>,
        /// Parent load for expense lines still owned by a live freight.
        pub freight_id: Option<Uuid>,
    }

    /// Request body for restore and purge.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecycleTarget {
        pub kind: String,
        pub id: Uuid,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatisticsQuery {
        pub from: NaiveDate,
        pub to: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatisticsView {
        pub revenue_cents: i64,
        pub owner_revenue_cents: i64,
        pub expenses_cents: i64,
        pub profit_cents: i64,
        pub pending_count: usize,
        pub cancelled_count: usize,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryList {
        pub categories: Vec<String>,
    }
}

pub mod scan {
    use super::*;

    /// Raw text of a rate confirmation to run through the extractor.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScanRequest {
        pub text: String,
    }

    /// Best-effort extraction result. Every field is optional and untrusted;
    /// the caller prefills a form with it, nothing more.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ScanFields {
        pub date: Option<NaiveDate>,
        pub broker: Option<String>,
        pub reference: Option<String>,
        pub pickup_city: Option<String>,
        pub pickup_date: Option<NaiveDate>,
        pub delivery_city: Option<String>,
        pub delivery_date: Option<NaiveDate>,
        pub weight: Option<f64>,
        pub pieces: Option<u32>,
        pub miles: Option<f64>,
        pub rate: Option<f64>,
        pub notes: Option<String>,
    }
}

/// Distinguishes an absent JSON field (`None`, leave unchanged) from an
/// explicit `null` (`Some(None)`, clear the value).
mod serde_double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Ok(Some(Option::<T>::deserialize(deserializer)?))
    }
}
