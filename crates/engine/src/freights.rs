//! Freight (load) primitives.
//!
//! A `Freight` is one shipment: a route, revenue components, an optional
//! driver/asset assignment, an owned list of expenses and comments, and the
//! derived financial figures. Derived fields are stored, not lazily computed:
//! [`Freight::recompute_derived`] runs on every write that touches a revenue
//! component or the expense list, so they can never drift from their inputs.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, categories::ExpenseCategory, finance,
    ledger::Tombstone, util,
};

/// Share of line haul the business keeps unless the load says otherwise.
pub const DEFAULT_OWNER_PERCENTAGE: u8 = 65;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightStatus {
    #[default]
    Draft,
    ForPickup,
    InRoute,
    Delivered,
    Cancelled,
}

impl FreightStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::ForPickup => "for_pickup",
            Self::InRoute => "in_route",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for FreightStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "for_pickup" => Ok(Self::ForPickup),
            "in_route" => Ok(Self::InRoute),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidField(format!(
                "invalid freight status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    Manual,
    System,
}

/// A note attached to a freight, newest first.
///
/// `event_date` is the business date the note refers to (a detention day, a
/// lumper receipt) and is distinct from `created_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadComment {
    pub id: Uuid,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub event_date: Option<NaiveDate>,
    pub kind: CommentKind,
}

impl LoadComment {
    pub fn manual(text: &str, author: &str, event_date: Option<NaiveDate>) -> Self {
        Self::new(text, author, event_date, CommentKind::Manual)
    }

    pub fn system(text: &str, author: &str) -> Self {
        Self::new(text, author, None, CommentKind::System)
    }

    fn new(text: &str, author: &str, event_date: Option<NaiveDate>, kind: CommentKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            author: author.to_string(),
            created_at: Utc::now(),
            event_date,
            kind,
        }
    }
}

/// An expense line owned by a freight. It has no existence outside its
/// parent; soft-deleted lines stay in the array for recovery but are excluded
/// from every total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadExpense {
    pub id: Uuid,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: MoneyCents,
    /// Falls back to the parent freight's date when absent.
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LoadExpense {
    pub fn new(
        category: ExpenseCategory,
        description: &str,
        amount: MoneyCents,
        date: Option<NaiveDate>,
    ) -> ResultEngine<Self> {
        util::validate_positive(amount, "expense amount")?;
        Ok(Self {
            id: Uuid::new_v4(),
            category,
            description: description.trim().to_string(),
            amount,
            date,
            is_deleted: false,
            deleted_at: None,
        })
    }
}

impl Tombstone for LoadExpense {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn bury(&mut self, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }

    fn exhume(&mut self) {
        self.is_deleted = false;
        self.deleted_at = None;
    }
}

/// One shipment transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Freight {
    pub id: Uuid,
    /// Human-facing load number. Not guaranteed unique.
    pub label: String,
    pub origin: String,
    pub destination: String,
    pub distance_miles: f64,
    pub weight_lbs: f64,
    pub date: NaiveDate,
    /// Weak reference; `driver_name` is a snapshot taken at assignment time
    /// and never cascade-updated.
    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,
    pub asset_id: Option<Uuid>,
    pub asset_name: Option<String>,
    pub line_haul: MoneyCents,
    pub fuel_surcharge: MoneyCents,
    pub loading: MoneyCents,
    pub unloading: MoneyCents,
    pub accessorials: MoneyCents,
    pub owner_percentage: u8,
    pub revenue: MoneyCents,
    pub owner_amount: MoneyCents,
    pub total_expenses: MoneyCents,
    pub net_profit: MoneyCents,
    pub expenses: Vec<LoadExpense>,
    /// Newest first.
    pub comments: Vec<LoadComment>,
    pub status: FreightStatus,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Freight {
    /// Validates the revenue components and recomputes the derived fields.
    pub fn validate(&self) -> ResultEngine<()> {
        util::normalize_required_text(&self.label, "freight label")?;
        util::validate_positive(self.line_haul, "line haul")?;
        util::validate_non_negative(self.fuel_surcharge, "fuel surcharge")?;
        util::validate_non_negative(self.loading, "loading")?;
        util::validate_non_negative(self.unloading, "unloading")?;
        util::validate_non_negative(self.accessorials, "accessorials")?;
        util::validate_percentage(self.owner_percentage, "owner percentage")?;
        Ok(())
    }

    /// Recomputes `revenue`, `owner_amount`, `total_expenses` and
    /// `net_profit` from the primitive fields and the live expense lines.
    pub fn recompute_derived(&mut self) {
        self.revenue = finance::revenue(
            self.line_haul,
            self.fuel_surcharge,
            self.accessorials,
            self.loading,
            self.unloading,
        );
        self.owner_amount = finance::owner_amount(
            self.line_haul,
            self.owner_percentage,
            self.fuel_surcharge,
            self.accessorials,
            self.loading,
            self.unloading,
        );
        self.total_expenses = finance::total_expenses(&self.expenses);
        self.net_profit = finance::net_profit(self.owner_amount, self.total_expenses);
    }

    /// Data-quality gate: a load without a driver name or without a single
    /// comment stays visible in the ledger but counts zero toward every
    /// financial aggregate.
    pub fn passes_validity_gate(&self) -> bool {
        self.driver_name.as_deref().is_some_and(|n| !n.is_empty())
            && !self.comments.is_empty()
    }

    pub fn expense(&self, expense_id: Uuid) -> Option<&LoadExpense> {
        self.expenses.iter().find(|e| e.id == expense_id)
    }

    pub fn expense_mut(&mut self, expense_id: Uuid) -> Option<&mut LoadExpense> {
        self.expenses.iter_mut().find(|e| e.id == expense_id)
    }
}

impl Tombstone for Freight {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn bury(&mut self, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }

    fn exhume(&mut self) {
        self.is_deleted = false;
        self.deleted_at = None;
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "freights")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub origin: String,
    pub destination: String,
    #[sea_orm(column_type = "Double")]
    pub distance_miles: f64,
    #[sea_orm(column_type = "Double")]
    pub weight_lbs: f64,
    pub date: Date,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub asset_id: Option<String>,
    pub asset_name: Option<String>,
    pub line_haul_cents: i64,
    pub fuel_surcharge_cents: i64,
    pub loading_cents: i64,
    pub unloading_cents: i64,
    pub accessorials_cents: i64,
    pub owner_percentage: i16,
    pub revenue_cents: i64,
    pub owner_amount_cents: i64,
    pub total_expenses_cents: i64,
    pub net_profit_cents: i64,
    pub status: String,
    pub expenses: Json,
    pub comments: Json,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Freight> for ActiveModel {
    fn from(freight: &Freight) -> Self {
        Self {
            id: ActiveValue::Set(freight.id.to_string()),
            user_id: ActiveValue::NotSet,
            label: ActiveValue::Set(freight.label.clone()),
            origin: ActiveValue::Set(freight.origin.clone()),
            destination: ActiveValue::Set(freight.destination.clone()),
            distance_miles: ActiveValue::Set(freight.distance_miles),
            weight_lbs: ActiveValue::Set(freight.weight_lbs),
            date: ActiveValue::Set(freight.date),
            driver_id: ActiveValue::Set(freight.driver_id.map(|id| id.to_string())),
            driver_name: ActiveValue::Set(freight.driver_name.clone()),
            asset_id: ActiveValue::Set(freight.asset_id.map(|id| id.to_string())),
            asset_name: ActiveValue::Set(freight.asset_name.clone()),
            line_haul_cents: ActiveValue::Set(freight.line_haul.cents()),
            fuel_surcharge_cents: ActiveValue::Set(freight.fuel_surcharge.cents()),
            loading_cents: ActiveValue::Set(freight.loading.cents()),
            unloading_cents: ActiveValue::Set(freight.unloading.cents()),
            accessorials_cents: ActiveValue::Set(freight.accessorials.cents()),
            owner_percentage: ActiveValue::Set(i16::from(freight.owner_percentage)),
            revenue_cents: ActiveValue::Set(freight.revenue.cents()),
            owner_amount_cents: ActiveValue::Set(freight.owner_amount.cents()),
            total_expenses_cents: ActiveValue::Set(freight.total_expenses.cents()),
            net_profit_cents: ActiveValue::Set(freight.net_profit.cents()),
            status: ActiveValue::Set(freight.status.as_str().to_string()),
            expenses: ActiveValue::Set(
                serde_json::to_value(&freight.expenses).unwrap_or(Json::Null),
            ),
            comments: ActiveValue::Set(
                serde_json::to_value(&freight.comments).unwrap_or(Json::Null),
            ),
            is_deleted: ActiveValue::Set(freight.is_deleted),
            deleted_at: ActiveValue::Set(freight.deleted_at),
            updated_at: ActiveValue::Set(freight.updated_at),
        }
    }
}

impl TryFrom<Model> for Freight {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let expenses: Vec<LoadExpense> = serde_json::from_value(model.expenses)?;
        let comments: Vec<LoadComment> = serde_json::from_value(model.comments)?;
        Ok(Self {
            id: util::parse_uuid(&model.id, "freight")?,
            label: model.label,
            origin: model.origin,
            destination: model.destination,
            distance_miles: model.distance_miles,
            weight_lbs: model.weight_lbs,
            date: model.date,
            driver_id: model
                .driver_id
                .as_deref()
                .map(|id| util::parse_uuid(id, "driver"))
                .transpose()?,
            driver_name: model.driver_name,
            asset_id: model
                .asset_id
                .as_deref()
                .map(|id| util::parse_uuid(id, "asset"))
                .transpose()?,
            asset_name: model.asset_name,
            line_haul: MoneyCents::new(model.line_haul_cents),
            fuel_surcharge: MoneyCents::new(model.fuel_surcharge_cents),
            loading: MoneyCents::new(model.loading_cents),
            unloading: MoneyCents::new(model.unloading_cents),
            accessorials: MoneyCents::new(model.accessorials_cents),
            owner_percentage: u8::try_from(model.owner_percentage)
                .map_err(|_| EngineError::InvalidField("invalid owner percentage".to_string()))?,
            revenue: MoneyCents::new(model.revenue_cents),
            owner_amount: MoneyCents::new(model.owner_amount_cents),
            total_expenses: MoneyCents::new(model.total_expenses_cents),
            net_profit: MoneyCents::new(model.net_profit_cents),
            expenses,
            comments,
            status: FreightStatus::try_from(model.status.as_str())?,
            is_deleted: model.is_deleted,
            deleted_at: model.deleted_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn freight(line_haul: i64, surcharge: i64) -> Freight {
        let mut freight = Freight {
            id: Uuid::new_v4(),
            label: "L-100".to_string(),
            origin: "Columbus, OH".to_string(),
            destination: "Nashville, TN".to_string(),
            distance_miles: 380.0,
            weight_lbs: 42_000.0,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            driver_id: None,
            driver_name: Some("Alice".to_string()),
            asset_id: None,
            asset_name: None,
            line_haul: MoneyCents::new(line_haul),
            fuel_surcharge: MoneyCents::new(surcharge),
            loading: MoneyCents::ZERO,
            unloading: MoneyCents::ZERO,
            accessorials: MoneyCents::ZERO,
            owner_percentage: DEFAULT_OWNER_PERCENTAGE,
            revenue: MoneyCents::ZERO,
            owner_amount: MoneyCents::ZERO,
            total_expenses: MoneyCents::ZERO,
            net_profit: MoneyCents::ZERO,
            expenses: Vec::new(),
            comments: vec![LoadComment::manual("booked", "dispatch", None)],
            status: FreightStatus::Delivered,
            is_deleted: false,
            deleted_at: None,
            updated_at: Utc::now(),
        };
        freight.recompute_derived();
        freight
    }

    #[test]
    fn derived_fields_follow_inputs() {
        // lineHaul 1000.00 at 65% plus a 100.00 surcharge and one 50.00 expense.
        let mut freight = freight(100_000, 10_000);
        freight.expenses.push(
            LoadExpense::new(ExpenseCategory::from("fuel"), "fill up", 5_000.into(), None)
                .unwrap(),
        );
        freight.recompute_derived();

        assert_eq!(freight.revenue.cents(), 110_000);
        assert_eq!(freight.owner_amount.cents(), 75_000);
        assert_eq!(freight.total_expenses.cents(), 5_000);
        assert_eq!(freight.net_profit.cents(), 70_000);
    }

    #[test]
    fn soft_deleted_expense_leaves_the_array_but_not_the_totals() {
        let mut freight = freight(100_000, 10_000);
        freight.expenses.push(
            LoadExpense::new(ExpenseCategory::from("fuel"), "fill up", 5_000.into(), None)
                .unwrap(),
        );
        freight.recompute_derived();

        freight.expenses[0].bury(Utc::now());
        freight.recompute_derived();
        assert_eq!(freight.total_expenses.cents(), 0);
        assert_eq!(freight.net_profit.cents(), 75_000);
        assert_eq!(freight.expenses.len(), 1);
        assert!(freight.expenses[0].is_deleted);

        freight.expenses[0].exhume();
        freight.recompute_derived();
        assert_eq!(freight.total_expenses.cents(), 5_000);
        assert_eq!(freight.net_profit.cents(), 70_000);
    }

    #[test]
    fn editing_an_expense_amount_moves_the_totals() {
        let mut freight = freight(100_000, 0);
        freight.expenses.push(
            LoadExpense::new(ExpenseCategory::from("tolls"), "I-40", 2_500.into(), None)
                .unwrap(),
        );
        freight.recompute_derived();
        assert_eq!(freight.total_expenses.cents(), 2_500);

        freight.expenses[0].amount = MoneyCents::new(4_000);
        freight.recompute_derived();
        assert_eq!(freight.total_expenses.cents(), 4_000);
        assert_eq!(freight.net_profit.cents(), 61_000);
    }

    #[test]
    fn validity_gate_requires_driver_and_comments() {
        let mut freight = freight(100_000, 0);
        assert!(freight.passes_validity_gate());

        freight.driver_name = None;
        assert!(!freight.passes_validity_gate());

        freight.driver_name = Some("Alice".to_string());
        freight.comments.clear();
        assert!(!freight.passes_validity_gate());
    }

    #[test]
    fn rejects_non_positive_line_haul() {
        let mut freight = freight(100_000, 0);
        freight.line_haul = MoneyCents::ZERO;
        assert!(freight.validate().is_err());
    }

    #[test]
    fn model_round_trip_preserves_nested_lists() {
        let mut freight = freight(100_000, 10_000);
        freight.expenses.push(
            LoadExpense::new(ExpenseCategory::from("lumper"), "dock", 7_500.into(), None)
                .unwrap(),
        );
        freight.recompute_derived();

        let model = Model {
            id: freight.id.to_string(),
            user_id: "carol".to_string(),
            label: freight.label.clone(),
            origin: freight.origin.clone(),
            destination: freight.destination.clone(),
            distance_miles: freight.distance_miles,
            weight_lbs: freight.weight_lbs,
            date: freight.date,
            driver_id: None,
            driver_name: freight.driver_name.clone(),
            asset_id: None,
            asset_name: None,
            line_haul_cents: freight.line_haul.cents(),
            fuel_surcharge_cents: freight.fuel_surcharge.cents(),
            loading_cents: 0,
            unloading_cents: 0,
            accessorials_cents: 0,
            owner_percentage: i16::from(freight.owner_percentage),
            revenue_cents: freight.revenue.cents(),
            owner_amount_cents: freight.owner_amount.cents(),
            total_expenses_cents: freight.total_expenses.cents(),
            net_profit_cents: freight.net_profit.cents(),
            status: freight.status.as_str().to_string(),
            expenses: serde_json::to_value(&freight.expenses).unwrap(),
            comments: serde_json::to_value(&freight.comments).unwrap(),
            is_deleted: false,
            deleted_at: None,
            updated_at: freight.updated_at,
        };

        let back = Freight::try_from(model).unwrap();
        assert_eq!(back, freight);
    }
}
