//! Drivers and the payroll projection.
//!
//! Payroll is a read-only computation over a chosen subset of a driver's
//! freights; it is never stored.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, freights::Freight, freights::LoadComment, ledger::Tombstone, util,
};

/// How a driver is paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayRate {
    /// Cents per loaded mile.
    PerMile { cents_per_mile: i64 },
    /// Whole percent of the load's revenue.
    Percentage { percent: u8 },
}

impl PayRate {
    /// Pay for one freight under this rate, rounding half up on cents.
    pub fn pay_for(&self, freight: &Freight) -> MoneyCents {
        match *self {
            Self::PerMile { cents_per_mile } => {
                let raw = freight.distance_miles * cents_per_mile as f64;
                MoneyCents::new(raw.round() as i64)
            }
            Self::Percentage { percent } => freight.revenue.percent(percent),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::PerMile { .. } => "per_mile",
            Self::Percentage { .. } => "percentage",
        }
    }

    pub fn rate_value(&self) -> i64 {
        match *self {
            Self::PerMile { cents_per_mile } => cents_per_mile,
            Self::Percentage { percent } => i64::from(percent),
        }
    }

    pub fn from_parts(kind: &str, rate: i64) -> Result<Self, EngineError> {
        match kind {
            "per_mile" => Ok(Self::PerMile {
                cents_per_mile: rate,
            }),
            "percentage" => Ok(Self::Percentage {
                percent: u8::try_from(rate).map_err(|_| {
                    EngineError::InvalidField("invalid pay percentage".to_string())
                })?,
            }),
            other => Err(EngineError::InvalidField(format!(
                "invalid pay type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub pay: PayRate,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub comments: Vec<LoadComment>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Tombstone for Driver {
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

/// Total pay over a subset of freights.
pub fn payroll(pay: PayRate, freights: &[&Freight]) -> MoneyCents {
    freights.iter().map(|f| pay.pay_for(f)).sum()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "drivers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub pay_type: String,
    pub pay_rate: i64,
    pub images: Json,
    pub comments: Json,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Driver> for ActiveModel {
    fn from(driver: &Driver) -> Self {
        Self {
            id: ActiveValue::Set(driver.id.to_string()),
            user_id: ActiveValue::NotSet,
            name: ActiveValue::Set(driver.name.clone()),
            pay_type: ActiveValue::Set(driver.pay.kind_str().to_string()),
            pay_rate: ActiveValue::Set(driver.pay.rate_value()),
            images: ActiveValue::Set(serde_json::to_value(&driver.images).unwrap_or(Json::Null)),
            comments: ActiveValue::Set(
                serde_json::to_value(&driver.comments).unwrap_or(Json::Null),
            ),
            is_deleted: ActiveValue::Set(driver.is_deleted),
            deleted_at: ActiveValue::Set(driver.deleted_at),
            updated_at: ActiveValue::Set(driver.updated_at),
        }
    }
}

impl TryFrom<Model> for Driver {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "driver")?,
            name: model.name,
            pay: PayRate::from_parts(model.pay_type.as_str(), model.pay_rate)?,
            images: serde_json::from_value(model.images)?,
            comments: serde_json::from_value(model.comments)?,
            is_deleted: model.is_deleted,
            deleted_at: model.deleted_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freights::tests::freight;

    #[test]
    fn per_mile_pay_rounds_on_cents() {
        let f = freight(100_000, 0);
        // 380 miles at 55¢/mile.
        let pay = PayRate::PerMile { cents_per_mile: 55 };
        assert_eq!(pay.pay_for(&f).cents(), 20_900);
    }

    #[test]
    fn percentage_pay_uses_revenue_not_line_haul() {
        let f = freight(100_000, 10_000);
        let pay = PayRate::Percentage { percent: 25 };
        assert_eq!(pay.pay_for(&f).cents(), 27_500);
    }

    #[test]
    fn payroll_sums_the_selected_subset() {
        let a = freight(100_000, 0);
        let b = freight(50_000, 0);
        let pay = PayRate::Percentage { percent: 10 };
        assert_eq!(payroll(pay, &[&a, &b]).cents(), 15_000);
    }
}
