//! Standalone expenses: costs not tied to a specific load.
//!
//! An expense may be linked to a driver or an asset by id; the link also
//! carries a denormalized name snapshot taken at link time. Renaming or
//! deleting the target later never rewrites the snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, categories::ExpenseCategory, freights::LoadComment,
    ledger::Tombstone, util,
};

/// Optional weak reference to the driver or asset the cost belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpenseLink {
    #[default]
    None,
    Driver {
        id: Uuid,
        name: String,
    },
    Asset {
        id: Uuid,
        name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandaloneExpense {
    pub id: Uuid,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    #[serde(default)]
    pub link: ExpenseLink,
    #[serde(default)]
    pub comments: Vec<LoadComment>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Tombstone for StandaloneExpense {
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
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub description: String,
    pub amount_cents: i64,
    pub date: Date,
    pub link_kind: String,
    pub link_id: Option<String>,
    pub link_name: Option<String>,
    pub comments: Json,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn link_parts(link: &ExpenseLink) -> (&'static str, Option<String>, Option<String>) {
    match link {
        ExpenseLink::None => ("none", None, None),
        ExpenseLink::Driver { id, name } => ("driver", Some(id.to_string()), Some(name.clone())),
        ExpenseLink::Asset { id, name } => ("asset", Some(id.to_string()), Some(name.clone())),
    }
}

fn link_from_parts(
    kind: &str,
    id: Option<String>,
    name: Option<String>,
) -> Result<ExpenseLink, EngineError> {
    let target = |id: Option<String>, name: Option<String>| {
        let id = id.ok_or_else(|| EngineError::InvalidField("missing link id".to_string()))?;
        let name =
            name.ok_or_else(|| EngineError::InvalidField("missing link name".to_string()))?;
        Ok::<_, EngineError>((util::parse_uuid(&id, "link")?, name))
    };
    match kind {
        "none" => Ok(ExpenseLink::None),
        "driver" => {
            let (id, name) = target(id, name)?;
            Ok(ExpenseLink::Driver { id, name })
        }
        "asset" => {
            let (id, name) = target(id, name)?;
            Ok(ExpenseLink::Asset { id, name })
        }
        other => Err(EngineError::InvalidField(format!(
            "invalid link kind: {other}"
        ))),
    }
}

impl From<&StandaloneExpense> for ActiveModel {
    fn from(expense: &StandaloneExpense) -> Self {
        let (link_kind, link_id, link_name) = link_parts(&expense.link);
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            user_id: ActiveValue::NotSet,
            category: ActiveValue::Set(expense.category.name().to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            amount_cents: ActiveValue::Set(expense.amount.cents()),
            date: ActiveValue::Set(expense.date),
            link_kind: ActiveValue::Set(link_kind.to_string()),
            link_id: ActiveValue::Set(link_id),
            link_name: ActiveValue::Set(link_name),
            comments: ActiveValue::Set(
                serde_json::to_value(&expense.comments).unwrap_or(Json::Null),
            ),
            is_deleted: ActiveValue::Set(expense.is_deleted),
            deleted_at: ActiveValue::Set(expense.deleted_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

impl TryFrom<Model> for StandaloneExpense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "expense")?,
            category: ExpenseCategory::from(model.category),
            description: model.description,
            amount: MoneyCents::new(model.amount_cents),
            date: model.date,
            link: link_from_parts(model.link_kind.as_str(), model.link_id, model.link_name)?,
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

    #[test]
    fn link_round_trips_through_columns() {
        let id = Uuid::new_v4();
        let link = ExpenseLink::Driver {
            id,
            name: "Alice".to_string(),
        };
        let (kind, link_id, link_name) = link_parts(&link);
        assert_eq!(link_from_parts(kind, link_id, link_name).unwrap(), link);
        assert_eq!(
            link_from_parts("none", None, None).unwrap(),
            ExpenseLink::None
        );
    }

    #[test]
    fn link_without_target_is_rejected() {
        assert!(link_from_parts("driver", None, None).is_err());
        assert!(link_from_parts("rig", None, None).is_err());
    }
}
