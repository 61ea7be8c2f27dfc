//! Expense categories: a predefined set plus per-user custom entries.
//!
//! Custom categories are registered per user with a normalized uniqueness key
//! so "Fuel " and "fuel" cannot coexist with the predefined entry.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Categories every ledger starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredefinedCategory {
    Fuel,
    Maintenance,
    Insurance,
    Tolls,
    Permits,
    Parking,
    Meals,
    Lodging,
    Office,
    Other,
}

impl PredefinedCategory {
    pub const ALL: [PredefinedCategory; 10] = [
        Self::Fuel,
        Self::Maintenance,
        Self::Insurance,
        Self::Tolls,
        Self::Permits,
        Self::Parking,
        Self::Meals,
        Self::Lodging,
        Self::Office,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fuel => "fuel",
            Self::Maintenance => "maintenance",
            Self::Insurance => "insurance",
            Self::Tolls => "tolls",
            Self::Permits => "permits",
            Self::Parking => "parking",
            Self::Meals => "meals",
            Self::Lodging => "lodging",
            Self::Office => "office",
            Self::Other => "other",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalize_category(value))
    }
}

/// An expense category: either one of the predefined entries or a free-text
/// custom category registered by the user.
///
/// Serialized as a plain string on the wire and in storage; parsing maps known
/// names back to the predefined variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpenseCategory {
    Predefined(PredefinedCategory),
    Custom(String),
}

impl ExpenseCategory {
    pub fn name(&self) -> &str {
        match self {
            Self::Predefined(c) => c.as_str(),
            Self::Custom(name) => name,
        }
    }
}

impl Default for ExpenseCategory {
    fn default() -> Self {
        Self::Predefined(PredefinedCategory::Other)
    }
}

impl From<String> for ExpenseCategory {
    fn from(value: String) -> Self {
        match PredefinedCategory::parse(&value) {
            Some(predefined) => Self::Predefined(predefined),
            None => Self::Custom(value.trim().to_string()),
        }
    }
}

impl From<&str> for ExpenseCategory {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ExpenseCategory> for String {
    fn from(value: ExpenseCategory) -> Self {
        value.name().to_string()
    }
}

/// Normalized form used as uniqueness key: NFKC, lowercased, trimmed.
pub fn normalize_category(name: &str) -> String {
    name.trim().nfkc().collect::<String>().to_lowercase()
}

/// A custom category registered by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCategory {
    pub id: Uuid,
    pub name: String,
    pub name_norm: String,
}

impl CustomCategory {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            name_norm: normalize_category(name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub name_norm: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CustomCategory> for ActiveModel {
    fn from(category: &CustomCategory) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            user_id: ActiveValue::NotSet,
            name: ActiveValue::Set(category.name.clone()),
            name_norm: ActiveValue::Set(category.name_norm.clone()),
        }
    }
}

impl TryFrom<Model> for CustomCategory {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "category")?,
            name: model.name,
            name_norm: model.name_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_predefined() {
        assert_eq!(
            ExpenseCategory::from("Fuel"),
            ExpenseCategory::Predefined(PredefinedCategory::Fuel)
        );
        assert_eq!(
            ExpenseCategory::from(" tolls "),
            ExpenseCategory::Predefined(PredefinedCategory::Tolls)
        );
    }

    #[test]
    fn unknown_names_stay_custom() {
        let category = ExpenseCategory::from("Scale tickets");
        assert_eq!(category, ExpenseCategory::Custom("Scale tickets".into()));
        assert_eq!(category.name(), "Scale tickets");
    }

    #[test]
    fn normalization_folds_case_and_width() {
        assert_eq!(normalize_category(" Fuel "), "fuel");
        assert_eq!(normalize_category("ＦＵＥＬ"), "fuel");
    }

    #[test]
    fn category_round_trips_through_string() {
        let custom = ExpenseCategory::from("Scale tickets");
        let as_string: String = custom.clone().into();
        assert_eq!(ExpenseCategory::from(as_string), custom);
    }
}
