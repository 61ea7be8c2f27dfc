//! Assets: the trucks and business cars the freights run on.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, freights::LoadComment, ledger::Tombstone, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Truck,
    BusinessCar,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Truck => "truck",
            Self::BusinessCar => "business_car",
        }
    }
}

impl TryFrom<&str> for AssetKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "truck" => Ok(Self::Truck),
            "business_car" => Ok(Self::BusinessCar),
            other => Err(EngineError::InvalidField(format!(
                "invalid asset kind: {other}"
            ))),
        }
    }
}

/// A truck or business car. No derived fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub kind: AssetKind,
    /// Unit number or plate, whatever the business uses to name the vehicle.
    pub identifier: String,
    pub description: Option<String>,
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

impl Tombstone for Asset {
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
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub identifier: String,
    pub description: Option<String>,
    pub images: Json,
    pub comments: Json,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Asset> for ActiveModel {
    fn from(asset: &Asset) -> Self {
        Self {
            id: ActiveValue::Set(asset.id.to_string()),
            user_id: ActiveValue::NotSet,
            kind: ActiveValue::Set(asset.kind.as_str().to_string()),
            identifier: ActiveValue::Set(asset.identifier.clone()),
            description: ActiveValue::Set(asset.description.clone()),
            images: ActiveValue::Set(serde_json::to_value(&asset.images).unwrap_or(Json::Null)),
            comments: ActiveValue::Set(
                serde_json::to_value(&asset.comments).unwrap_or(Json::Null),
            ),
            is_deleted: ActiveValue::Set(asset.is_deleted),
            deleted_at: ActiveValue::Set(asset.deleted_at),
            updated_at: ActiveValue::Set(asset.updated_at),
        }
    }
}

impl TryFrom<Model> for Asset {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "asset")?,
            kind: AssetKind::try_from(model.kind.as_str())?,
            identifier: model.identifier,
            description: model.description,
            images: serde_json::from_value(model.images)?,
            comments: serde_json::from_value(model.comments)?,
            is_deleted: model.is_deleted,
            deleted_at: model.deleted_at,
            updated_at: model.updated_at,
        })
    }
}
