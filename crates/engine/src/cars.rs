//! The module contains `Car` struct and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::util::name_key;

/// A tracked vehicle.
///
/// Refuels reference the car by `id`; the name is a label that is unique per
/// owner regardless of case.
#[derive(Clone, Debug, PartialEq)]
pub struct Car {
    /// Stable identifier, generated once and persisted.
    pub id: Uuid,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Car {
    pub fn new(name: String, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Key used for case-insensitive uniqueness checks.
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub name_norm: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fuel_records::Entity")]
    FuelRecords,
}

impl Related<super::fuel_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FuelRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Car {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            user_id: value.user_id,
            created_at: value.created_at,
        }
    }
}

impl From<&Car> for ActiveModel {
    fn from(value: &Car) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            name_norm: ActiveValue::Set(value.name_key()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}
