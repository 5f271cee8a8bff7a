//! The module contains `FuelRecord` struct and its table.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{MoneyCents, Volume};

/// One refueling event.
///
/// Records are never modified after creation, only deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct FuelRecord {
    pub id: Uuid,
    pub user_id: String,
    /// Owning car. `None` for rows whose car cannot be resolved.
    pub car_id: Option<Uuid>,
    /// Car name at the time the refuel was logged.
    pub car: Option<String>,
    pub date: NaiveDate,
    /// Odometer reading in km.
    pub mileage: f64,
    pub liters: Volume,
    pub price_per_liter: MoneyCents,
    pub total_price: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fuel_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub car_id: Option<Uuid>,
    pub car_name: Option<String>,
    pub date: Date,
    pub mileage: f64,
    pub liters_centi: i64,
    pub price_per_liter_minor: i64,
    pub total_price_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cars::Entity",
        from = "Column::CarId",
        to = "super::cars::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Cars,
}

impl Related<super::cars::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cars.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FuelRecord {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            car_id: value.car_id,
            car: value.car_name,
            date: value.date,
            mileage: value.mileage,
            liters: Volume::new(value.liters_centi),
            price_per_liter: MoneyCents::new(value.price_per_liter_minor),
            total_price: MoneyCents::new(value.total_price_minor),
        }
    }
}

impl FuelRecord {
    /// Row to insert, stamped with its creation time.
    pub(crate) fn to_active_model(&self, created_at: DateTime<Utc>) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id),
            user_id: ActiveValue::Set(self.user_id.clone()),
            car_id: ActiveValue::Set(self.car_id),
            car_name: ActiveValue::Set(self.car.clone()),
            date: ActiveValue::Set(self.date),
            mileage: ActiveValue::Set(self.mileage),
            liters_centi: ActiveValue::Set(self.liters.centiliters()),
            price_per_liter_minor: ActiveValue::Set(self.price_per_liter.cents()),
            total_price_minor: ActiveValue::Set(self.total_price.cents()),
            created_at: ActiveValue::Set(created_at),
        }
    }
}
