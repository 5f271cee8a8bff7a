use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, FuelRecord, NewFuelRecord, ResultEngine, fuel_records};

use super::{Engine, with_tx};

impl Engine {
    /// Validate and log a refuel for one of the user's cars.
    ///
    /// The car name is copied on the record so it can be displayed even if
    /// the car goes away.
    pub async fn add_record(&self, new: NewFuelRecord, user_id: &str) -> ResultEngine<Uuid> {
        // Reject bad input before touching the database.
        new.validate()?;

        with_tx!(self, |db_tx| {
            let car = self.require_car(&db_tx, new.car_id, user_id).await?;
            let record = new.into_record(user_id, &car.name)?;
            let record_id = record.id;
            record.to_active_model(Utc::now()).insert(&db_tx).await?;

            tracing::debug!(record = %record_id, car = %car.id, "refuel logged");
            Ok(record_id)
        })
    }

    /// Refuels of `user_id`, newest first.
    pub async fn records(&self, user_id: &str) -> ResultEngine<Vec<FuelRecord>> {
        Self::records_in(&self.database, user_id).await
    }

    pub(super) async fn records_in<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
    ) -> ResultEngine<Vec<FuelRecord>> {
        let models = fuel_records::Entity::find()
            .filter(fuel_records::Column::UserId.eq(user_id))
            .order_by_desc(fuel_records::Column::Date)
            .order_by_desc(fuel_records::Column::Mileage)
            .all(conn)
            .await?;
        Ok(models.into_iter().map(FuelRecord::from).collect())
    }

    pub async fn delete_record(&self, record_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let result = fuel_records::Entity::delete_many()
            .filter(fuel_records::Column::Id.eq(record_id))
            .filter(fuel_records::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("record not exists".to_string()));
        }
        Ok(())
    }
}
