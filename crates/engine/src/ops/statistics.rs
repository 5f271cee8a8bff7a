use sea_orm::TransactionTrait;

use crate::{
    Car, FuelRecord, ResultEngine, StatisticsReport,
    store::{RecordStore, Scope},
};

use super::{Engine, with_tx};

impl RecordStore for Engine {
    async fn list_records(&self, scope: &Scope) -> ResultEngine<Vec<FuelRecord>> {
        self.records(&scope.user_id).await
    }

    async fn list_cars(&self, scope: &Scope) -> ResultEngine<Vec<Car>> {
        self.cars(&scope.user_id).await
    }
}

impl Engine {
    /// Fleet and per-car statistics over every refuel of `user_id`.
    ///
    /// Cars and records are read in one transaction, so names and refuels
    /// come from the same state of the database.
    pub async fn statistics(&self, user_id: &str) -> ResultEngine<StatisticsReport> {
        with_tx!(self, |db_tx| {
            let cars = Self::cars_in(&db_tx, user_id).await?;
            let records = Self::records_in(&db_tx, user_id).await?;
            tracing::debug!(
                user = user_id,
                cars = cars.len(),
                records = records.len(),
                "building statistics report"
            );
            Ok(StatisticsReport::build(&records, &cars))
        })
    }
}
