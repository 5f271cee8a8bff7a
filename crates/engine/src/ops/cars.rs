use sea_orm::{QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Car, EngineError, ResultEngine, cars, fuel_records,
    util::{name_key, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new car for `user_id`.
    ///
    /// Names are trimmed and must be unique per owner, ignoring case.
    pub async fn new_car(&self, name: &str, user_id: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "car")?;
        let car = Car::new(name, user_id);
        let car_id = car.id;

        with_tx!(self, |db_tx| {
            let exists = cars::Entity::find()
                .filter(cars::Column::UserId.eq(user_id))
                .filter(cars::Column::NameNorm.eq(name_key(&car.name)))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(car.name));
            }

            // A concurrent insert can still win the race to the unique index.
            cars::ActiveModel::from(&car)
                .insert(&db_tx)
                .await
                .map_err(|err| name_conflict(err, &car.name))?;
            tracing::info!(car = %car_id, user = user_id, "car registered");
            Ok(car_id)
        })
    }

    /// Cars owned by `user_id`, sorted by name.
    pub async fn cars(&self, user_id: &str) -> ResultEngine<Vec<Car>> {
        Self::cars_in(&self.database, user_id).await
    }

    pub(super) async fn cars_in<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
    ) -> ResultEngine<Vec<Car>> {
        let models = cars::Entity::find()
            .filter(cars::Column::UserId.eq(user_id))
            .order_by_asc(cars::Column::NameNorm)
            .all(conn)
            .await?;
        Ok(models.into_iter().map(Car::from).collect())
    }

    /// A single car; missing and foreign cars are both "not found".
    pub async fn car(&self, car_id: Uuid, user_id: &str) -> ResultEngine<Car> {
        self.require_car(&self.database, car_id, user_id)
            .await
            .map(Car::from)
    }

    /// Delete a car and every refuel logged for it.
    pub async fn delete_car(&self, car_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_car(&db_tx, car_id, user_id).await?;

            // The FK cascades too, but SQLite only honours it with
            // `foreign_keys` on, so delete explicitly.
            let removed = fuel_records::Entity::delete_many()
                .filter(fuel_records::Column::CarId.eq(car_id))
                .exec(&db_tx)
                .await?;
            cars::Entity::delete_by_id(car_id).exec(&db_tx).await?;

            tracing::info!(
                car = %car_id,
                records = removed.rows_affected,
                "car deleted"
            );
            Ok(())
        })
    }

    pub(super) async fn require_car<C: ConnectionTrait>(
        &self,
        conn: &C,
        car_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<cars::Model> {
        cars::Entity::find_by_id(car_id)
            .filter(cars::Column::UserId.eq(user_id))
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("car not exists".to_string()))
    }
}

fn name_conflict(err: DbErr, name: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::ExistingKey(name.to_string()),
        _ => EngineError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, Statement};

    use super::*;

    #[tokio::test]
    async fn unique_index_violation_is_existing_key() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec!["alice".into(), "password".into()],
        ))
        .await
        .unwrap();

        let first = Car::new("Golf".to_string(), "alice");
        cars::ActiveModel::from(&first).insert(&db).await.unwrap();

        // Skips the lookup in `new_car`, as a concurrent caller would.
        let second = Car::new("GOLF".to_string(), "alice");
        let err = cars::ActiveModel::from(&second)
            .insert(&db)
            .await
            .unwrap_err();
        assert_eq!(
            name_conflict(err, &second.name),
            EngineError::ExistingKey("GOLF".to_string())
        );
    }

    #[test]
    fn other_database_errors_stay_database_errors() {
        let err = name_conflict(DbErr::Custom("disk full".to_string()), "Golf");
        assert!(matches!(err, EngineError::Database(_)));
    }
}
