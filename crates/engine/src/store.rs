//! Data access seam for statistics.
//!
//! [`RecordStore`] is the capability the statistics layer is fed from. It is
//! passed explicitly to callers; there is no process-wide store. Two
//! implementations exist: [`InMemoryStore`] here and the SQLite backed
//! [`Engine`](crate::Engine).

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use crate::{
    Car, EngineError, FuelRecord, NewFuelRecord, ResultEngine, StatisticsReport,
    sort_records_for_display,
    util::{name_key, normalize_required_name},
};

/// Which records a store call may see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    pub user_id: String,
}

impl Scope {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Read access to cars and refuels.
pub trait RecordStore {
    /// All records visible to `scope`, in no particular order.
    fn list_records(
        &self,
        scope: &Scope,
    ) -> impl Future<Output = ResultEngine<Vec<FuelRecord>>> + Send;

    /// All cars visible to `scope`.
    fn list_cars(&self, scope: &Scope) -> impl Future<Output = ResultEngine<Vec<Car>>> + Send;
}

/// Fetch cars and records of `scope` from `store` and aggregate them.
///
/// The two lists are separate calls. A car renamed or deleted in between
/// only changes the label of its line, since grouping is by car id.
/// [`Engine::statistics`](crate::Engine::statistics) reads both in one
/// transaction instead.
pub async fn fleet_report<S: RecordStore>(
    store: &S,
    scope: &Scope,
) -> ResultEngine<StatisticsReport> {
    let cars = store.list_cars(scope).await?;
    let records = store.list_records(scope).await?;
    tracing::debug!(
        user = scope.user_id.as_str(),
        cars = cars.len(),
        records = records.len(),
        "building statistics report"
    );
    Ok(StatisticsReport::build(&records, &cars))
}

#[derive(Default)]
struct Tables {
    cars: HashMap<Uuid, Car>,
    records: HashMap<Uuid, FuelRecord>,
}

/// HashMap-backed store for tests and single-process use.
///
/// Clone-friendly via `Arc`.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ResultEngine<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| EngineError::Store("lock poisoned".to_string()))
    }

    fn write(&self) -> ResultEngine<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| EngineError::Store("lock poisoned".to_string()))
    }

    /// Register a car. Names are unique per user, ignoring case.
    pub fn add_car(&self, name: &str, user_id: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "car")?;
        let key = name_key(&name);

        let mut tables = self.write()?;
        if tables
            .cars
            .values()
            .any(|car| car.user_id == user_id && car.name_key() == key)
        {
            return Err(EngineError::ExistingKey(name));
        }

        let car = Car::new(name, user_id);
        let id = car.id;
        tables.cars.insert(id, car);
        Ok(id)
    }

    /// Delete a car together with every refuel logged for it.
    pub fn delete_car(&self, car_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let mut tables = self.write()?;
        match tables.cars.get(&car_id) {
            Some(car) if car.user_id == user_id => {}
            _ => return Err(EngineError::KeyNotFound("car not exists".to_string())),
        }
        tables.cars.remove(&car_id);
        tables
            .records
            .retain(|_, record| record.car_id != Some(car_id));
        Ok(())
    }

    /// Validate and store a refuel for one of the user's cars.
    pub fn add_record(&self, new: NewFuelRecord, user_id: &str) -> ResultEngine<Uuid> {
        let mut tables = self.write()?;
        let car_name = match tables.cars.get(&new.car_id) {
            Some(car) if car.user_id == user_id => car.name.clone(),
            _ => return Err(EngineError::KeyNotFound("car not exists".to_string())),
        };
        let record = new.into_record(user_id, &car_name)?;
        let id = record.id;
        tables.records.insert(id, record);
        Ok(id)
    }

    /// Store an already built record as is (e.g. rows carried over from
    /// another store).
    pub fn insert_record(&self, record: FuelRecord) -> ResultEngine<()> {
        self.write()?.records.insert(record.id, record);
        Ok(())
    }

    /// Refuels of `user_id`, newest first.
    pub fn records(&self, user_id: &str) -> ResultEngine<Vec<FuelRecord>> {
        let mut records: Vec<FuelRecord> = self
            .read()?
            .records
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        sort_records_for_display(&mut records);
        Ok(records)
    }

    pub fn delete_record(&self, record_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let mut tables = self.write()?;
        match tables.records.get(&record_id) {
            Some(record) if record.user_id == user_id => {
                tables.records.remove(&record_id);
                Ok(())
            }
            _ => Err(EngineError::KeyNotFound("record not exists".to_string())),
        }
    }
}

impl RecordStore for InMemoryStore {
    async fn list_records(&self, scope: &Scope) -> ResultEngine<Vec<FuelRecord>> {
        Ok(self
            .read()?
            .records
            .values()
            .filter(|record| record.user_id == scope.user_id)
            .cloned()
            .collect())
    }

    async fn list_cars(&self, scope: &Scope) -> ResultEngine<Vec<Car>> {
        Ok(self
            .read()?
            .cars
            .values()
            .filter(|car| car.user_id == scope.user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        CarKey, MAX_LITERS, MAX_PRICE_PER_LITER, MAX_TOTAL_PRICE, Measure, MoneyCents, PriceInput,
        Volume,
    };

    fn refuel(car_id: Uuid, mileage: f64, liters: i64, total: i64) -> NewFuelRecord {
        NewFuelRecord::new(
            car_id,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            mileage,
            Volume::new(liters),
            PriceInput::Total(MoneyCents::new(total)),
        )
    }

    #[tokio::test]
    async fn report_is_scoped_to_user() {
        let store = InMemoryStore::new();
        let mine = store.add_car("Car1", "alice").unwrap();
        let theirs = store.add_car("Car1", "bob").unwrap();
        store.add_record(refuel(mine, 10_000.0, 40_00, 4000_00), "alice").unwrap();
        store.add_record(refuel(mine, 10_500.0, 38_00, 3800_00), "alice").unwrap();
        store.add_record(refuel(theirs, 1.0, 99_00, 1_00), "bob").unwrap();

        let report = fleet_report(&store, &Scope::user("alice")).await.unwrap();
        assert_eq!(report.fleet.record_count, 2);
        assert_eq!(report.cars.len(), 1);
        assert_eq!(report.cars[0].key, CarKey::Car(mine));
        assert_eq!(report.cars[0].name, "Car1");
        let consumption = report.cars[0].summary.average_consumption_per_100;
        assert!((consumption.value().unwrap() - 15.6).abs() < 1e-9);
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let store = InMemoryStore::new();
        store.add_car("Toyota Camry", "alice").unwrap();
        assert_eq!(
            store.add_car("  toyota camry ", "alice"),
            Err(EngineError::ExistingKey("toyota camry".to_string()))
        );
        assert!(store.add_car("", "alice").is_err());
    }

    #[tokio::test]
    async fn deleting_a_car_removes_its_records() {
        let store = InMemoryStore::new();
        let keep = store.add_car("Keep", "alice").unwrap();
        let sold = store.add_car("Drop", "alice").unwrap();
        store.add_record(refuel(keep, 1.0, 10_00, 100_00), "alice").unwrap();
        store.add_record(refuel(sold, 1.0, 10_00, 100_00), "alice").unwrap();

        assert!(store.delete_car(sold, "bob").is_err());
        store.delete_car(sold, "alice").unwrap();

        let scope = Scope::user("alice");
        let records = store.list_records(&scope).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].car_id, Some(keep));
        assert_eq!(store.list_cars(&scope).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn orphan_rows_report_under_unknown() {
        let store = InMemoryStore::new();
        store
            .insert_record(FuelRecord {
                id: Uuid::new_v4(),
                user_id: "alice".to_string(),
                car_id: None,
                car: None,
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                mileage: 0.0,
                liters: Volume::new(10_00),
                price_per_liter: MoneyCents::new(50_00),
                total_price: MoneyCents::new(500_00),
            })
            .unwrap();

        let report = fleet_report(&store, &Scope::user("alice")).await.unwrap();
        assert_eq!(report.cars.len(), 1);
        assert_eq!(report.cars[0].key, CarKey::Unknown);
        assert_eq!(report.cars[0].summary.average_consumption_per_100, Measure::NoData);
    }

    #[test]
    fn records_need_an_owned_car() {
        let store = InMemoryStore::new();
        let car = store.add_car("Car1", "alice").unwrap();
        assert_eq!(
            store.add_record(refuel(car, 1.0, 10_00, 100_00), "bob"),
            Err(EngineError::KeyNotFound("car not exists".to_string()))
        );
        let id = store.add_record(refuel(car, 1.0, 10_00, 100_00), "alice").unwrap();
        assert!(store.delete_record(id, "bob").is_err());
        store.delete_record(id, "alice").unwrap();
        assert!(store.records("alice").unwrap().is_empty());
    }

    #[test]
    fn records_are_listed_newest_first() {
        let store = InMemoryStore::new();
        let car = store.add_car("Car1", "alice").unwrap();
        let mut older = refuel(car, 100.0, 10_00, 100_00);
        older.date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        store.add_record(older, "alice").unwrap();
        store.add_record(refuel(car, 300.0, 10_00, 100_00), "alice").unwrap();
        store.add_record(refuel(car, 200.0, 10_00, 100_00), "alice").unwrap();

        let mileages: Vec<f64> = store
            .records("alice")
            .unwrap()
            .iter()
            .map(|record| record.mileage)
            .collect();
        assert_eq!(mileages, vec![300.0, 200.0, 100.0]);
    }

    #[tokio::test]
    async fn largest_refuels_still_aggregate() {
        let store = InMemoryStore::new();
        let car = store.add_car("Tanker", "alice").unwrap();
        for mileage in [0.0, 1_000.0] {
            let new = NewFuelRecord::new(
                car,
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                mileage,
                MAX_LITERS,
                PriceInput::PerLiter(MAX_PRICE_PER_LITER),
            );
            store.add_record(new, "alice").unwrap();
        }

        let too_much: Volume = "90000000000000000".parse().unwrap();
        let oversized = NewFuelRecord::new(
            car,
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            2_000.0,
            too_much,
            PriceInput::Total(MoneyCents::new(100)),
        );
        assert!(matches!(
            store.add_record(oversized, "alice"),
            Err(EngineError::InvalidAmount(_))
        ));

        let report = fleet_report(&store, &Scope::user("alice")).await.unwrap();
        assert_eq!(report.fleet.record_count, 2);
        assert_eq!(
            report.fleet.total_liters,
            Volume::new(2 * MAX_LITERS.centiliters())
        );
        assert_eq!(
            report.fleet.total_spent,
            MoneyCents::new(2 * MAX_TOTAL_PRICE.cents())
        );
        assert_eq!(
            report.fleet.average_price_per_liter,
            Measure::Value(MAX_PRICE_PER_LITER.as_major())
        );
        let consumption = report.cars[0].summary.average_consumption_per_100;
        assert_eq!(consumption, Measure::Value(2_000.0));
    }
}
