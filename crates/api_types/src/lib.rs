use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response body of every create endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

pub mod car {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CarNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CarView {
        pub id: Uuid,
        pub name: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CarList {
        pub cars: Vec<CarView>,
    }
}

pub mod record {
    use super::*;

    /// Request body for logging a refuel.
    ///
    /// Amounts are decimal strings as typed by the user: `.` or `,` as
    /// separator, at most two decimals. At least one of `total_price` and
    /// `price_per_liter` is required; the other one is derived.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordNew {
        pub car_id: Uuid,
        /// `YYYY-MM-DD`
        pub date: NaiveDate,
        pub mileage: f64,
        pub liters: String,
        pub total_price: Option<String>,
        pub price_per_liter: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordView {
        pub id: Uuid,
        pub car_id: Option<Uuid>,
        /// Car name at the time the refuel was logged.
        pub car: Option<String>,
        pub date: NaiveDate,
        pub mileage: f64,
        pub liters: f64,
        pub price_per_liter_minor: i64,
        pub total_price_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordList {
        /// Newest first.
        pub records: Vec<RecordView>,
    }
}

pub mod stats {
    use super::*;

    /// Figures over every refuel of the user.
    ///
    /// `None` means there was nothing to compute the value from, which is
    /// not the same as a computed zero.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FleetStats {
        pub record_count: usize,
        pub total_liters: f64,
        pub total_spent_minor: i64,
        pub average_price_per_liter: Option<f64>,
        pub has_data: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CarStats {
        /// `None` for refuels that reference no known car.
        pub car_id: Option<Uuid>,
        pub name: String,
        pub record_count: usize,
        pub liters: f64,
        pub total_spent_minor: i64,
        pub average_price_per_liter: Option<f64>,
        pub min_mileage: f64,
        pub max_mileage: f64,
        pub average_consumption_per_100: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Statistics {
        pub fleet: FleetStats,
        /// Sorted by car name, unknown car last.
        pub cars: Vec<CarStats>,
    }
}
