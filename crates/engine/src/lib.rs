//! Fuel expense tracking: cars, refuels and the statistics derived from them.
//!
//! - [`statistics`] aggregates a snapshot of refuels into fleet and per-car
//!   figures. It is pure and never fails.
//! - [`NewFuelRecord`] validates a refuel before it is stored.
//! - [`RecordStore`] is the read seam statistics are fed from, implemented by
//!   [`InMemoryStore`] and by the SQLite backed [`Engine`].

pub use cars::Car;
pub use error::EngineError;
pub use fuel_records::FuelRecord;
pub use intake::{
    MAX_LITERS, MAX_MILEAGE, MAX_PRICE_PER_LITER, MAX_TOTAL_PRICE, NewFuelRecord, PriceInput,
};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use statistics::{
    CarKey, CarReport, CarSummary, FleetSummary, Measure, StatisticsReport, UNKNOWN_CAR_LABEL,
    compute_fleet_summary, compute_per_car_summary, sort_records_for_display,
};
pub use store::{InMemoryStore, RecordStore, Scope, fleet_report};
pub use volume::Volume;

mod cars;
mod error;
mod fuel_records;
mod intake;
mod money;
mod ops;
pub mod statistics;
mod store;
mod util;
mod volume;

type ResultEngine<T> = Result<T, EngineError>;
