//! Fuel statistics.
//!
//! Pure aggregation over a snapshot of [`FuelRecord`]s: no I/O, no state, one
//! linear pass per call. Callers pre-filter the records to the scope they want
//! (usually one user) and fetch them once per report.
//!
//! Consumption can only be derived from the mileage *range* covered by a car's
//! records, because a record is an odometer reading at refuel time and not a
//! trip distance. A car needs at least two records with different mileage for
//! the figure to exist; anything less is reported as [`Measure::NoData`].

use std::{cmp::Ordering, collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Car, FuelRecord, MoneyCents, Volume};

/// Label used for the bucket of records without a car reference.
pub const UNKNOWN_CAR_LABEL: &str = "Unknown car";

/// A derived figure that may not be computable.
///
/// `Value(0.0)` is a genuine zero (e.g. free fuel). `NoData` means the
/// denominator was zero. A `Value` is always finite.
///
/// Serializes as a JSON number or `null`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Measure {
    Value(f64),
    #[default]
    NoData,
}

impl Measure {
    /// `numerator / denominator`, or `NoData` when the denominator is not
    /// positive or the quotient is not finite.
    #[must_use]
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator <= 0.0 || denominator.is_nan() {
            return Measure::NoData;
        }
        Self::from(Some(numerator / denominator))
    }

    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Measure::Value(v) => Some(v),
            Measure::NoData => None,
        }
    }

    #[must_use]
    pub fn is_no_data(self) -> bool {
        matches!(self, Measure::NoData)
    }
}

impl From<Option<f64>> for Measure {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Measure::Value(v),
            _ => Measure::NoData,
        }
    }
}

impl From<Measure> for Option<f64> {
    fn from(value: Measure) -> Self {
        value.value()
    }
}

/// Two decimals, or `—` when not computable.
impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Value(v) => write!(f, "{v:.2}"),
            Measure::NoData => f.write_str("—"),
        }
    }
}

/// Totals over every record in scope.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FleetSummary {
    pub record_count: usize,
    #[serde(serialize_with = "ser_liters")]
    pub total_liters: Volume,
    #[serde(serialize_with = "ser_money")]
    pub total_spent: MoneyCents,
    pub average_price_per_liter: Measure,
    /// Distinguishes "no records" from records that genuinely cost nothing.
    pub has_data: bool,
}

/// Identity of a per-car group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarKey {
    Car(Uuid),
    /// Records that carry no car reference.
    Unknown,
}

impl CarKey {
    fn of(record: &FuelRecord) -> Self {
        record.car_id.map_or(CarKey::Unknown, CarKey::Car)
    }
}

/// Totals and consumption for one car.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CarSummary {
    /// Name copied on the records; `None` when no record carries one.
    pub label: Option<String>,
    pub record_count: usize,
    #[serde(serialize_with = "ser_liters")]
    pub liters: Volume,
    #[serde(serialize_with = "ser_money")]
    pub total_spent: MoneyCents,
    pub average_price_per_liter: Measure,
    pub min_mileage: f64,
    pub max_mileage: f64,
    /// Liters per 100 km over the covered mileage range.
    pub average_consumption_per_100: Measure,
}

impl CarSummary {
    /// Distance covered between the first and the last odometer reading.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.max_mileage - self.min_mileage
    }
}

/// Aggregate totals across all `records`.
pub fn compute_fleet_summary<'a, I>(records: I) -> FleetSummary
where
    I: IntoIterator<Item = &'a FuelRecord>,
{
    let (record_count, total_liters, total_spent) = records.into_iter().fold(
        (0usize, Volume::ZERO, MoneyCents::ZERO),
        |(count, liters, spent), record| {
            (count + 1, liters + record.liters, spent + record.total_price)
        },
    );

    FleetSummary {
        record_count,
        total_liters,
        total_spent,
        average_price_per_liter: price_per_liter(total_spent, total_liters),
        has_data: record_count > 0,
    }
}

/// Aggregate totals and consumption per car.
///
/// The map's iteration order carries no meaning; use [`StatisticsReport`] for
/// a display ordering.
pub fn compute_per_car_summary<'a, I>(records: I) -> HashMap<CarKey, CarSummary>
where
    I: IntoIterator<Item = &'a FuelRecord>,
{
    let mut groups: HashMap<CarKey, CarAccumulator> = HashMap::new();
    for record in records {
        groups
            .entry(CarKey::of(record))
            .and_modify(|acc| acc.push(record))
            .or_insert_with(|| CarAccumulator::start(record));
    }

    groups
        .into_iter()
        .map(|(key, acc)| (key, acc.finish()))
        .collect()
}

struct CarAccumulator {
    label: Option<String>,
    record_count: usize,
    liters: Volume,
    total_spent: MoneyCents,
    min_mileage: f64,
    max_mileage: f64,
}

impl CarAccumulator {
    fn start(record: &FuelRecord) -> Self {
        Self {
            label: record.car.clone(),
            record_count: 1,
            liters: record.liters,
            total_spent: record.total_price,
            min_mileage: record.mileage,
            max_mileage: record.mileage,
        }
    }

    fn push(&mut self, record: &FuelRecord) {
        self.record_count += 1;
        self.liters += record.liters;
        self.total_spent += record.total_price;
        self.min_mileage = self.min_mileage.min(record.mileage);
        self.max_mileage = self.max_mileage.max(record.mileage);
        // Smallest label wins so the result does not depend on record order.
        if let Some(label) = record.car.as_deref()
            && self.label.as_deref().is_none_or(|current| label < current)
        {
            self.label = Some(label.to_string());
        }
    }

    fn finish(self) -> CarSummary {
        let distance = self.max_mileage - self.min_mileage;
        CarSummary {
            label: self.label,
            record_count: self.record_count,
            liters: self.liters,
            total_spent: self.total_spent,
            average_price_per_liter: price_per_liter(self.total_spent, self.liters),
            min_mileage: self.min_mileage,
            max_mileage: self.max_mileage,
            // centiliters / km == liters per 100 km
            average_consumption_per_100: Measure::ratio(
                self.liters.centiliters() as f64,
                distance,
            ),
        }
    }
}

fn price_per_liter(spent: MoneyCents, liters: Volume) -> Measure {
    // cents / centiliters == major units per liter
    Measure::ratio(spent.cents() as f64, liters.centiliters() as f64)
}

fn ser_liters<S: serde::Serializer>(value: &Volume, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(value.liters())
}

fn ser_money<S: serde::Serializer>(value: &MoneyCents, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(value.as_major())
}

/// One car's line in a [`StatisticsReport`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CarReport {
    pub key: CarKey,
    /// Display name resolved from the car registry.
    pub name: String,
    #[serde(flatten)]
    pub summary: CarSummary,
}

/// Fleet totals plus per-car lines ordered for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub fleet: FleetSummary,
    pub cars: Vec<CarReport>,
}

impl StatisticsReport {
    /// Aggregate `records` and label each group from `cars`.
    ///
    /// Names are resolved once here: the registry name wins, then the name
    /// copied on the records, then [`UNKNOWN_CAR_LABEL`]. Lines are sorted by
    /// name (case-insensitive) with the unknown bucket last.
    pub fn build(records: &[FuelRecord], cars: &[Car]) -> Self {
        let names: HashMap<Uuid, &str> = cars.iter().map(|c| (c.id, c.name.as_str())).collect();

        let mut lines: Vec<CarReport> = compute_per_car_summary(records)
            .into_iter()
            .map(|(key, summary)| {
                let name = match key {
                    CarKey::Car(id) => names
                        .get(&id)
                        .map(|name| (*name).to_string())
                        .or_else(|| summary.label.clone())
                        .unwrap_or_else(|| UNKNOWN_CAR_LABEL.to_string()),
                    CarKey::Unknown => UNKNOWN_CAR_LABEL.to_string(),
                };
                CarReport { key, name, summary }
            })
            .collect();
        lines.sort_by(display_order);

        Self {
            fleet: compute_fleet_summary(records),
            cars: lines,
        }
    }
}

fn display_order(a: &CarReport, b: &CarReport) -> Ordering {
    let unknown = |line: &CarReport| line.key == CarKey::Unknown;
    unknown(a)
        .cmp(&unknown(b))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.key.cmp(&b.key))
}

/// Order records for the expenses table: newest date first, then highest
/// mileage first.
pub fn sort_records_for_display(records: &mut [FuelRecord]) {
    records.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.mileage.total_cmp(&a.mileage))
    });
}
