//! Validation of new refuels.
//!
//! A refuel is entered either with the total paid or with the price per
//! liter; the missing one is derived here so that every stored record carries
//! both and `total_price ≈ price_per_liter * liters` holds from the start.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, FuelRecord, MoneyCents, ResultEngine, Volume};

/// Largest quantity accepted for a single refuel (10 000 L).
pub const MAX_LITERS: Volume = Volume::new(10_000_00);
/// Largest accepted price per liter (100 000.00).
pub const MAX_PRICE_PER_LITER: MoneyCents = MoneyCents::new(100_000_00);
/// Largest accepted amount paid for a single refuel.
pub const MAX_TOTAL_PRICE: MoneyCents = MoneyCents::new(1_000_000_000_00);
/// Largest accepted odometer reading, in km.
pub const MAX_MILEAGE: f64 = 10_000_000.0;

/// How the price of a refuel was entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceInput {
    /// Amount paid at the pump; price per liter is derived.
    Total(MoneyCents),
    /// Price on the pump display; total is derived.
    PerLiter(MoneyCents),
    /// Both known; they must agree up to rounding.
    Both {
        total: MoneyCents,
        per_liter: MoneyCents,
    },
}

/// Create a refuel record.
#[derive(Clone, Debug)]
pub struct NewFuelRecord {
    pub car_id: Uuid,
    pub date: NaiveDate,
    pub mileage: f64,
    pub liters: Volume,
    pub price: PriceInput,
}

impl NewFuelRecord {
    #[must_use]
    pub fn new(car_id: Uuid, date: NaiveDate, mileage: f64, liters: Volume, price: PriceInput) -> Self {
        Self {
            car_id,
            date,
            mileage,
            liters,
            price,
        }
    }

    /// Check the values and resolve `(price_per_liter, total_price)`.
    pub fn validate(&self) -> ResultEngine<(MoneyCents, MoneyCents)> {
        if !self.liters.is_positive() {
            return Err(EngineError::InvalidAmount(
                "liters must be > 0".to_string(),
            ));
        }
        if self.liters > MAX_LITERS {
            return Err(EngineError::InvalidAmount(format!(
                "liters must be <= {MAX_LITERS}"
            )));
        }
        if !self.mileage.is_finite() || self.mileage < 0.0 {
            return Err(EngineError::InvalidAmount(
                "mileage must be >= 0".to_string(),
            ));
        }
        if self.mileage > MAX_MILEAGE {
            return Err(EngineError::InvalidAmount(format!(
                "mileage must be <= {MAX_MILEAGE}"
            )));
        }

        let (per_liter, total) = match self.price {
            PriceInput::Total(total) => {
                let per_liter = total.per_liter(self.liters).ok_or_else(|| {
                    EngineError::InvalidAmount("liters must be > 0".to_string())
                })?;
                (per_liter, total)
            }
            PriceInput::PerLiter(per_liter) => (per_liter, per_liter.times_volume(self.liters)),
            PriceInput::Both { total, per_liter } => (per_liter, total),
        };

        if per_liter.is_negative() || total.is_negative() {
            return Err(EngineError::InvalidAmount(
                "price must be >= 0".to_string(),
            ));
        }
        if per_liter > MAX_PRICE_PER_LITER {
            return Err(EngineError::InvalidAmount(format!(
                "price per liter must be <= {MAX_PRICE_PER_LITER}"
            )));
        }
        if total > MAX_TOTAL_PRICE {
            return Err(EngineError::InvalidAmount(format!(
                "total price must be <= {MAX_TOTAL_PRICE}"
            )));
        }
        if let PriceInput::Both { .. } = self.price
            && !prices_agree(per_liter, total, self.liters)
        {
            return Err(EngineError::InvalidAmount(format!(
                "total price {total} does not match {per_liter} per liter"
            )));
        }

        Ok((per_liter, total))
    }

    /// Build the record for `user_id`, labelled with the current car name.
    pub(crate) fn into_record(self, user_id: &str, car_name: &str) -> ResultEngine<FuelRecord> {
        let (price_per_liter, total_price) = self.validate()?;
        Ok(FuelRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            car_id: Some(self.car_id),
            car: Some(car_name.to_string()),
            date: self.date,
            mileage: self.mileage,
            liters: self.liters,
            price_per_liter,
            total_price,
        })
    }
}

/// Either price is what the other one derives to, give or take a cent on
/// the total.
fn prices_agree(per_liter: MoneyCents, total: MoneyCents, liters: Volume) -> bool {
    let expected_total = per_liter.times_volume(liters);
    (expected_total.cents() - total.cents()).abs() <= 1
        || total.per_liter(liters) == Some(per_liter)
}
