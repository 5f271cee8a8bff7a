use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use crate::{
    EngineError, Volume,
    util::{fmt_hundredths, parse_hundredths},
};

/// Money amount represented as **integer cents**.
///
/// Use this type for **all** prices in the engine (price per liter, total
/// paid, aggregated spend) to avoid floating-point drift: sums over any
/// number of refuels are exact and do not depend on the order of the records.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The amount in major units (`1234` cents is `12.34`).
    #[must_use]
    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Price of `volume` liters at `self` per liter, rounded to the cent.
    #[must_use]
    pub fn times_volume(self, volume: Volume) -> MoneyCents {
        // cents * centiliters / 100, rounded half away from zero
        let product = i128::from(self.0) * i128::from(volume.centiliters());
        MoneyCents(div_round(product, 100))
    }

    /// Price per liter when `self` was paid for `volume`, rounded to the cent.
    ///
    /// Returns `None` for an empty volume.
    #[must_use]
    pub fn per_liter(self, volume: Volume) -> Option<MoneyCents> {
        if volume.centiliters() == 0 {
            return None;
        }
        let scaled = i128::from(self.0) * 100;
        Some(MoneyCents(div_round(scaled, i128::from(volume.centiliters()))))
    }
}

fn div_round(numerator: i128, denominator: i128) -> i64 {
    let half = denominator.abs() / 2;
    let rounded = if (numerator < 0) == (denominator < 0) {
        (numerator.abs() + half) / denominator.abs()
    } else {
        -((numerator.abs() + half) / denominator.abs())
    };
    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_hundredths(self.0, f)
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    /// Saturates at the `i64` bounds.
    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        *self = *self + rhs;
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s, "amount").map(MoneyCents)
    }
}
