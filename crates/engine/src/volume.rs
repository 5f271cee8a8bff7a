use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use crate::{
    EngineError,
    util::{fmt_hundredths, parse_hundredths},
};

/// Fuel quantity represented as **integer hundredths of a liter**.
///
/// Refuels are entered with at most two decimals, so storing centiliters
/// keeps totals exact and independent of summation order.
///
/// ```rust
/// use engine::Volume;
///
/// let volume: Volume = "38,5".parse().unwrap();
/// assert_eq!(volume.centiliters(), 3850);
/// assert_eq!(volume.liters(), 38.5);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Volume(i64);

impl Volume {
    pub const ZERO: Volume = Volume(0);

    #[must_use]
    pub const fn new(centiliters: i64) -> Self {
        Self(centiliters)
    }

    #[must_use]
    pub const fn centiliters(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn liters(self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_hundredths(self.0, f)
    }
}

impl Add for Volume {
    type Output = Volume;

    /// Saturates at the `i64` bounds.
    fn add(self, rhs: Volume) -> Self::Output {
        Volume(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Volume {
    fn add_assign(&mut self, rhs: Volume) {
        *self = *self + rhs;
    }
}

impl Sum for Volume {
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Self {
        iter.fold(Volume::ZERO, Add::add)
    }
}

impl FromStr for Volume {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s, "liters").map(Volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_saturates_instead_of_overflowing() {
        let huge = Volume::new(i64::MAX / 2 + 1);
        let total: Volume = [huge, huge, huge].into_iter().sum();
        assert_eq!(total, Volume::new(i64::MAX));
    }
}
