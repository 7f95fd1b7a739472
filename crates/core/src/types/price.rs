//! Type-safe price representation using decimal arithmetic.
//!
//! All SofaHub prices are Kenyan shillings. The API sends amounts as decimal
//! strings (`"12500.00"`); [`Price`] keeps them as [`Decimal`] so totals and
//! the 50% deposit split never go through floating point.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Display prefix for Kenyan shilling amounts.
pub const CURRENCY_PREFIX: &str = "KSh";

/// A price in Kenyan shillings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of shillings.
    #[must_use]
    pub fn from_shillings(shillings: i64) -> Self {
        Self(Decimal::from(shillings))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// The 50% deposit collected online, rounded to cents.
    #[must_use]
    pub fn deposit(&self) -> Self {
        Self((self.0 / Decimal::TWO).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// The balance collected on delivery (`self - deposit`).
    #[must_use]
    pub fn balance(&self) -> Self {
        *self - self.deposit()
    }

    /// Format for display with no minor units, e.g. `KSh 12,500`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = rounded.abs().trunc().to_string();
        let grouped = group_thousands(&digits);
        if negative {
            format!("-{CURRENCY_PREFIX} {grouped}")
        } else {
            format!("{CURRENCY_PREFIX} {grouped}")
        }
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
