//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront trades in a single currency (INR). Prices are stored as
//! exact decimals in rupees; the payment gateway deals in minor units
//! (paise), so conversions in both directions live here.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price in rupees, held as an exact decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal rupee amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in paise (minor units).
    #[must_use]
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, 2))
    }

    /// The rupee amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount in paise, rounded to the nearest unit.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn to_paise(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED).round().to_i64()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\u{20b9}{:.2}", self.0)
    }
}
