//! Inference credit amounts.
//!
//! Amounts are stored as base units (1 credit = 10^9 base units) internally
//! for precision, with convenient conversion to/from decimal credits.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Base units per credit (10^9).
pub const BASE_UNITS_PER_CREDIT: u64 = 1_000_000_000;

/// An amount of inference credits.
///
/// Internally stored as base units for precision. Non-negativity is
/// structural: the representation cannot hold a negative balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Credits {
    base_units: u64,
}

impl Credits {
    /// Zero credits.
    pub const ZERO: Self = Self { base_units: 0 };

    /// Maximum amount (`u64::MAX` base units).
    pub const MAX: Self = Self {
        base_units: u64::MAX,
    };

    /// Create an amount from base units.
    #[must_use]
    pub const fn from_base_units(base_units: u64) -> Self {
        Self { base_units }
    }

    /// Create an amount from decimal credits.
    ///
    /// # Panics
    ///
    /// Panics if the amount is negative.
    #[must_use]
    pub fn credits(amount: f64) -> Self {
        assert!(amount >= 0.0, "amount must be non-negative");
        let base_units = (amount * BASE_UNITS_PER_CREDIT as f64).round() as u64;
        Self { base_units }
    }

    /// Try to create an amount from decimal credits.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative or not finite.
    pub fn try_credits(amount: f64) -> Result<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::InvalidAmount {
                message: "amount must be a non-negative finite number".to_string(),
            });
        }
        Ok(Self::credits(amount))
    }

    /// Get the amount in base units.
    #[must_use]
    pub const fn base_units(&self) -> u64 {
        self.base_units
    }

    /// Get the amount in decimal credits.
    #[must_use]
    pub fn as_credits(&self) -> f64 {
        self.base_units as f64 / BASE_UNITS_PER_CREDIT as f64
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.base_units == 0
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.base_units.checked_add(other.base_units) {
            Some(base_units) => Some(Self { base_units }),
            None => None,
        }
    }

    /// Checked subtraction.
    #[must_use]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.base_units.checked_sub(other.base_units) {
            Some(base_units) => Some(Self { base_units }),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(&self, other: Self) -> Self {
        Self {
            base_units: self.base_units.saturating_add(other.base_units),
        }
    }

    /// Multiply a per-unit price by a unit count, saturating on overflow.
    #[must_use]
    pub const fn saturating_mul(&self, count: u64) -> Self {
        Self {
            base_units: self.base_units.saturating_mul(count),
        }
    }
}

impl Default for Credits {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.base_units / BASE_UNITS_PER_CREDIT;
        let frac = self.base_units % BASE_UNITS_PER_CREDIT;
        if frac == 0 {
            write!(f, "{whole} credits")
        } else {
            let digits = format!("{frac:09}");
            write!(f, "{whole}.{} credits", digits.trim_end_matches('0'))
        }
    }
}

impl Add for Credits {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            base_units: self.base_units + other.base_units,
        }
    }
}

impl Sub for Credits {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            base_units: self.base_units - other.base_units,
        }
    }
}

impl From<u64> for Credits {
    fn from(base_units: u64) -> Self {
        Self::from_base_units(base_units)
    }
}
