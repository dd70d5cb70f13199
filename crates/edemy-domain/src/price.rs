//! Course price in integer cents.
//!
//! Clients send and receive prices as dollar amounts (`9.99`); storage and
//! payment gateways work in the smallest currency unit.

use serde::{Deserialize, Serialize};

/// Share of each paid enrollment retained by the platform.
pub const PLATFORM_FEE_PERCENT: i64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("price must be a finite number")]
    NotFinite,
    #[error("price must not be negative")]
    Negative,
    #[error("price must not exceed 999999.99")]
    TooLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// `9.99`, applied when a course is created without a price.
    pub const DEFAULT: Price = Price(999);

    /// Largest single charge the payment processor accepts.
    pub const MAX_CENTS: i64 = 99_999_999;

    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        if cents > Self::MAX_CENTS {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(cents))
    }

    pub fn from_dollars(amount: f64) -> Result<Self, PriceError> {
        if !amount.is_finite() {
            return Err(PriceError::NotFinite);
        }
        if amount < 0.0 {
            return Err(PriceError::Negative);
        }
        let cents = (amount * 100.0).round();
        if cents > Self::MAX_CENTS as f64 {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(cents as i64))
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Platform fee for one sale, rounded half up to the nearest cent.
    /// Cannot overflow: cents are capped at `MAX_CENTS`.
    pub fn platform_fee(self) -> i64 {
        (self.0 * PLATFORM_FEE_PERCENT + 50) / 100
    }

    /// Amount transferred to the instructor after the platform fee.
    pub fn instructor_share(self) -> i64 {
        self.0 - self.platform_fee()
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::DEFAULT
    }
}
