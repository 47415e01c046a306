//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors from parsing a price entered in a form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's default currency.
    #[must_use]
    pub fn store(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::default())
    }

    /// Parse a non-negative amount as typed into an admin form.
    ///
    /// A leading currency symbol and surrounding whitespace are tolerated.
    /// The result is rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the input is not a number or is negative.
    pub fn parse_amount(input: &str) -> Result<Decimal, PriceError> {
        let trimmed = input.trim().trim_start_matches('$').trim();
        let amount = Decimal::from_str(trimmed).map_err(|_| PriceError::NotANumber)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{}{rounded:.2}", self.currency_code.symbol())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_cents() {
        assert_eq!(Price::store(Decimal::new(5, 0)).to_string(), "$5.00");
        assert_eq!(Price::store(Decimal::new(1999, 2)).to_string(), "$19.99");
        assert_eq!(
            Price::new(Decimal::new(12345, 3), CurrencyCode::EUR).to_string(),
            "€12.35"
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(Price::parse_amount("12.5").unwrap(), Decimal::new(1250, 2));
        assert_eq!(Price::parse_amount(" $3 ").unwrap(), Decimal::new(3, 0));
        assert_eq!(Price::parse_amount("0").unwrap(), Decimal::ZERO);
        assert_eq!(Price::parse_amount("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse_amount("-1"), Err(PriceError::Negative));
    }
}
