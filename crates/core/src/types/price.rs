//! Prices and discounts using decimal arithmetic.
//!
//! A [`Price`] is a non-negative amount with two decimal places, matching the
//! `NUMERIC(10,2)` column it is stored in. A [`DiscountPercent`] is a
//! percentage in `0..=100` with one decimal place (`NUMERIC(4,1)`).
//!
//! ```
//! use grabit_core::{DiscountPercent, Price};
//! use rust_decimal::Decimal;
//!
//! let price = Price::new(Decimal::new(1999, 2)).unwrap(); // 19.99
//! let discount = DiscountPercent::new(Decimal::from(10)).unwrap();
//! assert_eq!(price.discounted(discount).to_string(), "17.99");
//! ```

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Price`] or [`DiscountPercent`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("'{0}' is not a valid number")]
    NotANumber(String),
    /// The price is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The price does not fit the stored precision.
    #[error("price must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
    /// The discount is outside `0..=100`.
    #[error("discount must be between 0 and 100 percent")]
    DiscountOutOfRange,
}

/// A non-negative amount of money with two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price, the column default.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Maximum representable price (exclusive): 10^8, eight integer digits.
    #[must_use]
    pub fn max_exclusive() -> Decimal {
        Decimal::from(100_000_000_i64)
    }

    /// Create a price, rounding to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero and
    /// `PriceError::TooLarge` when the amount needs more than eight integer
    /// digits.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded >= Self::max_exclusive() {
            return Err(PriceError::TooLarge {
                max: Self::max_exclusive(),
            });
        }
        Ok(Self(rounded))
    }

    /// Parse a price from form input such as `"499"` or `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` when the input is not a decimal, or
    /// any error from [`Price::new`].
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let input = input.trim();
        let amount =
            Decimal::from_str(input).map_err(|_| PriceError::NotANumber(input.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Apply a percentage discount: `price - price * percent / 100`.
    ///
    /// The result is rounded half away from zero to two decimal places and
    /// can never be negative since the discount is capped at 100%.
    #[must_use]
    pub fn discounted(self, discount: DiscountPercent) -> Self {
        let off = self.0 * discount.0 / Decimal::ONE_HUNDRED;
        let amount =
            (self.0 - off).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self(amount.max(Decimal::ZERO))
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A percentage discount between 0 and 100 with one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountPercent(Decimal);

impl DiscountPercent {
    /// No discount, the column default.
    pub const NONE: Self = Self(Decimal::ZERO);

    /// Create a discount, rounding to one decimal place.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::DiscountOutOfRange` outside `0..=100`.
    pub fn new(percent: Decimal) -> Result<Self, PriceError> {
        let rounded = percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        if rounded < Decimal::ZERO || rounded > Decimal::ONE_HUNDRED {
            return Err(PriceError::DiscountOutOfRange);
        }
        Ok(Self(rounded))
    }

    /// Parse a discount from form input; blank input means no discount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` or `PriceError::DiscountOutOfRange`.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::NONE);
        }
        let percent =
            Decimal::from_str(input).map_err(|_| PriceError::NotANumber(input.to_owned()))?;
        Self::new(percent)
    }

    /// The underlying percentage.
    #[must_use]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Whether any discount applies.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.0.is_zero()
    }
}

impl Default for DiscountPercent {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
mod pg {
    use rust_decimal::Decimal;

    use super::{DiscountPercent, Price};

    macro_rules! numeric_newtype {
        ($name:ident) => {
            impl sqlx::Type<sqlx::Postgres> for $name {
                fn type_info() -> sqlx::postgres::PgTypeInfo {
                    <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
                }

                fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                    <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
                }
            }

            impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
                fn decode(
                    value: sqlx::postgres::PgValueRef<'r>,
                ) -> Result<Self, sqlx::error::BoxDynError> {
                    let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                    // CHECK constraints keep stored values in range
                    Ok(Self(amount))
                }
            }

            impl sqlx::Encode<'_, sqlx::Postgres> for $name {
                fn encode_by_ref(
                    &self,
                    buf: &mut sqlx::postgres::PgArgumentBuffer,
                ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                    <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
                }
            }
        };
    }

    numeric_newtype!(Price);
    numeric_newtype!(DiscountPercent);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_price_rejects_negative() {
        assert_eq!(Price::new(dec("-0.01")), Err(PriceError::Negative));
    }

    #[test]
    fn test_price_allows_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_price_rounds_to_cents() {
        assert_eq!(Price::new(dec("10.005")).unwrap().to_string(), "10.01");
        assert_eq!(Price::new(dec("10.004")).unwrap().to_string(), "10.00");
    }

    #[test]
    fn test_price_too_large() {
        assert!(matches!(
            Price::new(dec("100000000")),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(Price::new(dec("99999999.99")).is_ok());
    }

    #[test]
    fn test_price_parse() {
        assert_eq!(Price::parse(" 499 ").unwrap().to_string(), "499.00");
        assert!(matches!(
            Price::parse("abc"),
            Err(PriceError::NotANumber(_))
        ));
    }

    #[test]
    fn test_discount_bounds() {
        assert!(DiscountPercent::new(Decimal::ZERO).is_ok());
        assert!(DiscountPercent::new(Decimal::ONE_HUNDRED).is_ok());
        assert_eq!(
            DiscountPercent::new(dec("100.1")),
            Err(PriceError::DiscountOutOfRange)
        );
        assert_eq!(
            DiscountPercent::new(dec("-1")),
            Err(PriceError::DiscountOutOfRange)
        );
    }

    #[test]
    fn test_discount_blank_is_none() {
        assert_eq!(DiscountPercent::parse("").unwrap(), DiscountPercent::NONE);
        assert!(!DiscountPercent::NONE.is_active());
    }

    #[test]
    fn test_discounted_price() {
        let price = Price::parse("1000").unwrap();
        let discount = DiscountPercent::parse("12.5").unwrap();
        assert_eq!(price.discounted(discount).to_string(), "875.00");
    }

    #[test]
    fn test_discounted_price_rounds_half_away_from_zero() {
        // 0.99 * 0.5 = 0.495 -> 0.50
        let price = Price::parse("0.99").unwrap();
        let discount = DiscountPercent::parse("50").unwrap();
        assert_eq!(price.discounted(discount).to_string(), "0.50");
    }

    #[test]
    fn test_full_discount_is_free() {
        let price = Price::parse("59.99").unwrap();
        let discount = DiscountPercent::parse("100").unwrap();
        assert_eq!(price.discounted(discount), Price::ZERO);
    }

    #[test]
    fn test_no_discount_keeps_price() {
        let price = Price::parse("59.99").unwrap();
        assert_eq!(price.discounted(DiscountPercent::NONE), price);
    }

    #[test]
    fn test_discount_display_drops_trailing_zero() {
        assert_eq!(DiscountPercent::parse("15.0").unwrap().to_string(), "15");
        assert_eq!(DiscountPercent::parse("7.5").unwrap().to_string(), "7.5");
    }
}
