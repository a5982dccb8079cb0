//! Product ratings and their average.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Error returned for a rating outside `1..=5`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max}, got {got}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    /// The rejected value.
    pub got: i32,
}

/// A star rating from 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(u8);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: i32 = 1;
    /// Highest allowed rating.
    pub const MAX: i32 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns `RatingError` when `value` is outside `1..=5`.
    pub fn new(value: i32) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            u8::try_from(value)
                .map(Self)
                .map_err(|_| RatingError { got: value })
        } else {
            Err(RatingError { got: value })
        }
    }

    /// The rating as an integer.
    #[must_use]
    pub fn value(self) -> i32 {
        i32::from(self.0)
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arithmetic mean of `ratings`, rounded to one decimal place with ties to even.
///
/// Returns zero when there are no ratings, which templates show as
/// "not rated yet".
///
/// ```
/// use grabit_core::{Rating, average_rating};
/// use rust_decimal::Decimal;
///
/// let ratings = [Rating::new(5).unwrap(), Rating::new(4).unwrap(), Rating::new(4).unwrap()];
/// assert_eq!(average_rating(&ratings), Decimal::new(43, 1));
/// assert_eq!(average_rating(&[]), Decimal::ZERO);
/// ```
#[must_use]
pub fn average_rating(ratings: &[Rating]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(r.value())).sum();
    let count = Decimal::from(ratings.len());
    (Decimal::from(sum) / count).round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rating {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.value(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ratings(values: &[i32]) -> Vec<Rating> {
        values.iter().map(|v| Rating::new(*v).unwrap()).collect()
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(Rating::new(6), Err(RatingError { got: 6 }));
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_rating_error_message() {
        let err = Rating::new(9).unwrap_err();
        assert_eq!(err.to_string(), "rating must be between 1 and 5, got 9");
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average_rating(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_average_single() {
        assert_eq!(average_rating(&ratings(&[3])), Decimal::from(3));
    }

    #[test]
    fn test_average_rounds_to_one_place() {
        // 14 / 3 = 4.666.. -> 4.7
        assert_eq!(average_rating(&ratings(&[5, 5, 4])), Decimal::new(47, 1));
        // 7 / 4 = 1.75 -> 1.8
        assert_eq!(average_rating(&ratings(&[1, 2, 2, 2])), Decimal::new(18, 1));
    }

    #[test]
    fn test_average_ties_round_to_even() {
        // 9 / 4 = 2.25 -> 2.2
        assert_eq!(average_rating(&ratings(&[2, 2, 2, 3])), Decimal::new(22, 1));
        // 17 / 4 = 4.25 -> 4.2
        assert_eq!(average_rating(&ratings(&[4, 4, 4, 5])), Decimal::new(42, 1));
        // 15 / 4 = 3.75 -> 3.8
        assert_eq!(average_rating(&ratings(&[3, 4, 4, 4])), Decimal::new(38, 1));
    }

    #[test]
    fn test_rating_deserialize_validates() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("7").is_err());
    }
}
