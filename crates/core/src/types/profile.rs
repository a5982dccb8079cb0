//! Profile fields for users and store accounts.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing profile fields.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The mobile number is not 7-15 digits with an optional leading `+`.
    #[error("mobile number must be 7 to 15 digits, optionally starting with +")]
    InvalidMobileNumber,
    /// The store name is empty.
    #[error("store name cannot be empty")]
    EmptyStoreName,
    /// The store name is too long.
    #[error("store name must be at most {max} characters")]
    StoreNameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A contact phone number, stored in a 15 character column.
///
/// Spaces and dashes are accepted on input and stripped.
///
/// ```
/// use grabit_core::MobileNumber;
///
/// assert_eq!(MobileNumber::parse("+91 98765-43210").unwrap().as_str(), "+919876543210");
/// assert!(MobileNumber::parse("12ab").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Maximum stored length, including a leading `+`.
    pub const MAX_LENGTH: usize = 15;
    const MIN_DIGITS: usize = 7;

    /// Parse a mobile number.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::InvalidMobileNumber` if the cleaned input is not
    /// an optional `+` followed by 7-15 digits, or exceeds 15 characters.
    pub fn parse(s: &str) -> Result<Self, ProfileError> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

        if digits.len() < Self::MIN_DIGITS
            || cleaned.len() > Self::MAX_LENGTH
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ProfileError::InvalidMobileNumber);
        }

        Ok(Self(cleaned))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A store's public name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreName(String);

impl StoreName {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a store name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or over-long names.
    pub fn parse(s: &str) -> Result<Self, ProfileError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProfileError::EmptyStoreName);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(ProfileError::StoreNameTooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_number_valid() {
        assert!(MobileNumber::parse("9876543210").is_ok());
        assert!(MobileNumber::parse("+14155552671").is_ok());
        assert!(MobileNumber::parse("  0800-123-456 ").is_ok());
    }

    #[test]
    fn test_mobile_number_too_short() {
        assert_eq!(
            MobileNumber::parse("12345"),
            Err(ProfileError::InvalidMobileNumber)
        );
    }

    #[test]
    fn test_mobile_number_too_long() {
        assert!(MobileNumber::parse("1234567890123456").is_err());
        assert!(MobileNumber::parse("+123456789012345").is_err());
    }

    #[test]
    fn test_mobile_number_rejects_letters() {
        assert!(MobileNumber::parse("98765abc10").is_err());
        assert!(MobileNumber::parse("++98765432").is_err());
    }

    #[test]
    fn test_store_name() {
        assert_eq!(
            StoreName::parse("  Corner Shop ").map(|n| n.to_string()),
            Ok("Corner Shop".to_owned())
        );
        assert_eq!(StoreName::parse(" "), Err(ProfileError::EmptyStoreName));
        assert!(matches!(
            StoreName::parse(&"s".repeat(101)),
            Err(ProfileError::StoreNameTooLong { max: 100 })
        ));
    }
}
