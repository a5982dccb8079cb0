//! Login identity of a Grabit account.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why an address was refused at registration or login.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {} characters", Email::MAX_LENGTH)]
    TooLong,
    #[error("email must look like name@domain")]
    Malformed,
}

/// An account email as stored in `grabit.user.email`.
///
/// Input is trimmed and the part after the last `@` is lower-cased, so
/// `Ana@Shop.COM` and `Ana@shop.com` log in to the same account.
///
/// ```
/// use grabit_core::Email;
///
/// assert_eq!(Email::parse(" Ana@Shop.COM ").unwrap().as_str(), "Ana@shop.com");
/// assert!(Email::parse("ana@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Width of the `email` column.
    pub const MAX_LENGTH: usize = 100;

    /// Normalize and check an address typed into a form.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Empty` for blank input, `EmailError::TooLong` past
    /// 100 characters and `EmailError::Malformed` when either side of the
    /// last `@` is missing.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(EmailError::Empty);
        }
        if input.chars().count() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong);
        }

        match input.rsplit_once('@') {
            Some((name, domain)) if !name.is_empty() && !domain.is_empty() => {
                Ok(Self(format!("{name}@{}", domain.to_lowercase())))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_addresses() {
        for ok in [
            "buyer@grabit.test",
            "first.last+cart@mail.grabit.test",
            "a@b",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok} should parse");
        }
    }

    #[test]
    fn test_domain_is_lower_cased_and_name_kept() {
        let email = Email::parse("\tAna.Silva@Grabit.TEST\n").unwrap();
        assert_eq!(email.as_str(), "Ana.Silva@grabit.test");
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(Email::parse("  "), Err(EmailError::Empty));
    }

    #[test]
    fn test_column_width() {
        let at_limit = format!("{}@grabit.test", "a".repeat(88));
        assert_eq!(at_limit.len(), 100);
        assert!(Email::parse(&at_limit).is_ok());

        let over = format!("a{at_limit}");
        assert_eq!(Email::parse(&over), Err(EmailError::TooLong));
    }

    #[test]
    fn test_missing_parts() {
        for bad in ["grabit.test", "@grabit.test", "buyer@"] {
            assert_eq!(Email::parse(bad), Err(EmailError::Malformed), "{bad}");
        }
    }

    #[test]
    fn test_last_at_splits() {
        let email: Email = "odd@name@Grabit.TEST".parse().unwrap();
        assert_eq!(email.to_string(), "odd@name@grabit.test");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("buyer@grabit.test").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"buyer@grabit.test\"");
    }
}
