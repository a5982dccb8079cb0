//! User domain types.

use chrono::{DateTime, NaiveDate, Utc};

use grabit_core::{Email, MobileNumber, UserId};

/// A registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_seller: bool,
    /// Contact number; empty when the user never gave one.
    pub mobile_no: String,
    pub dob: Option<NaiveDate>,
    pub default_address: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Full name, or the email address when no name was given.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.to_string()
        } else {
            full.to_owned()
        }
    }
}

/// Fields collected at registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub mobile_no: Option<MobileNumber>,
    pub dob: Option<NaiveDate>,
    pub default_address: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("ana@example.com").unwrap(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            is_seller: false,
            mobile_no: String::new(),
            dob: None,
            default_address: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user("Ana", "Silva").display_name(), "Ana Silva");
        assert_eq!(user("Ana", "").display_name(), "Ana");
        assert_eq!(user("", "").display_name(), "ana@example.com");
    }
}
