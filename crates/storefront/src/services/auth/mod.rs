//! Authentication service.
//!
//! Email and password accounts with Argon2id hashing.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::NaiveDate;
use sqlx::PgPool;

use grabit_core::{Email, MobileNumber, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration form input, before validation.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_no: Option<String>,
    pub dob: Option<NaiveDate>,
    pub default_address: Option<String>,
}

impl RegisterInput {
    /// Validate everything that does not need the database.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch`, `AuthError::WeakPassword`,
    /// `AuthError::InvalidEmail` or `AuthError::InvalidProfile`.
    pub fn validate(&self) -> Result<NewUser, AuthError> {
        if self.password != self.password_confirm {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(&self.password)?;

        let email = Email::parse(&self.email)?;
        let mobile_no = non_blank(self.mobile_no.as_deref())
            .map(MobileNumber::parse)
            .transpose()?;

        Ok(NewUser {
            email,
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            mobile_no,
            dob: self.dob,
            default_address: non_blank(self.default_address.as_deref()).map(str::to_owned),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns any validation error from [`RegisterInput::validate`], or
    /// `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, input: &RegisterInput) -> Result<User, AuthError> {
        let new_user = input.validate()?;
        let password_hash = hash_password(&input.password)?;

        self.users
            .create(&new_user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong
    /// and `AuthError::Inactive` for deactivated accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_credentials_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        self.users.touch_last_login(user.id).await?;

        Ok(user)
    }

    /// Create a staff account with every permission.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create_superuser(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or a malformed hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> RegisterInput {
        RegisterInput {
            email: "Shopper@Example.COM".to_owned(),
            password: "correct horse".to_owned(),
            password_confirm: "correct horse".to_owned(),
            first_name: " Ana ".to_owned(),
            last_name: "Silva".to_owned(),
            mobile_no: Some("  ".to_owned()),
            dob: None,
            default_address: Some(String::new()),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2hunter2", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let new_user = input().validate().unwrap();
        assert_eq!(new_user.email.as_str(), "Shopper@example.com");
        assert_eq!(new_user.first_name, "Ana");
        assert!(new_user.mobile_no.is_none());
        assert!(new_user.default_address.is_none());
    }

    #[test]
    fn test_password_mismatch() {
        let mut input = input();
        input.password_confirm = "something else".to_owned();
        assert!(matches!(input.validate(), Err(AuthError::PasswordMismatch)));
    }

    #[test]
    fn test_short_password() {
        let mut input = input();
        input.password = "short".to_owned();
        input.password_confirm = "short".to_owned();
        assert!(matches!(input.validate(), Err(AuthError::WeakPassword(_))));
    }

    #[test]
    fn test_invalid_email() {
        let mut input = input();
        input.email = "not-an-email".to_owned();
        assert!(matches!(input.validate(), Err(AuthError::InvalidEmail(_))));
    }

    #[test]
    fn test_invalid_mobile_number() {
        let mut input = input();
        input.mobile_no = Some("call me".to_owned());
        assert!(matches!(input.validate(), Err(AuthError::InvalidProfile(_))));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let msg = AuthError::PasswordHash.user_message();
        assert!(!msg.contains("hash"));
        assert_eq!(
            AuthError::PasswordMismatch.user_message(),
            "Passwords do not match."
        );
    }
}
