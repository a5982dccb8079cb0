//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] grabit_core::EmailError),

    /// Invalid mobile number.
    #[error("invalid profile field: {0}")]
    InvalidProfile(#[from] grabit_core::ProfileError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account has been deactivated.
    #[error("account is inactive")]
    Inactive,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message safe to show on the login or registration form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_owned(),
            Self::InvalidProfile(e) => format!("Please check your details: {e}."),
            Self::InvalidCredentials | Self::UserNotFound => {
                "Invalid email or password.".to_owned()
            }
            Self::Inactive => "This account has been deactivated.".to_owned(),
            Self::UserAlreadyExists => "An account with this email already exists.".to_owned(),
            Self::PasswordMismatch => "Passwords do not match.".to_owned(),
            Self::WeakPassword(msg) => format!("{msg}."),
            Self::Repository(_) | Self::PasswordHash => {
                "Something went wrong, please try again.".to_owned()
            }
        }
    }
}
