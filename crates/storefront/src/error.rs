//! Handler errors and the Sentry context that goes with them.
//!
//! Page handlers return [`AppError`]. Form handlers mostly turn failures into
//! flash messages and redirect instead, so what reaches this type is either a
//! missing record or something the user cannot fix.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CatalogError, MediaError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A product, store or other record named in the URL does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_)
            | Self::Database(RepositoryError::NotFound)
            | Self::Catalog(CatalogError::NotFound) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_))
            | Self::Auth(AuthError::UserAlreadyExists)
            | Self::Catalog(CatalogError::AlreadyRated) => StatusCode::CONFLICT,
            Self::Auth(AuthError::InvalidCredentials | AuthError::UserNotFound) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::Inactive) => StatusCode::FORBIDDEN,
            Self::Database(_)
            | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
            | Self::Catalog(CatalogError::Repository(_) | CatalogError::Media(MediaError::Io(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) | Self::Catalog(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Text shown to the visitor; server faults stay generic.
    fn public_message(&self, status: StatusCode) -> String {
        if status.is_server_error() {
            return "Something went wrong on our side. Please try again.".to_owned();
        }
        match self {
            Self::Auth(err) => err.user_message(),
            Self::Catalog(err) => err.user_message(),
            Self::NotFound(_) | Self::Database(_) => "Page not found.".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        (status, self.public_message(status)).into_response()
    }
}

/// Attach the signed-in account to Sentry events from this scope.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(str::to_owned),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

/// Record a user action so later error reports show what led up to them.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_missing_records_are_404() {
        assert_eq!(
            status_of(AppError::NotFound("product 9".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Catalog(CatalogError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_user_mistakes_are_4xx() {
        assert_eq!(
            status_of(AppError::Catalog(CatalogError::AlreadyRated)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Catalog(CatalogError::MissingName)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::PasswordMismatch)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::Inactive)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_corrupt_rows_are_500_with_generic_text() {
        let err = AppError::Database(RepositoryError::DataCorruption("bad price".to_owned()));
        let status = err.status();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message(status).contains("bad price"));
    }

    #[test]
    fn test_display_names_the_record() {
        assert_eq!(
            AppError::NotFound("store 4".to_owned()).to_string(),
            "not found: store 4"
        );
    }
}
