//! Per-request data every page layout needs.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::db::CartRepository;
use crate::middleware::{CspNonce, FlashMessage, Flashes, OptionalAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Header and footer data for `base.html`.
pub struct PageContext {
    pub current_user: Option<CurrentUser>,
    pub flashes: Vec<FlashMessage>,
    /// Lines in the visitor's cart, shown as a badge (0 or 1).
    pub cart_count: i64,
    pub nonce: String,
}

impl PageContext {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.current_user.as_ref().is_some_and(|u| u.is_seller)
    }

    #[must_use]
    pub fn user_email(&self) -> &str {
        self.current_user.as_ref().map_or("", |u| u.email.as_str())
    }

    /// Header greeting: the account's name, or its email for sessions that
    /// predate names being stored.
    #[must_use]
    pub fn user_name(&self) -> &str {
        match &self.current_user {
            Some(user) if !user.name.is_empty() => &user.name,
            _ => self.user_email(),
        }
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalAuth(current_user) = OptionalAuth::from_request_parts(parts, state).await?;
        let Flashes(flashes) = Flashes::from_request_parts(parts, state).await?;
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state).await?;

        let cart_count = match &current_user {
            Some(user) => CartRepository::new(state.pool())
                .count(user.id)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to count cart lines");
                    0
                }),
            None => 0,
        };

        Ok(Self {
            current_user,
            flashes,
            cart_count,
            nonce,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grabit_core::{Email, UserId};

    use super::*;

    fn page(name: &str) -> PageContext {
        PageContext {
            current_user: Some(CurrentUser {
                id: UserId::new(1),
                email: Email::parse("ana@grabit.test").unwrap(),
                name: name.to_owned(),
                is_seller: false,
            }),
            flashes: Vec::new(),
            cart_count: 0,
            nonce: String::new(),
        }
    }

    #[test]
    fn test_header_shows_account_name() {
        assert_eq!(page("Ana Silva").user_name(), "Ana Silva");
    }

    #[test]
    fn test_header_falls_back_to_email() {
        assert_eq!(page("").user_name(), "ana@grabit.test");
    }

    #[test]
    fn test_anonymous_visitor() {
        let page = PageContext {
            current_user: None,
            ..page("Ana")
        };
        assert!(!page.is_logged_in());
        assert_eq!(page.user_name(), "");
    }
}
