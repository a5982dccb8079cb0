//! Authentication extractors.
//!
//! The logged-in user lives in the session under
//! [`session_keys::CURRENT_USER`]. [`OptionalAuth`] reads that copy as is and
//! only drives page chrome. [`RequireAuth`] and [`RequireSeller`] guard
//! actions, so they reload the account on every request: a deactivated
//! account is logged out and a revoked seller loses seller access at once.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/login/";

/// Where logged-in users without a store are sent.
pub const NEW_STORE_PATH: &str = "/seller-account/new";

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in seller.
///
/// Users without a store are redirected to open one.
pub struct RequireSeller(pub CurrentUser);

/// Error returned when an extractor's requirement is not met.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Redirect to the store creation page.
    RedirectToNewStore,
    /// No session layer on this route.
    Unauthorized,
    /// The account could not be loaded.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::RedirectToNewStore => Redirect::to(NEW_STORE_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

fn session(parts: &Parts) -> Result<&Session, AuthRejection> {
    // Set by SessionManagerLayer
    parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)
}

async fn current_user(parts: &Parts) -> Result<Option<CurrentUser>, AuthRejection> {
    Ok(session(parts)?
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten())
}

/// What the session may keep claiming, given the account as stored now.
///
/// `None` when the account is gone or deactivated.
fn still_allowed(account: Option<&User>) -> Option<CurrentUser> {
    account.filter(|user| user.is_active).map(CurrentUser::from)
}

/// The session user, checked against the database.
async fn verified_user(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let stored = current_user(parts)
        .await?
        .ok_or(AuthRejection::RedirectToLogin)?;

    let account = UserRepository::new(state.pool())
        .get_by_id(stored.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %stored.id, "Failed to reload session user");
            AuthRejection::Unavailable
        })?;

    let session = session(parts)?;
    let Some(fresh) = still_allowed(account.as_ref()) else {
        tracing::info!(user_id = %stored.id, "Session user no longer active, logging out");
        if let Err(e) = session.flush().await {
            tracing::warn!(error = %e, "Failed to flush session");
        }
        return Err(AuthRejection::RedirectToLogin);
    };

    if fresh != stored
        && let Err(e) = session.insert(session_keys::CURRENT_USER, &fresh).await
    {
        tracing::warn!(error = %e, "Failed to refresh session user");
    }
    Ok(fresh)
}

/// Seller access as of now.
fn require_seller(user: CurrentUser) -> Result<CurrentUser, AuthRejection> {
    if user.is_seller {
        Ok(user)
    } else {
        Err(AuthRejection::RedirectToNewStore)
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        verified_user(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_seller(verified_user(parts, state).await?).map(Self)
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await.ok().flatten()))
    }
}

/// Store the logged-in user in the session.
///
/// The session ID is cycled first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use grabit_core::{Email, UserId};

    use super::*;

    fn account(is_seller: bool, is_active: bool) -> User {
        User {
            id: UserId::new(5),
            email: Email::parse("seller@grabit.test").unwrap(),
            first_name: "Sam".to_owned(),
            last_name: "Seller".to_owned(),
            is_seller,
            mobile_no: String::new(),
            dob: None,
            default_address: None,
            is_active,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_revoked_seller_loses_seller_access() {
        // The session was written while the user was still a seller
        let at_login = CurrentUser::from(&account(true, true));
        assert!(require_seller(at_login).is_ok());

        let now = still_allowed(Some(&account(false, true))).unwrap();
        assert!(!now.is_seller);
        assert!(matches!(
            require_seller(now),
            Err(AuthRejection::RedirectToNewStore)
        ));
    }

    #[test]
    fn test_deactivated_account_is_refused() {
        assert!(still_allowed(Some(&account(true, false))).is_none());
    }

    #[test]
    fn test_deleted_account_is_refused() {
        assert!(still_allowed(None).is_none());
    }

    #[test]
    fn test_active_account_keeps_its_name() {
        let user = still_allowed(Some(&account(false, true))).unwrap();
        assert_eq!(user.id, UserId::new(5));
        assert_eq!(user.name, "Sam Seller");
    }

    #[test]
    fn test_rejection_responses() {
        let to_login = AuthRejection::RedirectToLogin.into_response();
        assert_eq!(to_login.status(), StatusCode::SEE_OTHER);
        assert_eq!(to_login.headers()["location"], LOGIN_PATH);

        let to_store = AuthRejection::RedirectToNewStore.into_response();
        assert_eq!(to_store.headers()["location"], NEW_STORE_PATH);

        assert_eq!(
            AuthRejection::Unavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
