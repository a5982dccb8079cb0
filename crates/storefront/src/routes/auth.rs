//! Authentication route handlers: login, registration and logout.
//!
//! Failures are reported with a flash message and a redirect back to the
//! form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::context::PageContext;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Flash, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::{AuthService, RegisterInput};
use crate::state::AppState;

const LOGIN_PATH: &str = "/login/";
const REGISTER_PATH: &str = "/register/";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub mobile_no: Option<String>,
    /// `YYYY-MM-DD` from a date input; empty when skipped.
    pub dob: Option<String>,
    pub default_address: Option<String>,
}

impl RegisterForm {
    /// Convert into service input. `None` when the date of birth is malformed.
    fn into_input(self) -> Option<RegisterInput> {
        let dob = match self.dob.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?),
        };

        Some(RegisterInput {
            email: self.email,
            password: self.password,
            password_confirm: self.password_confirm,
            first_name: self.first_name,
            last_name: self.last_name,
            mobile_no: self.mobile_no,
            dob,
            default_address: self.default_address,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page. Logged-in users go home.
pub async fn login_page(page: PageContext) -> Response {
    if page.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate { page }.into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Redirect {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => sign_in(&session, &user, "Welcome back!").await,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Flash::error(&session, e.user_message()).await;
            Redirect::to(LOGIN_PATH)
        }
    }
}

/// Display the registration page. Logged-in users go home.
pub async fn register_page(page: PageContext) -> Response {
    if page.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    RegisterTemplate { page }.into_response()
}

/// Handle registration form submission; a new account is signed in
/// immediately.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Redirect {
    let Some(input) = form.into_input() else {
        Flash::error(&session, "Enter your date of birth as YYYY-MM-DD.").await;
        return Redirect::to(REGISTER_PATH);
    };

    match AuthService::new(state.pool()).register(&input).await {
        Ok(user) => sign_in(&session, &user, "Your account has been created.").await,
        Err(e) => {
            tracing::info!(error = %e, "Registration rejected");
            Flash::error(&session, e.user_message()).await;
            Redirect::to(REGISTER_PATH)
        }
    }
}

/// Log out and return to the home page.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to("/")
}

async fn sign_in(session: &Session, user: &User, greeting: &str) -> Redirect {
    if let Err(e) = set_current_user(session, &CurrentUser::from(user)).await {
        tracing::error!(error = %e, "Failed to store user in session");
        Flash::error(session, "Could not sign you in, please try again.").await;
        return Redirect::to(LOGIN_PATH);
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "User signed in");
    Flash::success(session, greeting).await;
    Redirect::to("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(dob: Option<&str>) -> RegisterForm {
        RegisterForm {
            email: "ann@example.com".to_owned(),
            password: "longenough".to_owned(),
            password_confirm: "longenough".to_owned(),
            first_name: "Ann".to_owned(),
            last_name: String::new(),
            mobile_no: None,
            dob: dob.map(str::to_owned),
            default_address: None,
        }
    }

    #[test]
    fn test_blank_dob_is_skipped() {
        assert_eq!(form(None).into_input().unwrap().dob, None);
        assert_eq!(form(Some(" ")).into_input().unwrap().dob, None);
    }

    #[test]
    fn test_dob_is_parsed() {
        let input = form(Some("1990-04-12")).into_input().unwrap();
        assert_eq!(input.dob, NaiveDate::from_ymd_opt(1990, 4, 12));
    }

    #[test]
    fn test_malformed_dob_is_rejected() {
        assert!(form(Some("12/04/1990")).into_input().is_none());
    }
}
