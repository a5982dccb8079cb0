//! Seller store pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use grabit_core::StoreAccountId;

use super::context::PageContext;
use super::forms::MultipartForm;
use crate::db::{ProductRepository, StoreAccountRepository};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flash, RequireAuth, set_current_user};
use crate::models::{CurrentUser, ProductSummary, StoreAccount};
use crate::services::{AuthService, StoreForm, StoreService};
use crate::state::AppState;

const NEW_STORE_PATH: &str = "/seller-account/new";

fn store_path(id: StoreAccountId) -> String {
    format!("/seller-account/{id}")
}

/// Store profile template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/show.html")]
pub struct StoreTemplate {
    pub page: PageContext,
    pub store: StoreAccount,
    pub products: Vec<ProductSummary>,
}

impl StoreTemplate {
    fn is_owner(&self) -> bool {
        self.page
            .current_user
            .as_ref()
            .is_some_and(|u| u.id == self.store.user_id)
    }
}

/// Open-a-store form template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/new.html")]
pub struct NewStoreTemplate {
    pub page: PageContext,
}

/// Display a store's profile and its listings.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let store = StoreAccountRepository::new(state.pool())
        .get(StoreAccountId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {id}")))?;
    let products = ProductRepository::new(state.pool())
        .list_by_seller(store.user_id)
        .await?;

    Ok(StoreTemplate {
        page,
        store,
        products,
    })
}

/// Display the open-a-store form, or the user's store if they have one.
#[instrument(skip_all)]
pub async fn new_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<Response, AppError> {
    if let Some(store) = StoreAccountRepository::new(state.pool())
        .get_by_user(user.id)
        .await?
    {
        return Ok(Redirect::to(&store_path(store.id)).into_response());
    }
    Ok(NewStoreTemplate { page }.into_response())
}

/// Handle the open-a-store form. On success the user becomes a seller.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Redirect {
    let body = match MultipartForm::read(multipart).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable store form");
            Flash::error(&session, "The upload could not be read. Images may be too large.").await;
            return Redirect::to(NEW_STORE_PATH);
        }
    };

    let form = StoreForm {
        store_name: body.text("store_name"),
        contact_no: body.text("contact_no"),
        logo: body.file("store_logo"),
        verification: body.file("store_verification"),
    };

    let store = match StoreService::new(state.pool(), state.media())
        .open(user.id, &form)
        .await
    {
        Ok(store) => store,
        Err(e) => {
            tracing::info!(error = %e, "Store rejected");
            Flash::error(&session, e.user_message()).await;
            return Redirect::to(NEW_STORE_PATH);
        }
    };

    // Opening a store flips `is_seller`; the session copy must follow
    let seller = match AuthService::new(state.pool()).get_user(user.id).await {
        Ok(account) => CurrentUser::from(&account),
        Err(e) => {
            tracing::warn!(error = %e, "Could not reload account after opening store");
            CurrentUser {
                is_seller: true,
                ..user
            }
        }
    };
    if let Err(e) = set_current_user(&session, &seller).await {
        tracing::error!(error = %e, "Failed to refresh session after opening store");
    }

    add_breadcrumb("store", "Store opened");
    Flash::success(&session, format!("{} is open for business.", store.store_name)).await;
    Redirect::to(&store_path(store.id))
}
