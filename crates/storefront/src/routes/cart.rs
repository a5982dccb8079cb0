//! Cart route handlers.
//!
//! A cart holds a single line; adding a product replaces whatever was there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use grabit_core::ProductId;

use super::context::PageContext;
use crate::db::{CartRepository, ProductRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{Flash, RequireAuth};
use crate::models::CartLine;
use crate::state::AppState;

const CART_PATH: &str = "/cart/";
const MAX_QUANTITY: i32 = 99;

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<i32>,
}

impl AddToCartForm {
    /// Requested quantity, defaulting to 1. `None` when out of range.
    fn quantity(&self) -> Option<i32> {
        let quantity = self.quantity.unwrap_or(1);
        (1..=MAX_QUANTITY).contains(&quantity).then_some(quantity)
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub line: Option<CartLine>,
}

/// Display the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let line = CartRepository::new(state.pool()).get(user.id).await?;
    Ok(CartTemplate { page, line })
}

/// Put a product in the cart, replacing the current line.
#[instrument(skip_all, fields(user_id = %user.id, product_id = form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect, AppError> {
    let product_id = ProductId::new(form.product_id);
    let back = format!("/product/{product_id}");

    let Some(quantity) = form.quantity() else {
        Flash::error(&session, format!("Quantity must be between 1 and {MAX_QUANTITY}.")).await;
        return Ok(Redirect::to(&back));
    };

    if !ProductRepository::new(state.pool()).exists(product_id).await? {
        return Err(AppError::NotFound(format!("product {product_id}")));
    }

    CartRepository::new(state.pool())
        .set_line(user.id, product_id, quantity)
        .await?;
    tracing::info!(quantity, "Cart line set");

    Flash::success(&session, "Added to your cart.").await;
    Ok(Redirect::to(CART_PATH))
}

/// Empty the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Redirect, AppError> {
    if CartRepository::new(state.pool()).clear(user.id).await? {
        Flash::success(&session, "Removed from your cart.").await;
    }
    Ok(Redirect::to(CART_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(quantity: Option<i32>) -> AddToCartForm {
        AddToCartForm {
            product_id: 1,
            quantity,
        }
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        assert_eq!(form(None).quantity(), Some(1));
    }

    #[test]
    fn test_quantity_bounds() {
        assert_eq!(form(Some(0)).quantity(), None);
        assert_eq!(form(Some(-2)).quantity(), None);
        assert_eq!(form(Some(99)).quantity(), Some(99));
        assert_eq!(form(Some(100)).quantity(), None);
    }
}
