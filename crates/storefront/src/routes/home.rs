//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::context::PageContext;
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::AppError;
use crate::filters;
use crate::models::{Category, ProductFilter, ProductSummary};
use crate::state::AppState;

/// Number of products shown on the home page.
const LATEST_PRODUCTS: i64 = 12;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub categories: Vec<Category>,
    pub products: Vec<ProductSummary>,
}

/// Display the home page: every category and the newest listings.
#[instrument(skip(state, page))]
pub async fn home(
    State(state): State<AppState>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let products = ProductRepository::new(state.pool())
        .list(&ProductFilter::latest(LATEST_PRODUCTS))
        .await?;

    Ok(HomeTemplate {
        page,
        categories,
        products,
    })
}
