//! Product route handlers: listing, detail, creation, questions and ratings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use grabit_core::{CategoryId, ProductId, Rating};

use super::context::PageContext;
use super::forms::MultipartForm;
use crate::db::CategoryRepository;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flash, RequireAuth, RequireSeller};
use crate::models::{Category, ProductDetail, ProductSummary};
use crate::services::{CatalogError, CatalogService, ProductForm};
use crate::state::AppState;

const NEW_PRODUCT_PATH: &str = "/add-new-product/";

fn product_path(id: ProductId) -> String {
    format!("/product/{id}")
}

// =============================================================================
// Form and Query Types
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    /// Category ID; anything unparsable is ignored.
    pub category: Option<String>,
}

impl ListQuery {
    fn category_id(&self) -> Option<CategoryId> {
        self.category
            .as_deref()
            .and_then(|c| c.trim().parse::<i32>().ok())
            .map(CategoryId::new)
    }

    fn search_text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Question form data.
#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    pub question: String,
}

/// Rating form data.
#[derive(Debug, Deserialize)]
pub struct RatingForm {
    pub rating: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductListTemplate {
    pub page: PageContext,
    pub products: Vec<ProductSummary>,
    pub categories: Vec<Category>,
    pub query: String,
    pub selected_category: Option<CategoryId>,
}

impl ProductListTemplate {
    fn is_selected(&self, category: &Category) -> bool {
        self.selected_category == Some(category.id)
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub detail: ProductDetail,
    pub viewer_rating: Option<Rating>,
}

impl ProductTemplate {
    /// Whether the viewer may still leave a rating.
    fn can_rate(&self) -> bool {
        self.page.is_logged_in() && self.viewer_rating.is_none()
    }
}

/// Add-product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/new.html")]
pub struct NewProductTemplate {
    pub page: PageContext,
    pub categories: Vec<Category>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product listing, optionally searched and filtered.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let selected_category = query.category_id();
    let products = CatalogService::new(state.pool(), state.media())
        .search(query.search_text(), selected_category)
        .await?;
    let categories = CategoryRepository::new(state.pool()).list().await?;

    Ok(ProductListTemplate {
        page,
        products,
        categories,
        query: query.search_text().unwrap_or_default().to_owned(),
        selected_category,
    })
}

/// Display a product with its images, questions and ratings.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let viewer = page.current_user.as_ref().map(|u| u.id);
    let product_page = CatalogService::new(state.pool(), state.media())
        .product_page(ProductId::new(id), viewer)
        .await
        .map_err(|e| match e {
            CatalogError::NotFound => AppError::NotFound(format!("product {id}")),
            other => other.into(),
        })?;

    Ok(ProductTemplate {
        page,
        detail: product_page.detail,
        viewer_rating: product_page.viewer_rating,
    })
}

/// Display the add-product form. Sellers only.
#[instrument(skip_all)]
pub async fn new_form(
    _seller: RequireSeller,
    State(state): State<AppState>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(NewProductTemplate { page, categories })
}

/// Handle the add-product form: fields, parallel feature lists and images.
#[instrument(skip_all, fields(seller_id = %seller.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireSeller(seller): RequireSeller,
    multipart: Multipart,
) -> Redirect {
    let body = match MultipartForm::read(multipart).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable product form");
            Flash::error(&session, "The upload could not be read. Images may be too large.").await;
            return Redirect::to(NEW_PRODUCT_PATH);
        }
    };

    let form = ProductForm {
        name: body.text("name"),
        price: body.text("price"),
        discount: body.text("discount"),
        brand: body.text("brand"),
        category: body.text("category"),
        feature_names: body.all("feature_name"),
        feature_values: body.all("feature_value"),
    };
    let images = body.files("images");

    match CatalogService::new(state.pool(), state.media())
        .create_product(seller.id, &form, &images)
        .await
    {
        Ok(product) => {
            add_breadcrumb("catalog", "Product created");
            Flash::success(&session, format!("{} is now listed.", product.name)).await;
            Redirect::to(&product_path(product.id))
        }
        Err(e) => {
            tracing::info!(error = %e, "Product rejected");
            Flash::error(&session, e.user_message()).await;
            Redirect::to(NEW_PRODUCT_PATH)
        }
    }
}

/// Ask a question on a product page.
#[instrument(skip(state, session, user, form))]
pub async fn ask(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Form(form): Form<QuestionForm>,
) -> Redirect {
    let product_id = ProductId::new(id);
    match CatalogService::new(state.pool(), state.media())
        .ask_question(user.id, product_id, &form.question)
        .await
    {
        Ok(()) => Flash::success(&session, "Your question has been posted.").await,
        Err(e) => Flash::error(&session, e.user_message()).await,
    }
    Redirect::to(&product_path(product_id))
}

/// Rate a product from 1 to 5; a user rates each product once.
#[instrument(skip(state, session, user, form))]
pub async fn rate(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Form(form): Form<RatingForm>,
) -> Redirect {
    let product_id = ProductId::new(id);
    let Ok(value) = form.rating.trim().parse::<i32>() else {
        Flash::error(&session, "Choose a rating from 1 to 5.").await;
        return Redirect::to(&product_path(product_id));
    };

    match CatalogService::new(state.pool(), state.media())
        .rate_product(user.id, product_id, value)
        .await
    {
        Ok(rating) => {
            Flash::success(&session, format!("Thanks! You rated this {rating} out of 5.")).await;
        }
        Err(e) => Flash::error(&session, e.user_message()).await,
    }
    Redirect::to(&product_path(product_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(q: Option<&str>, category: Option<&str>) -> ListQuery {
        ListQuery {
            q: q.map(str::to_owned),
            category: category.map(str::to_owned),
        }
    }

    #[test]
    fn test_category_id_parsing() {
        assert_eq!(query(None, Some("3")).category_id(), Some(CategoryId::new(3)));
        assert_eq!(query(None, Some(" 7 ")).category_id(), Some(CategoryId::new(7)));
        assert_eq!(query(None, Some("shoes")).category_id(), None);
        assert_eq!(query(None, None).category_id(), None);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        assert_eq!(query(Some("   "), None).search_text(), None);
        assert_eq!(query(Some(" lamp "), None).search_text(), Some("lamp"));
    }

    #[test]
    fn test_product_path() {
        assert_eq!(product_path(ProductId::new(42)), "/product/42");
    }
}
