//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page: categories and newest products
//!
//! # Auth
//! GET  /login/                    - Login page
//! POST /login/                    - Login action (rate limited)
//! GET  /register/                 - Register page
//! POST /register/                 - Register action (rate limited)
//! POST /logout/                   - Logout action
//!
//! # Products
//! GET  /product-list/             - Listing with ?q= search and ?category= filter
//! GET  /product/{id}              - Product detail with questions and ratings
//! POST /product/{id}/questions    - Ask a question (requires auth)
//! POST /product/{id}/rating       - Rate 1 to 5, once (requires auth)
//! GET  /add-new-product/          - Add-product form (sellers only)
//! POST /add-new-product/          - Create product (multipart, sellers only)
//!
//! # Seller stores
//! GET  /seller-account/new        - Open-a-store form (requires auth)
//! POST /seller-account/new        - Open store (multipart, requires auth)
//! GET  /seller-account/{id}       - Store profile and listings
//!
//! # Cart (requires auth)
//! GET  /cart/                     - Cart page
//! POST /cart/add                  - Replace the cart line
//! POST /cart/remove               - Empty the cart
//! ```

pub mod auth;
pub mod cart;
pub mod context;
pub mod forms;
pub mod home;
pub mod products;
pub mod seller;

use axum::{
    Router,
    routing::{get, post},
};

pub use context::PageContext;

use crate::config::GrabitConfig;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Login and registration POSTs are rate limited per client IP; see
/// [`GrabitConfig::trust_proxy_headers`] for how the IP is chosen.
pub fn auth_routes(config: &GrabitConfig) -> Router<AppState> {
    let limited = Router::new()
        .route("/login/", post(auth::login))
        .route("/register/", post(auth::register))
        .route_layer(auth_rate_limiter(config.trust_proxy_headers));

    Router::new()
        .route("/login/", get(auth::login_page))
        .route("/register/", get(auth::register_page))
        .route("/logout/", post(auth::logout))
        .merge(limited)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/product-list/", get(products::index))
        .route("/product/{id}", get(products::show))
        .route("/product/{id}/questions", post(products::ask))
        .route("/product/{id}/rating", post(products::rate))
        .route(
            "/add-new-product/",
            get(products::new_form).post(products::create),
        )
}

/// Create the seller store routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/new", get(seller::new_form).post(seller::create))
        .route("/{id}", get(seller::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes(config: &GrabitConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(auth_routes(config))
        .merge(product_routes())
        .nest("/seller-account", seller_routes())
        .nest("/cart", cart_routes())
}
