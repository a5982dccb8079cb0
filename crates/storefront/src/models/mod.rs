//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the internal row types
//! the repositories decode from `PostgreSQL`.

pub mod cart;
pub mod product;
pub mod session;
pub mod store;
pub mod user;

pub use cart::CartLine;
pub use product::{
    Category, NewProduct, Product, ProductDetail, ProductFilter, ProductImage, ProductSummary,
    Question,
};
pub use session::{CurrentUser, keys as session_keys};
pub use store::{NewStoreAccount, StoreAccount};
pub use user::{NewUser, User};
