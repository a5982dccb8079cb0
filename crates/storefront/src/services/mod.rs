//! Rules that sit between the route handlers and the repositories.

pub mod auth;
pub mod catalog;
pub mod media;
pub mod stores;

pub use auth::{AuthError, AuthService, RegisterInput};
pub use catalog::{CatalogError, CatalogService, ProductForm, ProductPage};
pub use media::{MediaError, MediaKind, MediaStore, Upload};
pub use stores::{StoreError, StoreForm, StoreService};
