//! Core types for Grabit.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod description;
pub mod email;
pub mod id;
pub mod price;
pub mod profile;
pub mod rating;

pub use description::{DescriptionError, ProductDescription};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{DiscountPercent, Price, PriceError};
pub use profile::{MobileNumber, ProfileError, StoreName};
pub use rating::{Rating, RatingError, average_rating};
