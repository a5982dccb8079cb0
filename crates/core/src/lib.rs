//! Grabit Core - Shared domain types.
//!
//! This crate provides the types used across all Grabit components:
//! - `storefront` - The web application (shop pages, accounts, cart)
//! - `cli` - Command-line tools for migrations and store administration
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Field rules that the database also enforces (non-negative
//! price, rating in 1..=5, discount in 0..=100) are checked here first so that
//! handlers can report them before touching `PostgreSQL`.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, prices, ratings, product descriptions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
