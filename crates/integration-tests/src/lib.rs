//! Integration test helpers for Grabit.
//!
//! # Running Tests
//!
//! The library-level tests run with a plain `cargo test`. The HTTP tests are
//! `#[ignore]`d and need a migrated database and a running storefront that
//! trusts proxy headers, since every test client claims its own `x-real-ip`:
//!
//! ```bash
//! grabit migrate
//! GRABIT_TRUST_PROXY_HEADERS=true cargo run -p grabit-storefront &
//! cargo test -p grabit-integration-tests -- --ignored
//! ```
//!
//! Set `GRABIT_TEST_BASE_URL` when the storefront is not on
//! `http://localhost:8000`. Tests that change accounts behind the
//! storefront's back connect to `GRABIT_DATABASE_URL` (or `DATABASE_URL`).

use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
use reqwest::{Client, Response, redirect};
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every account the tests register.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Base URL of the storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("GRABIT_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_owned())
}

/// Absolute URL for a storefront path.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url().trim_end_matches('/'))
}

/// A fresh client with its own cookie jar that does not follow redirects.
///
/// Each client claims its own `x-real-ip`, standing in for a reverse proxy,
/// so the per-IP rate limit on login and registration does not trip across
/// tests. The storefront only honours it with `GRABIT_TRUST_PROXY_HEADERS`.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    let bytes = Uuid::new_v4().into_bytes();
    let ip = format!("10.{}.{}.{}", bytes[0], bytes[1], bytes[2]);

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-real-ip",
        HeaderValue::from_str(&ip).expect("dotted IP is a valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the storefront's database, as the `grabit` CLI would.
///
/// # Panics
///
/// Panics if no database URL is set or the connection fails.
#[allow(clippy::expect_used)]
pub async fn database() -> PgPool {
    let url = std::env::var("GRABIT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("GRABIT_DATABASE_URL or DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to the test database")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

/// The `Location` header of a redirect, or `""`.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Register and sign in a new account on `client`.
///
/// # Errors
///
/// Returns the request error if the storefront is unreachable.
pub async fn register(client: &Client, email: &str) -> reqwest::Result<Response> {
    client
        .post(url("/register/"))
        .form(&[
            ("email", email),
            ("password", TEST_PASSWORD),
            ("password_confirm", TEST_PASSWORD),
            ("first_name", "Test"),
            ("last_name", "User"),
        ])
        .send()
        .await
}

/// Fetch a page and return its body.
///
/// # Errors
///
/// Returns the request error if the storefront is unreachable.
pub async fn page(client: &Client, path: &str) -> reqwest::Result<String> {
    client.get(url(path)).send().await?.text().await
}

/// A tiny valid PNG for upload tests.
#[must_use]
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}
