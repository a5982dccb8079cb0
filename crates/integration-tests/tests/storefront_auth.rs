//! Account flows against a running storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`grabit migrate`)
//! - The storefront running (`cargo run -p grabit-storefront`)

use grabit_integration_tests::{TEST_PASSWORD, client, location, page, register, unique_email, url};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_health() {
    let resp = client()
        .get(url("/health"))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client()
        .get(url("/health/ready"))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_register_signs_in() {
    let client = client();
    let email = unique_email();

    let resp = register(&client, &email).await.expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let home = page(&client, "/").await.expect("Failed to load home");
    assert!(home.contains(&email));
    assert!(home.contains("Your account has been created."));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_register_password_mismatch() {
    let client = client();

    let resp = client
        .post(url("/register/"))
        .form(&[
            ("email", unique_email().as_str()),
            ("password", TEST_PASSWORD),
            ("password_confirm", "something else entirely"),
        ])
        .send()
        .await
        .expect("Failed to post registration");
    assert_eq!(location(&resp), "/register/");

    let body = page(&client, "/register/").await.expect("Failed to load form");
    assert!(body.contains("flash-error"));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_duplicate_registration_is_rejected() {
    let email = unique_email();
    register(&client(), &email).await.expect("Failed to register");

    let second = client();
    let resp = register(&second, &email).await.expect("Failed to register");
    assert_eq!(location(&resp), "/register/");
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_login_and_logout() {
    let email = unique_email();
    register(&client(), &email).await.expect("Failed to register");

    let client = client();
    let resp = client
        .post(url("/login/"))
        .form(&[("email", email.as_str()), ("password", TEST_PASSWORD)])
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(location(&resp), "/");
    assert!(page(&client, "/").await.expect("home").contains(&email));

    let resp = client
        .post(url("/logout/"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(location(&resp), "/");
    assert!(!page(&client, "/").await.expect("home").contains(&email));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_wrong_password_flashes() {
    let email = unique_email();
    register(&client(), &email).await.expect("Failed to register");

    let client = client();
    let resp = client
        .post(url("/login/"))
        .form(&[("email", email.as_str()), ("password", "not the password")])
        .send()
        .await
        .expect("Failed to post login");
    assert_eq!(location(&resp), "/login/");

    let body = page(&client, "/login/").await.expect("Failed to load login");
    assert!(body.contains("flash-error"));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_cart_requires_login() {
    let resp = client()
        .get(url("/cart/"))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login/");
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_security_headers() {
    let resp = client()
        .get(url("/"))
        .send()
        .await
        .expect("Failed to get home");

    let headers = resp.headers();
    assert!(headers.contains_key("x-request-id"));
    assert!(headers.contains_key("content-security-policy"));
    assert_eq!(
        headers.get("cache-control").and_then(|v| v.to_str().ok()),
        Some("no-store, max-age=0")
    );
}
