//! Form input to domain conversions, without a database.

use grabit_core::{Price, UserId};
use grabit_storefront::services::{AuthError, CatalogError, ProductForm, RegisterInput};

fn product_form() -> ProductForm {
    ProductForm {
        name: "Desk Lamp".to_owned(),
        price: "40".to_owned(),
        discount: "25".to_owned(),
        brand: "Lumo".to_owned(),
        category: String::new(),
        feature_names: vec!["Color".to_owned(), "Bulb".to_owned()],
        feature_values: vec!["Black".to_owned(), "LED".to_owned()],
    }
}

#[test]
fn test_product_form_builds_description_and_discount() {
    let product = product_form()
        .validate(UserId::new(1))
        .expect("valid form");

    let description = product.description;
    assert_eq!(
        description.features(),
        vec![("Bulb", "LED"), ("Color", "Black")]
    );
    assert_eq!(
        product.price.discounted(product.discount),
        Price::parse("30").expect("price")
    );
}

#[test]
fn test_product_form_without_features_gets_text() {
    let form = ProductForm {
        feature_names: Vec::new(),
        feature_values: Vec::new(),
        ..product_form()
    };
    let product = form.validate(UserId::new(1)).expect("valid form");
    assert_eq!(product.description.text(), Some("Desk Lamp at 40.00"));
}

#[test]
fn test_product_form_rejects_bad_price() {
    let form = ProductForm {
        price: "forty".to_owned(),
        ..product_form()
    };
    assert!(matches!(
        form.validate(UserId::new(1)),
        Err(CatalogError::Price(_))
    ));
}

#[test]
fn test_register_input_checks_confirmation() {
    let input = RegisterInput {
        email: "ann@example.com".to_owned(),
        password: "longenough".to_owned(),
        password_confirm: "different1".to_owned(),
        ..RegisterInput::default()
    };
    assert!(matches!(input.validate(), Err(AuthError::PasswordMismatch)));
}

#[test]
fn test_register_input_normalizes() {
    let input = RegisterInput {
        email: "  Ann@Example.COM ".to_owned(),
        password: "longenough".to_owned(),
        password_confirm: "longenough".to_owned(),
        first_name: " Ann ".to_owned(),
        mobile_no: Some(" ".to_owned()),
        ..RegisterInput::default()
    };
    let user = input.validate().expect("valid input");
    assert_eq!(user.first_name, "Ann");
    assert_eq!(user.mobile_no, None);
}
