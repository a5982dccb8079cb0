//! Catalog domain types: categories, products, images and questions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use grabit_core::{
    CategoryId, DiscountPercent, Email, Price, ProductDescription, ProductId, ProductImageId,
    QuestionId, Rating, StoreAccountId, UserId, average_rating,
};

/// URL prefix uploaded files are served under.
pub const MEDIA_URL: &str = "/media";

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A listed product.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub price: Price,
    pub description: Option<ProductDescription>,
    pub discount: DiscountPercent,
    pub brand: String,
}

impl Product {
    /// Price after the product's discount.
    #[must_use]
    pub fn discounted_price(&self) -> Price {
        self.price.discounted(self.discount)
    }

    /// Whether the listing shows a struck-through original price.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount.is_active()
    }
}

/// An image attached to a product.
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    /// Path relative to the media root, e.g. `product_images/<uuid>.jpg`.
    pub path: String,
}

impl ProductImage {
    /// Public URL of the image.
    #[must_use]
    pub fn url(&self) -> String {
        media_url(&self.path)
    }
}

/// Public URL for a path relative to the media root.
#[must_use]
pub fn media_url(path: &str) -> String {
    format!("{MEDIA_URL}/{}", path.trim_start_matches('/'))
}

/// A question asked on a product page.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: QuestionId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub asker: Email,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A product with its cover image, for listings.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub product: Product,
    pub cover_image: Option<String>,
}

impl ProductSummary {
    /// URL of the first uploaded image, if any.
    #[must_use]
    pub fn cover_url(&self) -> Option<String> {
        self.cover_image.as_deref().map(media_url)
    }
}

/// Everything the product page shows.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub seller_email: Email,
    pub store_id: Option<StoreAccountId>,
    pub category: Option<Category>,
    pub ratings: Vec<Rating>,
    pub questions: Vec<Question>,
}

impl ProductDetail {
    /// Mean rating to one decimal place; zero when unrated.
    #[must_use]
    pub fn average_rating(&self) -> Decimal {
        average_rating(&self.ratings)
    }

    /// Number of ratings received.
    #[must_use]
    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }
}

/// Fields for a new product row.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller_id: UserId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub price: Price,
    pub description: ProductDescription,
    pub discount: DiscountPercent,
    pub brand: String,
}

/// Listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name and brand.
    pub query: Option<String>,
    pub category: Option<CategoryId>,
    pub limit: Option<i64>,
}

impl ProductFilter {
    /// Newest products, capped at `limit`.
    #[must_use]
    pub fn latest(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// The trimmed search text, `None` when blank.
    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: &str, discount: &str) -> Product {
        Product {
            id: ProductId::new(1),
            seller_id: UserId::new(1),
            category_id: None,
            name: "Lamp".to_owned(),
            created_at: Utc::now(),
            price: Price::parse(price).unwrap(),
            description: None,
            discount: DiscountPercent::parse(discount).unwrap(),
            brand: "No Brand".to_owned(),
        }
    }

    #[test]
    fn test_discounted_price() {
        let p = product("200", "25");
        assert!(p.has_discount());
        assert_eq!(p.discounted_price().to_string(), "150.00");
    }

    #[test]
    fn test_no_discount() {
        let p = product("99.99", "");
        assert!(!p.has_discount());
        assert_eq!(p.discounted_price(), p.price);
    }

    #[test]
    fn test_media_url() {
        assert_eq!(media_url("product_images/a.png"), "/media/product_images/a.png");
        assert_eq!(media_url("/store_logo/b.jpg"), "/media/store_logo/b.jpg");
    }

    #[test]
    fn test_average_rating_of_detail() {
        let detail = ProductDetail {
            product: product("10", "0"),
            images: Vec::new(),
            seller_email: Email::parse("seller@example.com").unwrap(),
            store_id: None,
            category: None,
            ratings: vec![Rating::new(4).unwrap(), Rating::new(5).unwrap()],
            questions: Vec::new(),
        };
        assert_eq!(detail.average_rating(), Decimal::new(45, 1));
        assert_eq!(detail.rating_count(), 2);
    }

    #[test]
    fn test_search_text_ignores_blank() {
        let filter = ProductFilter {
            query: Some("   ".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(filter.search_text(), None);

        let filter = ProductFilter {
            query: Some(" kettle ".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(filter.search_text(), Some("kettle"));
    }
}
