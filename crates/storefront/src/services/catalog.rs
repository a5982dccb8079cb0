//! Catalog service: creating products, the product page, search, questions
//! and ratings.

use sqlx::PgPool;
use thiserror::Error;

use grabit_core::{
    CategoryId, DescriptionError, DiscountPercent, Price, PriceError, ProductDescription,
    ProductId, Rating, RatingError, UserId,
};

use super::media::{MediaError, MediaKind, MediaStore, Upload};
use crate::db::{
    CategoryRepository, ProductRepository, QuestionRepository, RatingRepository, RepositoryError,
};
use crate::models::product::{NewProduct, Product, ProductDetail, ProductFilter, ProductSummary};

const MAX_NAME_LENGTH: usize = 255;
const MAX_BRAND_LENGTH: usize = 100;
const MAX_QUESTION_LENGTH: usize = 2000;
const DEFAULT_BRAND: &str = "No Brand";

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product name is required")]
    MissingName,

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid category")]
    InvalidCategory,

    #[error("invalid price: {0}")]
    Price(#[from] PriceError),

    #[error("invalid description: {0}")]
    Description(#[from] DescriptionError),

    #[error("invalid rating: {0}")]
    Rating(#[from] RatingError),

    #[error("question cannot be empty")]
    EmptyQuestion,

    #[error("product already rated")]
    AlreadyRated,

    #[error("product not found")]
    NotFound,

    #[error("upload failed: {0}")]
    Media(#[from] MediaError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CatalogError {
    /// Message safe to show in a flash.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Media(MediaError::Io(_)) | Self::Repository(_) => {
                "Something went wrong, please try again.".to_owned()
            }
            Self::AlreadyRated => "You have already rated this product.".to_owned(),
            other => {
                let msg = other.to_string();
                let mut chars = msg.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect::<String>() + "."
                })
            }
        }
    }
}

/// The add-product form, before validation.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub discount: String,
    pub brand: String,
    pub category: String,
    /// Feature names, parallel to `feature_values`.
    pub feature_names: Vec<String>,
    pub feature_values: Vec<String>,
}

impl ProductForm {
    /// Validate the form into a new product row for `seller_id`.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` describing the first invalid field.
    pub fn validate(&self, seller_id: UserId) -> Result<NewProduct, CatalogError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingName);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(CatalogError::TooLong {
                field: "name",
                max: MAX_NAME_LENGTH,
            });
        }

        let price = if self.price.trim().is_empty() {
            Price::ZERO
        } else {
            Price::parse(&self.price)?
        };
        let discount = DiscountPercent::parse(&self.discount)?;

        let brand = match self.brand.trim() {
            "" => DEFAULT_BRAND,
            brand => brand,
        };
        if brand.chars().count() > MAX_BRAND_LENGTH {
            return Err(CatalogError::TooLong {
                field: "brand",
                max: MAX_BRAND_LENGTH,
            });
        }

        let category_id = match self.category.trim() {
            "" => None,
            raw => Some(
                raw.parse::<i32>()
                    .map(CategoryId::new)
                    .map_err(|_| CatalogError::InvalidCategory)?,
            ),
        };

        let description =
            ProductDescription::from_features(&self.feature_names, &self.feature_values)?
                .unwrap_or_else(|| ProductDescription::fallback(name, price));

        Ok(NewProduct {
            seller_id,
            category_id,
            name: name.to_owned(),
            price,
            description,
            discount,
            brand: brand.to_owned(),
        })
    }
}

/// Product detail plus what the viewer has already done on it.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub detail: ProductDetail,
    pub viewer_rating: Option<Rating>,
}

/// Catalog operations.
pub struct CatalogService<'a> {
    pool: &'a PgPool,
    media: &'a MediaStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, media: &'a MediaStore) -> Self {
        Self { pool, media }
    }

    /// Validate the form, store the images and save the product.
    ///
    /// Images already written are removed again if a later step fails.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` for invalid input (including a category that
    /// does not exist), rejected uploads, or database failures.
    pub async fn create_product(
        &self,
        seller_id: UserId,
        form: &ProductForm,
        uploads: &[Upload],
    ) -> Result<Product, CatalogError> {
        let new_product = form.validate(seller_id)?;
        if let Some(category_id) = new_product.category_id
            && CategoryRepository::new(self.pool).get(category_id).await?.is_none()
        {
            return Err(CatalogError::InvalidCategory);
        }

        let mut stored = Vec::new();
        for upload in uploads.iter().filter(|u| !u.is_blank()) {
            match self.media.save(MediaKind::ProductImage, upload).await {
                Ok(path) => stored.push(path),
                Err(e) => {
                    self.media.discard(&stored).await;
                    return Err(e.into());
                }
            }
        }

        match ProductRepository::new(self.pool)
            .create(&new_product, &stored)
            .await
        {
            Ok(product) => {
                tracing::info!(
                    product_id = %product.id,
                    seller_id = %seller_id,
                    images = stored.len(),
                    "Product created"
                );
                Ok(product)
            }
            Err(e) => {
                self.media.discard(&stored).await;
                Err(e.into())
            }
        }
    }

    /// Load the product page, including the viewer's own rating.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown product.
    pub async fn product_page(
        &self,
        id: ProductId,
        viewer: Option<UserId>,
    ) -> Result<ProductPage, CatalogError> {
        let detail = ProductRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound)?;

        let viewer_rating = match viewer {
            Some(user_id) => {
                RatingRepository::new(self.pool)
                    .get_for_user(user_id, id)
                    .await?
            }
            None => None,
        };

        Ok(ProductPage {
            detail,
            viewer_rating,
        })
    }

    /// Search listings by text and category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn search(
        &self,
        query: Option<&str>,
        category: Option<CategoryId>,
    ) -> Result<Vec<ProductSummary>, CatalogError> {
        let filter = ProductFilter {
            query: query.map(str::to_owned),
            category,
            limit: None,
        };
        Ok(ProductRepository::new(self.pool).list(&filter).await?)
    }

    /// Ask a question on a product page.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyQuestion`, `CatalogError::TooLong` or
    /// `CatalogError::NotFound`.
    pub async fn ask_question(
        &self,
        user_id: UserId,
        product_id: ProductId,
        text: &str,
    ) -> Result<(), CatalogError> {
        let text = validate_question(text)?;

        if !ProductRepository::new(self.pool).exists(product_id).await? {
            return Err(CatalogError::NotFound);
        }

        QuestionRepository::new(self.pool)
            .ask(user_id, product_id, text)
            .await?;
        Ok(())
    }

    /// Rate a product 1 to 5. Each user rates a product once.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Rating` for out-of-range values,
    /// `CatalogError::NotFound` for unknown products, and
    /// `CatalogError::AlreadyRated` on a second rating.
    pub async fn rate_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
        value: i32,
    ) -> Result<Rating, CatalogError> {
        let rating = Rating::new(value)?;

        if !ProductRepository::new(self.pool).exists(product_id).await? {
            return Err(CatalogError::NotFound);
        }

        RatingRepository::new(self.pool)
            .rate(user_id, product_id, rating)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CatalogError::AlreadyRated,
                other => CatalogError::Repository(other),
            })?;
        Ok(rating)
    }
}

fn validate_question(text: &str) -> Result<&str, CatalogError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CatalogError::EmptyQuestion);
    }
    if text.chars().count() > MAX_QUESTION_LENGTH {
        return Err(CatalogError::TooLong {
            field: "question",
            max: MAX_QUESTION_LENGTH,
        });
    }
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "  Steel Kettle ".to_owned(),
            price: "1299".to_owned(),
            discount: "10".to_owned(),
            brand: String::new(),
            category: "3".to_owned(),
            feature_names: vec!["Capacity".to_owned(), "Color".to_owned()],
            feature_values: vec!["1.5 L".to_owned(), "Silver".to_owned()],
        }
    }

    #[test]
    fn test_validate_builds_product() {
        let product = form().validate(UserId::new(7)).unwrap();
        assert_eq!(product.name, "Steel Kettle");
        assert_eq!(product.brand, "No Brand");
        assert_eq!(product.category_id, Some(CategoryId::new(3)));
        assert_eq!(product.price.to_string(), "1299.00");
        assert_eq!(
            product.description.features(),
            vec![("Capacity", "1.5 L"), ("Color", "Silver")]
        );
        assert_eq!(product.price.discounted(product.discount).to_string(), "1169.10");
    }

    #[test]
    fn test_validate_falls_back_to_text_description() {
        let mut form = form();
        form.feature_names = vec![String::new()];
        form.feature_values = vec!["orphan".to_owned()];
        let product = form.validate(UserId::new(1)).unwrap();
        assert_eq!(product.description.text(), Some("Steel Kettle at 1299.00"));
    }

    #[test]
    fn test_validate_requires_name() {
        let mut form = form();
        form.name = "   ".to_owned();
        assert!(matches!(
            form.validate(UserId::new(1)),
            Err(CatalogError::MissingName)
        ));
    }

    #[test]
    fn test_validate_blank_price_is_zero() {
        let mut form = form();
        form.price = String::new();
        let product = form.validate(UserId::new(1)).unwrap();
        assert_eq!(product.price, Price::ZERO);
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let mut negative = form();
        negative.price = "-5".to_owned();
        assert!(matches!(
            negative.validate(UserId::new(1)),
            Err(CatalogError::Price(PriceError::Negative))
        ));

        let mut too_much_off = form();
        too_much_off.discount = "150".to_owned();
        assert!(matches!(
            too_much_off.validate(UserId::new(1)),
            Err(CatalogError::Price(_))
        ));

        let mut named_category = form();
        named_category.category = "kitchen".to_owned();
        assert!(matches!(
            named_category.validate(UserId::new(1)),
            Err(CatalogError::InvalidCategory)
        ));
    }

    #[test]
    fn test_validate_question() {
        assert_eq!(validate_question("  Is it BPA free? ").unwrap(), "Is it BPA free?");
        assert!(matches!(
            validate_question("   "),
            Err(CatalogError::EmptyQuestion)
        ));
        assert!(validate_question(&"q".repeat(2001)).is_err());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CatalogError::MissingName.user_message(),
            "Product name is required."
        );
        assert_eq!(
            CatalogError::AlreadyRated.user_message(),
            "You have already rated this product."
        );
        let internal = CatalogError::Repository(RepositoryError::NotFound);
        assert_eq!(
            internal.user_message(),
            "Something went wrong, please try again."
        );
    }
}
