//! Product repository: listings, images and the product page query.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use grabit_core::{
    CategoryId, DiscountPercent, Email, Price, ProductDescription, ProductId, ProductImageId,
    Rating, StoreAccountId, UserId,
};

use super::{QuestionRepository, RepositoryError, contains_pattern};
use crate::models::product::{
    Category, NewProduct, Product, ProductDetail, ProductFilter, ProductImage, ProductSummary,
};

// =============================================================================
// Internal Row Types
// =============================================================================

const PRODUCT_COLUMNS: &str = "p.id, p.user_id, p.category_id, p.name, p.created_at, p.price, \
     p.description, p.discount_percent, p.brand";

/// First uploaded image of the product in `p`.
const COVER_IMAGE: &str = "(SELECT i.image FROM grabit.product_image i \
     WHERE i.product_id = p.id ORDER BY i.id LIMIT 1) AS cover_image";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    user_id: i32,
    category_id: Option<i32>,
    name: String,
    created_at: DateTime<Utc>,
    price: Price,
    description: Option<serde_json::Value>,
    discount_percent: DiscountPercent,
    brand: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            seller_id: UserId::new(row.user_id),
            category_id: row.category_id.map(CategoryId::new),
            name: row.name,
            created_at: row.created_at,
            price: row.price,
            description: row.description.as_ref().map(ProductDescription::from_json),
            discount: row.discount_percent,
            brand: row.brand,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    product: ProductRow,
    cover_image: Option<String>,
}

impl From<SummaryRow> for ProductSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            product: row.product.into(),
            cover_image: row.cover_image,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    product: ProductRow,
    seller_email: String,
    store_id: Option<i32>,
    category_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: i32,
    product_id: i32,
    image: String,
}

impl From<ImageRow> for ProductImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            product_id: ProductId::new(row.product_id),
            path: row.image,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a product and its images in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    pub async fn create(
        &self,
        new_product: &NewProduct,
        image_paths: &[String],
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO grabit.product
                (user_id, category_id, name, price, description, discount_percent, brand)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, category_id, name, created_at, price,
                      description, discount_percent, brand
            ",
        )
        .bind(new_product.seller_id)
        .bind(new_product.category_id)
        .bind(&new_product.name)
        .bind(new_product.price)
        .bind(new_product.description.to_json())
        .bind(new_product.discount)
        .bind(&new_product.brand)
        .fetch_one(&mut *tx)
        .await?;

        for path in image_paths {
            sqlx::query("INSERT INTO grabit.product_image (product_id, image) VALUES ($1, $2)")
                .bind(row.id)
                .bind(path)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Load everything shown on the product page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, DetailRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS},
                   u.email AS seller_email,
                   s.id AS store_id,
                   c.c_name AS category_name
            FROM grabit.product p
            JOIN grabit.user u ON u.id = p.user_id
            LEFT JOIN grabit.store_account s ON s.user_id = p.user_id
            LEFT JOIN grabit.category c ON c.id = p.category_id
            WHERE p.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let seller_email = Email::parse(&row.seller_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let product: Product = row.product.into();
        let category = product
            .category_id
            .zip(row.category_name)
            .map(|(id, name)| Category { id, name });

        let images = self.images(id).await?;
        let ratings = self.ratings(id).await?;
        let questions = QuestionRepository::new(self.pool)
            .list_for_product(id)
            .await?;

        Ok(Some(ProductDetail {
            product,
            images,
            seller_email,
            store_id: row.store_id.map(StoreAccountId::new),
            category,
            ratings,
            questions,
        }))
    }

    /// List products, newest first.
    ///
    /// The search text matches `name` or `brand` case-insensitively; SQL
    /// wildcards in it match literally.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<ProductSummary>, RepositoryError> {
        let pattern = filter.search_text().map(contains_pattern);

        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}, {COVER_IMAGE}
            FROM grabit.product p
            WHERE ($1::text IS NULL OR p.name ILIKE $1 OR p.brand ILIKE $1)
              AND ($2::int4 IS NULL OR p.category_id = $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3
            "
        ))
        .bind(pattern)
        .bind(filter.category)
        .bind(filter.limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Products listed by one seller, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_seller(
        &self,
        seller_id: UserId,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}, {COVER_IMAGE}
            FROM grabit.product p
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "
        ))
        .bind(seller_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Whether a product exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM grabit.product WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Images of a product in upload order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(&self, id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT id, product_id, image FROM grabit.product_image WHERE product_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All ratings a product has received.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or a stored
    /// rating is outside 1-5.
    pub async fn ratings(&self, id: ProductId) -> Result<Vec<Rating>, RepositoryError> {
        let ratings = sqlx::query_scalar::<_, Rating>(
            "SELECT rating FROM grabit.product_rating WHERE product_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(ratings)
    }
}
