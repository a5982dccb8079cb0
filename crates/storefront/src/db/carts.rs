//! Cart repository.
//!
//! The `cart` table is unique on `user_id`, so a user holds one line at a
//! time and adding a product replaces whatever was there.

use sqlx::PgPool;

use grabit_core::{CartId, DiscountPercent, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartLine;

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    product_id: i32,
    name: String,
    price: Price,
    discount_percent: DiscountPercent,
    quantity: i32,
    cover_image: Option<String>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.name,
            price: row.price,
            discount: row.discount_percent,
            quantity: row.quantity,
            cover_image: row.cover_image,
        }
    }
}

/// Repository for the per-user cart line.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Put a product in the user's cart, replacing any existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails (including a
    /// foreign key violation for an unknown product or a quantity below 1).
    pub async fn set_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO grabit.cart (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET product_id = EXCLUDED.product_id, quantity = EXCLUDED.quantity
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(CartId::new(id))
    }

    /// The user's cart line with product details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT c.id, c.product_id, p.name, p.price, p.discount_percent, c.quantity,
                   (SELECT i.image FROM grabit.product_image i
                    WHERE i.product_id = p.id ORDER BY i.id LIMIT 1) AS cover_image
            FROM grabit.cart c
            JOIN grabit.product p ON p.id = c.product_id
            WHERE c.user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Empty the user's cart.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM grabit.cart WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of lines in the user's cart (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grabit.cart WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
