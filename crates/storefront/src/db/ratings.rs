//! Product rating repository.

use sqlx::PgPool;

use grabit_core::{ProductId, Rating, RatingId, UserId};

use super::RepositoryError;

/// Repository for product ratings.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Rate a product. A user rates each product once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already rated the product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn rate(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: Rating,
    ) -> Result<RatingId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO grabit.product_rating (user_id, product_id, rating)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_violation(e, "product already rated"))?;

        Ok(RatingId::new(id))
    }

    /// The rating a user gave a product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<Rating>, RepositoryError> {
        let rating = sqlx::query_scalar::<_, Rating>(
            "SELECT rating FROM grabit.product_rating WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(rating)
    }
}
