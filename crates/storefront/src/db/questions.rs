//! Product question repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use grabit_core::{Email, ProductId, QuestionId, UserId};

use super::RepositoryError;
use crate::models::product::Question;

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    asker: String,
    question: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = RepositoryError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let asker = Email::parse(&row.asker).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: QuestionId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            asker,
            text: row.question,
            created_at: row.created_at,
        })
    }
}

/// Repository for product questions.
pub struct QuestionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> QuestionRepository<'a> {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a question about a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// foreign key violation for an unknown product).
    pub async fn ask(
        &self,
        user_id: UserId,
        product_id: ProductId,
        text: &str,
    ) -> Result<QuestionId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO grabit.product_question (user_id, product_id, question)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(text)
        .fetch_one(self.pool)
        .await?;

        Ok(QuestionId::new(id))
    }

    /// Questions on a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Question>, RepositoryError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r"
            SELECT q.id, q.product_id, q.user_id, u.email AS asker, q.question, q.created_at
            FROM grabit.product_question q
            JOIN grabit.user u ON u.id = q.user_id
            WHERE q.product_id = $1
            ORDER BY q.created_at, q.id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
