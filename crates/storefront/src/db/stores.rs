//! Store account repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use grabit_core::{MobileNumber, StoreAccountId, StoreName, UserId};

use super::RepositoryError;
use crate::models::store::{NewStoreAccount, StoreAccount};

const STORE_COLUMNS: &str = "id, user_id, store_name, store_logo, store_verification, \
     contact_no, created_at, verified";

#[derive(Debug, sqlx::FromRow)]
struct StoreAccountRow {
    id: i32,
    user_id: i32,
    store_name: String,
    store_logo: Option<String>,
    store_verification: Option<String>,
    contact_no: String,
    created_at: DateTime<Utc>,
    verified: bool,
}

impl TryFrom<StoreAccountRow> for StoreAccount {
    type Error = RepositoryError;

    fn try_from(row: StoreAccountRow) -> Result<Self, Self::Error> {
        let store_name = StoreName::parse(&row.store_name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid store name in database: {e}"))
        })?;
        let contact_no = MobileNumber::parse(&row.contact_no).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid contact number in database: {e}"))
        })?;

        Ok(Self {
            id: StoreAccountId::new(row.id),
            user_id: UserId::new(row.user_id),
            store_name,
            store_logo: row.store_logo,
            store_verification: row.store_verification,
            contact_no,
            created_at: row.created_at,
            verified: row.verified,
        })
    }
}

/// Repository for seller store accounts.
pub struct StoreAccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreAccountRepository<'a> {
    /// Create a new store account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open a store and mark its owner as a seller, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a store or
    /// the store name is taken.
    pub async fn create(&self, new_store: &NewStoreAccount) -> Result<StoreAccount, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, StoreAccountRow>(&format!(
            r"
            INSERT INTO grabit.store_account
                (user_id, store_name, contact_no, store_logo, store_verification)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(new_store.user_id)
        .bind(new_store.store_name.as_str())
        .bind(new_store.contact_no.as_str())
        .bind(new_store.store_logo.as_deref())
        .bind(new_store.store_verification.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::unique_violation(e, "store already exists"))?;

        sqlx::query("UPDATE grabit.user SET is_seller = TRUE WHERE id = $1")
            .bind(new_store.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreAccountId) -> Result<Option<StoreAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreAccountRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM grabit.store_account WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the store owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<StoreAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreAccountRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM grabit.store_account WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Set or clear the verified badge.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    pub async fn set_verified(
        &self,
        id: StoreAccountId,
        verified: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE grabit.store_account SET verified = $2 WHERE id = $1")
            .bind(id)
            .bind(verified)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
