//! Store verification command.

use grabit_core::StoreAccountId;
use grabit_storefront::db::{RepositoryError, StoreAccountRepository};

use super::{CommandError, connect};

/// Set or clear a store's verified badge.
pub async fn verify(store_id: i32, verified: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let id = StoreAccountId::new(store_id);

    StoreAccountRepository::new(&pool)
        .set_verified(id, verified)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::Invalid(format!("no store with ID {id}")),
            other => other.into(),
        })?;

    if verified {
        tracing::info!("Store {} is now verified", id);
    } else {
        tracing::info!("Store {} is no longer verified", id);
    }
    Ok(())
}
