//! User account commands.

use grabit_core::Email;
use grabit_storefront::db::UserRepository;
use grabit_storefront::services::AuthService;

use super::{CommandError, connect};

/// Create a staff account with every permission.
pub async fn create_superuser(email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let user = AuthService::new(&pool)
        .create_superuser(email, password)
        .await?;

    tracing::info!(
        "Superuser created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}

/// Grant or revoke seller status.
///
/// Opening a store grants it too; this is for accounts managed by staff.
pub async fn set_seller(email: &str, is_seller: bool) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::Invalid(format!("no user with email {email}")))?;
    users.set_seller(user.id, is_seller).await?;

    if is_seller {
        tracing::info!("{} can now list products", user.email);
    } else {
        tracing::info!("{} is no longer a seller", user.email);
    }
    Ok(())
}
