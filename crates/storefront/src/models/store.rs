//! Seller store accounts.

use chrono::{DateTime, Utc};

use grabit_core::{MobileNumber, StoreAccountId, StoreName, UserId};

use super::product::media_url;

/// A seller's public store profile. Each user has at most one.
#[derive(Debug, Clone)]
pub struct StoreAccount {
    pub id: StoreAccountId,
    pub user_id: UserId,
    pub store_name: StoreName,
    pub store_logo: Option<String>,
    pub store_verification: Option<String>,
    pub contact_no: MobileNumber,
    pub created_at: DateTime<Utc>,
    pub verified: bool,
}

impl StoreAccount {
    /// Public URL of the logo, if one was uploaded.
    #[must_use]
    pub fn logo_url(&self) -> Option<String> {
        self.store_logo.as_deref().map(media_url)
    }
}

/// Fields for a new store account.
#[derive(Debug, Clone)]
pub struct NewStoreAccount {
    pub user_id: UserId,
    pub store_name: StoreName,
    pub contact_no: MobileNumber,
    pub store_logo: Option<String>,
    pub store_verification: Option<String>,
}
