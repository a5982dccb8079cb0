//! Opening seller stores.

use sqlx::PgPool;
use thiserror::Error;

use grabit_core::{MobileNumber, ProfileError, StoreName, UserId};

use super::media::{MediaError, MediaKind, MediaStore, Upload};
use crate::db::{RepositoryError, StoreAccountRepository};
use crate::models::store::{NewStoreAccount, StoreAccount};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("you already have a store, or that store name is taken")]
    AlreadyExists,

    #[error("upload failed: {0}")]
    Media(#[from] MediaError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl StoreError {
    /// Message safe to show in a flash.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Media(MediaError::Io(_)) | Self::Repository(_) => {
                "Something went wrong, please try again.".to_owned()
            }
            Self::InvalidProfile(e) => format!("{}.", capitalize(&e.to_string())),
            Self::AlreadyExists => {
                "You already have a store, or that store name is taken.".to_owned()
            }
            Self::Media(e) => format!("{}.", capitalize(&e.to_string())),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// The open-a-store form, before validation.
#[derive(Debug, Clone, Default)]
pub struct StoreForm {
    pub store_name: String,
    pub contact_no: String,
    pub logo: Option<Upload>,
    pub verification: Option<Upload>,
}

impl StoreForm {
    /// Validate the text fields.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidProfile` for a bad name or number.
    pub fn validate(&self) -> Result<(StoreName, MobileNumber), StoreError> {
        let name = StoreName::parse(&self.store_name)?;
        let contact_no = MobileNumber::parse(&self.contact_no)?;
        Ok((name, contact_no))
    }
}

/// Store operations.
pub struct StoreService<'a> {
    pool: &'a PgPool,
    media: &'a MediaStore,
}

impl<'a> StoreService<'a> {
    /// Create a new store service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, media: &'a MediaStore) -> Self {
        Self { pool, media }
    }

    /// Open a store for `user_id`, which also makes the user a seller.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the user already has a store or
    /// the name is taken, and other variants for invalid input or failures.
    pub async fn open(&self, user_id: UserId, form: &StoreForm) -> Result<StoreAccount, StoreError> {
        let (store_name, contact_no) = form.validate()?;

        let uploads = [
            (MediaKind::StoreLogo, form.logo.as_ref()),
            (MediaKind::StoreVerification, form.verification.as_ref()),
        ];
        let mut stored = Vec::new();
        let mut paths = [None, None];
        for (slot, (kind, upload)) in paths.iter_mut().zip(uploads) {
            let Some(upload) = upload.filter(|u| !u.is_blank()) else {
                continue;
            };
            match self.media.save(kind, upload).await {
                Ok(path) => {
                    stored.push(path.clone());
                    *slot = Some(path);
                }
                Err(e) => {
                    self.media.discard(&stored).await;
                    return Err(e.into());
                }
            }
        }
        let [store_logo, store_verification] = paths;

        let new_store = NewStoreAccount {
            user_id,
            store_name,
            contact_no,
            store_logo,
            store_verification,
        };

        match StoreAccountRepository::new(self.pool).create(&new_store).await {
            Ok(store) => {
                tracing::info!(store_id = %store.id, user_id = %user_id, "Store opened");
                Ok(store)
            }
            Err(e) => {
                self.media.discard(&stored).await;
                Err(match e {
                    RepositoryError::Conflict(_) => StoreError::AlreadyExists,
                    other => StoreError::Repository(other),
                })
            }
        }
    }
}
