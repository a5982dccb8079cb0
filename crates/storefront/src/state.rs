//! Shared handler state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::GrabitConfig;
use crate::services::media::MediaStore;

/// Everything a handler may need: settings, the database pool and the upload
/// directory. Clones share one allocation.
#[derive(Clone)]
pub struct AppState(Arc<Shared>);

struct Shared {
    config: GrabitConfig,
    pool: PgPool,
    media: MediaStore,
}

impl AppState {
    /// Build the state, with the media store over both configured roots.
    #[must_use]
    pub fn new(config: GrabitConfig, pool: PgPool) -> Self {
        let media = MediaStore::new(&config.media.root, &config.media.private_root);
        Self(Arc::new(Shared {
            config,
            pool,
            media,
        }))
    }

    #[must_use]
    pub fn config(&self) -> &GrabitConfig {
        &self.0.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.0.pool
    }

    /// Where product images, store logos and verification files are written.
    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.0.media
    }
}
