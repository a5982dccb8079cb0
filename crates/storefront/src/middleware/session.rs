//! Cookie sessions stored in `tower_sessions.session`.
//!
//! The table comes from the `create_sessions` migration. Cookies are signed
//! with a key taken from `GRABIT_SESSION_SECRET`.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::{Key, KeyError, SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::GrabitConfig;

pub const SESSION_COOKIE_NAME: &str = "grabit_session";

/// Idle sessions are dropped after a week.
const IDLE_EXPIRY: Duration = Duration::days(7);

/// Unsigned session layer over the `PostgreSQL` store; call
/// `.with_signed(session_key(config)?)` before installing it.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &GrabitConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(PostgresStore::new(pool.clone()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(IDLE_EXPIRY))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Cookie signing key built from the configured session secret.
///
/// # Errors
///
/// Returns `KeyError` if the secret is shorter than 64 bytes.
pub fn session_key(config: &GrabitConfig) -> Result<Key, KeyError> {
    Key::try_from(config.session_secret.expose_secret().as_bytes())
}
