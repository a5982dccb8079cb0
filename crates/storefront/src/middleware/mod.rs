//! Request layers and extractors for the storefront.
//!
//! Layers as installed in `main.rs`, outermost first:
//!
//! 1. Sentry hub and HTTP transaction
//! 2. `TraceLayer` request span
//! 3. [`request_id_middleware`] records an ID on that span
//! 4. [`csp_nonce_middleware`]
//! 5. [`security_headers_middleware`], which needs the nonce
//! 6. Signed sessions in `PostgreSQL`
//!
//! Login and registration POSTs are additionally rate limited per client IP.
//! [`RequireAuth`], [`RequireSeller`] and [`OptionalAuth`] read the session
//! that layer 6 loads; [`Flashes`] drains one-shot messages from it.

pub mod auth;
pub mod csp;
pub mod flash;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, RequireSeller, clear_current_user, set_current_user};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use flash::{Flash, FlashLevel, FlashMessage, Flashes, take_flashes};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_key};
