//! Per-request nonce for inline `<script>` tags.
//!
//! Templates print the nonce from [`PageContext`](crate::routes::PageContext)
//! and the `Content-Security-Policy` header built by
//! [`security_headers_middleware`](super::security_headers_middleware) allows
//! only scripts carrying it. This layer must wrap that one.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// 16 random bytes, base64 encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

/// Without the layer the nonce is empty and the policy allows no inline
/// scripts.
impl<S: Send + Sync> FromRequestParts<S> for CspNonce {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(nonce) = parts.extensions.get::<Self>() {
            return Ok(nonce.clone());
        }
        tracing::warn!(path = %parts.uri.path(), "no CSP nonce on request");
        Ok(Self(String::new()))
    }
}
