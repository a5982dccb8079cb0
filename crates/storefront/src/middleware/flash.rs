//! One-shot flash messages.
//!
//! Form handlers push a message into the session and redirect; the next page
//! rendered for that session takes and displays it.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// A message shown once on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    /// CSS class for the message box.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.level {
            FlashLevel::Success => "flash flash-success",
            FlashLevel::Error => "flash flash-error",
        }
    }
}

/// Helpers for queueing flash messages.
pub struct Flash;

impl Flash {
    /// Queue a success message.
    pub async fn success(session: &Session, text: impl Into<String>) {
        push(session, FlashLevel::Success, text.into()).await;
    }

    /// Queue an error message.
    pub async fn error(session: &Session, text: impl Into<String>) {
        push(session, FlashLevel::Error, text.into()).await;
    }
}

async fn push(session: &Session, level: FlashLevel, text: String) {
    let mut pending: Vec<FlashMessage> = session
        .get(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(FlashMessage { level, text });

    // A lost flash only costs the user a message
    if let Err(e) = session.insert(session_keys::FLASH, pending).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return all pending messages.
pub async fn take_flashes(session: &Session) -> Vec<FlashMessage> {
    match session.remove::<Vec<FlashMessage>>(session_keys::FLASH).await {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}

/// Extractor that takes the pending flash messages.
pub struct Flashes(pub Vec<FlashMessage>);

impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let messages = match parts.extensions.get::<Session>() {
            Some(session) => take_flashes(session).await,
            None => Vec::new(),
        };
        Ok(Self(messages))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flashes_are_taken_once() {
        let session = session();
        Flash::success(&session, "Saved").await;
        Flash::error(&session, "But something else failed").await;

        let messages = take_flashes(&session).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, FlashLevel::Success);
        assert_eq!(messages[1].text, "But something else failed");

        assert!(take_flashes(&session).await.is_empty());
    }

    #[test]
    fn test_css_class() {
        let msg = FlashMessage {
            level: FlashLevel::Error,
            text: "x".to_owned(),
        };
        assert_eq!(msg.css_class(), "flash flash-error");
    }
}
