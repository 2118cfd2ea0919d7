//! One-shot notifications
//!
//! A flash survives exactly one redirect: the handler attaches it to its
//! response, the cookie layer stores it, and the next rendered page shows
//! it and drops the cookie.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use super::middleware::read_cookie;
use crate::services::messages;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Flash {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            title: title.into(),
            description: None,
        }
    }

    /// Error notification with the generic error title
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            title: messages::ERROR_TITLE.to_string(),
            description: Some(description.into()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Cookie-safe encoding
    pub fn encode(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        urlencoding::encode(&json).into_owned()
    }

    pub fn decode(value: &str) -> Option<Self> {
        let json = urlencoding::decode(value).ok()?;
        serde_json::from_str(&json).ok()
    }
}

/// Flash sent along with the current request, if any
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Option<Flash>);

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            read_cookie(&parts.headers, FLASH_COOKIE).and_then(|value| Flash::decode(&value)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_cookie_value_is_cookie_safe() {
        let flash = Flash::success(messages::FORUM_CREATED)
            .with_description(messages::forum_created_detail("Rust; \"és\" más"));

        let encoded = flash.encode();

        assert!(!encoded.contains(';'));
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('"'));
        assert_eq!(Flash::decode(&encoded), Some(flash));
    }

    #[test]
    fn test_error_flash_uses_generic_title() {
        let flash = Flash::error(messages::FORUM_DELETE_FORBIDDEN);
        assert_eq!(flash.kind, FlashKind::Error);
        assert_eq!(flash.title, messages::ERROR_TITLE);
    }

    #[test]
    fn test_garbage_flash_is_ignored() {
        assert_eq!(Flash::decode("%7Bnot-json"), None);
        assert_eq!(Flash::decode(""), None);
    }
}
