//! Forum backend gateway
//!
//! Every screen of the client talks to the external forum REST API through
//! the [`ForumBackend`] trait, one method per API operation. The production
//! implementation is [`HttpBackend`]; tests use an in-memory fake.
//!
//! Methods return the decoded body on a 2xx status. Any other status is
//! surfaced as [`BackendError::Status`] with the server's `message`, if it
//! sent one, so that each caller can apply its own status-code table.

mod http;
#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{
    ChangePasswordRequest, Comment, CommentInput, CommentPage, CommentQuery, Forum, ForumInput,
    ForumQuery, LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest, User,
};

pub use http::HttpBackend;

/// Error types for backend calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-success status
    #[error("Backend returned status {status}")]
    Status { status: u16, message: Option<String> },

    /// The request never got an answer
    #[error("Backend unreachable: {0}")]
    Transport(String),

    /// The answer could not be decoded
    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// HTTP status, if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message sent by the backend in the error body
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the backend rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Error body shape used by the backend: `{"message": "..."}`, where the
/// message may also be a list of strings.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
}

/// Extract a human-readable message from an error response body
pub(crate) fn parse_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.message? {
        serde_json::Value::String(text) => text,
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    let message = message.trim().to_string();
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

/// Forum REST API operations
#[async_trait]
pub trait ForumBackend: Send + Sync {
    /// POST /user/login
    async fn login(&self, request: &LoginRequest) -> BackendResult<TokenResponse>;

    /// POST /user
    async fn register(&self, request: &RegisterRequest) -> BackendResult<TokenResponse>;

    /// PATCH /user/login
    async fn change_password(&self, token: &str, request: &ChangePasswordRequest) -> BackendResult<()>;

    /// GET /user
    async fn current_user(&self, token: &str) -> BackendResult<User>;

    /// PUT /user
    async fn update_user(&self, token: &str, request: &UpdateUserRequest) -> BackendResult<User>;

    /// GET /forum
    async fn list_forums(&self, token: Option<&str>, query: &ForumQuery) -> BackendResult<Vec<Forum>>;

    /// GET /forum/:id
    async fn get_forum(&self, token: Option<&str>, forum_id: &str) -> BackendResult<Forum>;

    /// POST /forum
    async fn create_forum(&self, token: &str, input: &ForumInput) -> BackendResult<Forum>;

    /// PATCH /forum/:id
    async fn update_forum(&self, token: &str, forum_id: &str, input: &ForumInput) -> BackendResult<Forum>;

    /// DELETE /forum/:id
    async fn delete_forum(&self, token: &str, forum_id: &str) -> BackendResult<()>;

    /// GET /forum/:id/comments
    async fn list_comments(&self, forum_id: &str, query: &CommentQuery) -> BackendResult<CommentPage>;

    /// GET /forum/:id/comments/:cid
    async fn get_comment(&self, forum_id: &str, comment_id: &str) -> BackendResult<Comment>;

    /// POST /forum/:id/comments
    async fn create_comment(&self, token: &str, forum_id: &str, input: &CommentInput) -> BackendResult<Comment>;

    /// PATCH /forum/:id/comments/:cid
    async fn update_comment(
        &self,
        token: &str,
        forum_id: &str,
        comment_id: &str,
        input: &CommentInput,
    ) -> BackendResult<Comment>;

    /// DELETE /forum/:id/comments/:cid
    async fn delete_comment(&self, token: &str, forum_id: &str, comment_id: &str) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_string() {
        assert_eq!(
            parse_error_message(r#"{"message":"Hibás jelszó"}"#),
            Some("Hibás jelszó".to_string())
        );
    }

    #[test]
    fn test_parse_error_message_list() {
        assert_eq!(
            parse_error_message(r#"{"message":["title too long","description empty"],"error":"Bad Request"}"#),
            Some("title too long, description empty".to_string())
        );
    }

    #[test]
    fn test_parse_error_message_missing_or_blank() {
        assert_eq!(parse_error_message(r#"{"error":"Conflict"}"#), None);
        assert_eq!(parse_error_message(r#"{"message":"  "}"#), None);
        assert_eq!(parse_error_message(r#"{"message":42}"#), None);
        assert_eq!(parse_error_message("<html>502</html>"), None);
        assert_eq!(parse_error_message(""), None);
    }

    #[test]
    fn test_backend_error_accessors() {
        let err = BackendError::Status {
            status: 401,
            message: Some("expired".to_string()),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.server_message(), Some("expired"));
        assert!(err.is_unauthorized());

        let err = BackendError::Transport("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
    }
}
