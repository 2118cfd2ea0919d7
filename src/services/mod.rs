//! Services layer - Screen logic
//!
//! Services sit between the page handlers and the forum backend.
//! They are responsible for:
//! - Validating input before anything is sent
//! - Firing exactly one backend request per user action
//! - Mapping backend status codes to the message the user sees
//! - Deciding when a failure ends the session

pub mod comment;
pub mod forum;
pub mod messages;
pub mod session;
pub mod user;
pub mod validation;

pub use comment::{CommentListParams, CommentListing, CommentPager, CommentService};
pub use forum::{ForumListing, ForumService};
pub use session::{SessionEffect, SessionGate, SessionToken, TokenPersistence};
pub use user::UserService;
pub use validation::ValidationErrors;

use crate::backend::BackendError;

/// Error types for service operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Input failed client-side validation; nothing was sent
    #[error("Invalid input")]
    Invalid(ValidationErrors),

    /// The backend rejected the session token
    #[error("Session ended")]
    Unauthorized,

    /// The backend refused the operation
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached or answered garbage
    #[error("{0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Text shown to the user, if this error carries one
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Rejected(message) | Self::Unavailable(message) => Some(message),
            Self::Invalid(errors) => errors.form(),
            Self::Unauthorized => None,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Status code → message table of one backend operation
#[derive(Debug, Clone, Copy)]
pub(crate) struct StatusMessages {
    /// Fixed messages per status
    table: &'static [(u16, &'static str)],
    /// Prefer the server's own message over the table
    server_first: bool,
    /// The call carries a bearer token; a 401 ends the session
    bearer: bool,
    /// Message for statuses missing from the table
    fallback: &'static str,
}

impl StatusMessages {
    pub(crate) const fn new(table: &'static [(u16, &'static str)]) -> Self {
        Self {
            table,
            server_first: false,
            bearer: true,
            fallback: messages::UNKNOWN_ERROR,
        }
    }

    pub(crate) const fn server_first(mut self) -> Self {
        self.server_first = true;
        self
    }

    pub(crate) const fn public(mut self) -> Self {
        self.bearer = false;
        self
    }

    pub(crate) const fn fallback(mut self, fallback: &'static str) -> Self {
        self.fallback = fallback;
        self
    }

    pub(crate) fn map(&self, error: BackendError) -> ServiceError {
        match error {
            BackendError::Status { status: 401, .. } if self.bearer => ServiceError::Unauthorized,
            BackendError::Status { status, message } => {
                let fixed = self
                    .table
                    .iter()
                    .find(|(code, _)| *code == status)
                    .map(|(_, text)| *text);
                let text = if self.server_first {
                    message.unwrap_or_else(|| fixed.unwrap_or(self.fallback).to_string())
                } else {
                    fixed.unwrap_or(self.fallback).to_string()
                };
                ServiceError::Rejected(text)
            }
            BackendError::Transport(_) => ServiceError::Unavailable(messages::UNAVAILABLE.to_string()),
            BackendError::Decode(detail) => {
                tracing::warn!("Undecodable backend response: {}", detail);
                ServiceError::Unavailable(self.fallback.to_string())
            }
        }
    }
}
