//! Forum service
//!
//! Forum list with search, date filter and ordering, plus forum CRUD.
//! Forum screens always show their own wording for backend failures.

use std::sync::Arc;

use super::messages::*;
use super::validation::validate_forum;
use super::{ServiceError, ServiceResult, SessionToken, StatusMessages};
use crate::backend::ForumBackend;
use crate::models::{Forum, ForumInput, ForumQuery, User};

const LIST: StatusMessages = StatusMessages::new(&[]).fallback(FORUMS_LOAD_FAILED);
const GET: StatusMessages =
    StatusMessages::new(&[(404, FORUM_NOT_FOUND)]).fallback(PROFILE_LOAD_FAILED);
const CREATE: StatusMessages =
    StatusMessages::new(&[(400, INVALID_INPUT), (409, FORUM_EXISTS)]);
const UPDATE: StatusMessages = StatusMessages::new(&[
    (400, INVALID_INPUT),
    (403, FORUM_UPDATE_FORBIDDEN),
    (404, FORUM_NOT_FOUND),
    (409, FORUM_EXISTS),
]);
const DELETE: StatusMessages =
    StatusMessages::new(&[(403, FORUM_DELETE_FORBIDDEN), (404, FORUM_NOT_FOUND)]);

/// Forum list as shown to the current user
#[derive(Debug, Clone)]
pub struct ForumListing {
    pub user: User,
    pub forums: Vec<Forum>,
}

impl ForumListing {
    /// Whether the current user may edit or delete the forum
    pub fn can_manage(&self, forum: &Forum) -> bool {
        forum.is_owned_by(&self.user.user_id)
    }
}

/// Forum service for the forum screens
pub struct ForumService {
    backend: Arc<dyn ForumBackend>,
}

impl ForumService {
    pub fn new(backend: Arc<dyn ForumBackend>) -> Self {
        Self { backend }
    }

    /// List forums for the current user.
    ///
    /// The current user is looked up first; if that fails the session ends.
    /// With the "own forums only" toggle on, forums of other users are
    /// dropped from the result.
    pub async fn list(&self, token: &SessionToken, query: &ForumQuery) -> ServiceResult<ForumListing> {
        let user = self.backend.current_user(token.as_str()).await.map_err(|e| {
            tracing::info!("Current user lookup failed, ending session: {}", e);
            ServiceError::Unauthorized
        })?;

        let mut forums = self
            .backend
            .list_forums(Some(token.as_str()), query)
            .await
            .map_err(|e| LIST.map(e))?;

        if query.own_forums_only() {
            forums.retain(|forum| forum.is_owned_by(&user.user_id));
        }

        tracing::debug!(count = forums.len(), "Forums listed");
        Ok(ForumListing { user, forums })
    }

    pub async fn get(&self, token: Option<&SessionToken>, forum_id: &str) -> ServiceResult<Forum> {
        self.backend
            .get_forum(token.map(SessionToken::as_str), forum_id)
            .await
            .map_err(|e| GET.map(e))
    }

    pub async fn create(&self, token: &SessionToken, input: &ForumInput) -> ServiceResult<Forum> {
        validate_forum(input)?;

        let forum = self
            .backend
            .create_forum(token.as_str(), input)
            .await
            .map_err(|e| CREATE.map(e))?;

        tracing::info!(forum_id = %forum.id, "Forum created");
        Ok(forum)
    }

    pub async fn update(&self, token: &SessionToken, forum_id: &str, input: &ForumInput) -> ServiceResult<Forum> {
        validate_forum(input)?;

        let forum = self
            .backend
            .update_forum(token.as_str(), forum_id, input)
            .await
            .map_err(|e| UPDATE.map(e))?;

        tracing::info!(forum_id = %forum.id, "Forum updated");
        Ok(forum)
    }

    pub async fn delete(&self, token: &SessionToken, forum_id: &str) -> ServiceResult<()> {
        self.backend
            .delete_forum(token.as_str(), forum_id)
            .await
            .map_err(|e| DELETE.map(e))?;

        tracing::info!(forum_id, "Forum deleted");
        Ok(())
    }
}
