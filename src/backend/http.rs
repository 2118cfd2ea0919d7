//! reqwest implementation of the forum backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{parse_error_message, BackendError, BackendResult, ForumBackend};
use crate::config::BackendConfig;
use crate::models::{
    ChangePasswordRequest, Comment, CommentInput, CommentPage, CommentQuery, Forum, ForumInput,
    ForumQuery, LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest, User,
};

/// Forum backend reached over HTTP
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend client for the configured base URL
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("forum-web/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BackendError::Transport(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an URL from path segments; dynamic segments are percent-encoded
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    /// Send a request, attaching the bearer token when given.
    ///
    /// Non-success statuses become [`BackendError::Status`].
    async fn send(&self, request: RequestBuilder, token: Option<&str>) -> BackendResult<Response> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let request = request
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to build request: {}", e)))?;

        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %path, "Backend request failed: {}", e);
            BackendError::Transport(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(%method, %path, status = status.as_u16(), "Backend call");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%method, %path, status = status.as_u16(), "Backend rejected request");

        Err(BackendError::Status {
            status: status.as_u16(),
            message: parse_error_message(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ForumBackend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> BackendResult<TokenResponse> {
        let builder = self.client.post(self.endpoint(&["user", "login"])).json(request);
        Self::decode(self.send(builder, None).await?).await
    }

    async fn register(&self, request: &RegisterRequest) -> BackendResult<TokenResponse> {
        let builder = self.client.post(self.endpoint(&["user"])).json(request);
        Self::decode(self.send(builder, None).await?).await
    }

    async fn change_password(&self, token: &str, request: &ChangePasswordRequest) -> BackendResult<()> {
        let builder = self.client.patch(self.endpoint(&["user", "login"])).json(request);
        self.send(builder, Some(token)).await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        let builder = self.client.get(self.endpoint(&["user"]));
        Self::decode(self.send(builder, Some(token)).await?).await
    }

    async fn update_user(&self, token: &str, request: &UpdateUserRequest) -> BackendResult<User> {
        let builder = self.client.put(self.endpoint(&["user"])).json(request);
        Self::decode(self.send(builder, Some(token)).await?).await
    }

    async fn list_forums(&self, token: Option<&str>, query: &ForumQuery) -> BackendResult<Vec<Forum>> {
        let builder = self
            .client
            .get(self.endpoint(&["forum"]))
            .query(&query.to_params());
        Self::decode(self.send(builder, token).await?).await
    }

    async fn get_forum(&self, token: Option<&str>, forum_id: &str) -> BackendResult<Forum> {
        let builder = self.client.get(self.endpoint(&["forum", forum_id]));
        Self::decode(self.send(builder, token).await?).await
    }

    async fn create_forum(&self, token: &str, input: &ForumInput) -> BackendResult<Forum> {
        let builder = self.client.post(self.endpoint(&["forum"])).json(input);
        Self::decode(self.send(builder, Some(token)).await?).await
    }

    async fn update_forum(&self, token: &str, forum_id: &str, input: &ForumInput) -> BackendResult<Forum> {
        let builder = self.client.patch(self.endpoint(&["forum", forum_id])).json(input);
        Self::decode(self.send(builder, Some(token)).await?).await
    }

    async fn delete_forum(&self, token: &str, forum_id: &str) -> BackendResult<()> {
        let builder = self.client.delete(self.endpoint(&["forum", forum_id]));
        self.send(builder, Some(token)).await?;
        Ok(())
    }

    async fn list_comments(&self, forum_id: &str, query: &CommentQuery) -> BackendResult<CommentPage> {
        let builder = self
            .client
            .get(self.endpoint(&["forum", forum_id, "comments"]))
            .query(&query.to_params());
        Self::decode(self.send(builder, None).await?).await
    }

    async fn get_comment(&self, forum_id: &str, comment_id: &str) -> BackendResult<Comment> {
        let builder = self
            .client
            .get(self.endpoint(&["forum", forum_id, "comments", comment_id]));
        Self::decode(self.send(builder, None).await?).await
    }

    async fn create_comment(&self, token: &str, forum_id: &str, input: &CommentInput) -> BackendResult<Comment> {
        let builder = self
            .client
            .post(self.endpoint(&["forum", forum_id, "comments"]))
            .json(input);
        Self::decode(self.send(builder, Some(token)).await?).await
    }

    async fn update_comment(
        &self,
        token: &str,
        forum_id: &str,
        comment_id: &str,
        input: &CommentInput,
    ) -> BackendResult<Comment> {
        let builder = self
            .client
            .patch(self.endpoint(&["forum", forum_id, "comments", comment_id]))
            .json(input);
        Self::decode(self.send(builder, Some(token)).await?).await
    }

    async fn delete_comment(&self, token: &str, forum_id: &str, comment_id: &str) -> BackendResult<()> {
        let builder = self
            .client
            .delete(self.endpoint(&["forum", forum_id, "comments", comment_id]));
        self.send(builder, Some(token)).await?;
        Ok(())
    }
}
