//! User service
//!
//! Account operations of the client:
//! - Login and registration, both yielding a session token
//! - Profile lookup and update
//! - Password change

use std::sync::Arc;

use super::messages::*;
use super::validation::{
    validate_login, validate_password_change, validate_profile_update, validate_registration,
};
use super::{ServiceError, ServiceResult, SessionToken, StatusMessages};
use crate::backend::ForumBackend;
use crate::models::{ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateUserRequest, User};

const LOGIN: StatusMessages =
    StatusMessages::new(&[(400, INVALID_INPUT), (401, WRONG_CREDENTIALS)])
        .server_first()
        .public();
const REGISTER: StatusMessages = StatusMessages::new(&[(400, INVALID_INPUT), (409, USER_EXISTS)])
    .server_first()
    .public();
const CHANGE_PASSWORD: StatusMessages =
    StatusMessages::new(&[(400, INVALID_INPUT), (409, SAME_PASSWORD)]).server_first();
const UPDATE_PROFILE: StatusMessages = StatusMessages::new(&[(400, INVALID_INPUT)]).server_first();

/// User service for account screens
pub struct UserService {
    backend: Arc<dyn ForumBackend>,
}

impl UserService {
    pub fn new(backend: Arc<dyn ForumBackend>) -> Self {
        Self { backend }
    }

    /// Log in with email and password
    pub async fn login(&self, request: &LoginRequest) -> ServiceResult<SessionToken> {
        validate_login(request)?;

        let response = self
            .backend
            .login(request)
            .await
            .map_err(|e| LOGIN.map(e))?;

        tracing::info!("User logged in");
        issued_token(response.access_token)
    }

    /// Create an account; the backend logs the new user in right away
    pub async fn register(&self, request: &RegisterRequest) -> ServiceResult<SessionToken> {
        validate_registration(request)?;

        let response = self
            .backend
            .register(request)
            .await
            .map_err(|e| REGISTER.map(e))?;

        tracing::info!("User registered");
        issued_token(response.access_token)
    }

    pub async fn change_password(
        &self,
        token: &SessionToken,
        request: &ChangePasswordRequest,
    ) -> ServiceResult<()> {
        validate_password_change(request)?;

        self.backend
            .change_password(token.as_str(), request)
            .await
            .map_err(|e| CHANGE_PASSWORD.map(e))?;

        tracing::info!("Password changed");
        Ok(())
    }

    /// Current user. Any failure means the session is unusable.
    pub async fn profile(&self, token: &SessionToken) -> ServiceResult<User> {
        self.backend.current_user(token.as_str()).await.map_err(|e| {
            tracing::info!("Profile lookup failed, ending session: {}", e);
            ServiceError::Unauthorized
        })
    }

    pub async fn update_profile(
        &self,
        token: &SessionToken,
        request: &UpdateUserRequest,
    ) -> ServiceResult<User> {
        validate_profile_update(request)?;

        let user = self
            .backend
            .update_user(token.as_str(), request)
            .await
            .map_err(|e| UPDATE_PROFILE.map(e))?;

        tracing::info!("Profile updated");
        Ok(user)
    }
}

fn issued_token(value: String) -> ServiceResult<SessionToken> {
    SessionToken::new(value).ok_or_else(|| ServiceError::Unavailable(UNKNOWN_ERROR.to_string()))
}
