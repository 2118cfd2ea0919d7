//! Account pages: login, registration, password change, logout

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::{Deserialize, Serialize};

use super::middleware::with_effects;
use super::{
    form_context, form_failure, render, AppState, CurrentSession, Flash,
    IncomingFlash, OptionalSession, WebError,
};
use crate::models::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::services::{messages, SessionGate, TokenPersistence, ValidationErrors};

/// Login form as posted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox; absent when unchecked
    #[serde(default)]
    pub remember: Option<String>,
}

/// Values echoed back into the login form. Passwords are never echoed.
#[derive(Debug, Serialize)]
struct LoginValues<'a> {
    username: &'a str,
    remember: bool,
}

/// Values echoed back into the registration form
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterValues<'a> {
    username: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

// ============================================================================
// Login
// ============================================================================

pub async fn login_form(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    if session.is_some() {
        return Ok(Redirect::to("/forum").into_response());
    }

    let context = form_context(
        flash,
        false,
        &LoginValues {
            username: "",
            remember: true,
        },
        &ValidationErrors::default(),
        None,
    );
    Ok(render(&state, "login.html", &context)?.into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let remember = form.remember.is_some();
    let request = LoginRequest {
        username: form.username,
        password: form.password,
    };

    match state.user_service.login(&request).await {
        Ok(token) => {
            let persistence = if remember {
                TokenPersistence::Persistent
            } else {
                TokenPersistence::BrowserSession
            };
            let effect = SessionGate::default().sign_in(token, persistence);
            Ok(with_effects(Redirect::to("/forum"), Some(effect), None))
        }
        Err(e) => {
            let (errors, error) = form_failure(e)?;
            let context = form_context(
                IncomingFlash::default(),
                false,
                &LoginValues {
                    username: &request.username,
                    remember,
                },
                &errors,
                error.as_deref(),
            );
            Ok(render(&state, "login.html", &context)?.into_response())
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

pub async fn register_form(State(state): State<AppState>, flash: IncomingFlash) -> Result<Response, WebError> {
    let context = form_context(
        flash,
        false,
        &RegisterValues {
            username: "",
            first_name: "",
            last_name: "",
        },
        &ValidationErrors::default(),
        None,
    );
    Ok(render(&state, "register.html", &context)?.into_response())
}

pub async fn register(
    State(state): State<AppState>,
    Form(request): Form<RegisterRequest>,
) -> Result<Response, WebError> {
    match state.user_service.register(&request).await {
        Ok(token) => {
            let effect = SessionGate::default().sign_in(token, TokenPersistence::Persistent);
            Ok(with_effects(
                Redirect::to("/profile"),
                Some(effect),
                Some(Flash::success(messages::REGISTERED)),
            ))
        }
        Err(e) => {
            let (errors, error) = form_failure(e)?;
            let context = form_context(
                IncomingFlash::default(),
                false,
                &RegisterValues {
                    username: &request.username,
                    first_name: &request.first_name,
                    last_name: &request.last_name,
                },
                &errors,
                error.as_deref(),
            );
            Ok(render(&state, "register.html", &context)?.into_response())
        }
    }
}

// ============================================================================
// Password change
// ============================================================================

pub async fn change_password_form(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    let context = form_context(flash, true, &(), &ValidationErrors::default(), None);
    Ok(render(&state, "change_password.html", &context)?.into_response())
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Form(request): Form<ChangePasswordRequest>,
) -> Result<Response, WebError> {
    match state.user_service.change_password(&token, &request).await {
        Ok(()) => Ok(with_effects(
            Redirect::to("/profile"),
            None,
            Some(Flash::success(messages::PASSWORD_CHANGED)),
        )),
        Err(e) => {
            let (errors, error) = form_failure(e)?;
            let context = form_context(IncomingFlash::default(), true, &(), &errors, error.as_deref());
            Ok(render(&state, "change_password.html", &context)?.into_response())
        }
    }
}

// ============================================================================
// Logout
// ============================================================================

/// Forget the token in both storage locations
pub async fn logout(OptionalSession(session): OptionalSession) -> Response {
    let mut gate = session.map(SessionGate::Authenticated).unwrap_or_default();
    let effect = gate.sign_out();
    tracing::info!("User logged out");
    with_effects(Redirect::to("/login"), Some(effect), None)
}
