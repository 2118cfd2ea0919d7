//! Web layer - Pages and routing
//!
//! Server-rendered pages of the forum client:
//! - Login, registration, logout
//! - Profile view and edit, password change
//! - Forum list and forum CRUD
//! - Comment list with pagination and comment CRUD
//!
//! Protected pages sit behind the session gate middleware, which redirects
//! to `/login` when the browser has no stored token.

pub mod auth;
pub mod comments;
pub mod flash;
pub mod forums;
pub mod middleware;
pub mod profile;
pub mod views;


use axum::{
    middleware as axum_middleware,
    response::{Html, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tera::Context;
use tower_http::trace::TraceLayer;

pub use flash::{Flash, FlashKind, IncomingFlash};
pub use middleware::{AppState, CurrentSession, OptionalSession, WebError};
pub use views::{ViewError, Views};

use crate::services::{messages, ServiceError, ValidationErrors};

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    // Pages that need a stored token
    let protected_routes = Router::new()
        .route("/profile", get(profile::show))
        .route("/update", get(profile::edit_form).post(profile::update))
        .route(
            "/change-password",
            get(auth::change_password_form).post(auth::change_password),
        )
        .route("/forum", get(forums::list))
        .route("/forum/new", get(forums::new_form).post(forums::create))
        .route("/forum/{id}/edit", get(forums::edit_form).post(forums::update))
        .route("/forum/{id}/delete", get(forums::delete_confirm).post(forums::delete))
        .route(
            "/forum/{id}/comments/new",
            get(comments::new_form).post(comments::create),
        )
        .route(
            "/forum/{id}/comments/{comment_id}/edit",
            get(comments::edit_form).post(comments::update),
        )
        .route(
            "/forum/{id}/comments/{comment_id}/delete",
            get(comments::delete_confirm).post(comments::delete),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    // Public pages
    Router::new()
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/forum/{id}", get(forums::show))
        .route("/forum/{id}/comments", get(comments::list))
        .merge(protected_routes)
        .fallback(fallback)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::apply_cookie_effects,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unknown paths go to the login page
async fn fallback() -> Redirect {
    Redirect::to("/login")
}

// ============================================================================
// Page helpers
// ============================================================================

/// Context every page starts from
pub(crate) fn page_context(flash: IncomingFlash, authenticated: bool) -> Context {
    let mut context = Context::new();
    context.insert("flash", &flash.0);
    context.insert("authenticated", &authenticated);
    context
}

/// Context of a form page
pub(crate) fn form_context<T: Serialize>(
    flash: IncomingFlash,
    authenticated: bool,
    values: &T,
    errors: &ValidationErrors,
    error: Option<&str>,
) -> Context {
    let mut context = page_context(flash, authenticated);
    context.insert("values", values);
    context.insert("errors", errors);
    context.insert("error", &error);
    context
}

pub(crate) fn render(state: &AppState, template: &str, context: &Context) -> Result<Html<String>, WebError> {
    Ok(Html(state.views.render(template, context)?))
}

/// Split a failed submission into what the form shows.
///
/// An ended session is not a form problem and is returned as the error.
pub(crate) fn form_failure(error: ServiceError) -> Result<(ValidationErrors, Option<String>), WebError> {
    match error {
        ServiceError::Unauthorized => Err(WebError::SessionEnded),
        ServiceError::Invalid(errors) => {
            let message = errors.form().map(str::to_string);
            Ok((errors, message))
        }
        other => Ok((
            ValidationErrors::default(),
            other.user_message().map(str::to_string),
        )),
    }
}

/// Leave a failed action for `to`, carrying the failure as an error flash
pub(crate) fn redirect_with_error(to: &str, error: ServiceError) -> Result<Response, WebError> {
    match error {
        ServiceError::Unauthorized => Err(WebError::SessionEnded),
        other => {
            let message = other.user_message().unwrap_or(messages::UNKNOWN_ERROR);
            Ok(middleware::with_effects(
                Redirect::to(to),
                None,
                Some(Flash::error(message)),
            ))
        }
    }
}

pub(crate) fn forum_path(forum_id: &str) -> String {
    format!("/forum/{}", urlencoding::encode(forum_id))
}

pub(crate) fn comments_path(forum_id: &str) -> String {
    format!("{}/comments", forum_path(forum_id))
}
