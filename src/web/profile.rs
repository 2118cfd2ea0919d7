//! Profile pages

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};

use super::middleware::with_effects;
use super::{
    form_context, form_failure, page_context, render, AppState, CurrentSession, Flash,
    IncomingFlash, WebError,
};
use crate::models::UpdateUserRequest;
use crate::services::{messages, ValidationErrors};

/// Profile of the signed-in user. Any lookup failure ends the session.
pub async fn show(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    let user = state
        .user_service
        .profile(&token)
        .await
        .map_err(|_| WebError::SessionEnded)?;

    let mut context = page_context(flash, true);
    context.insert("user", &user);
    Ok(render(&state, "profile.html", &context)?.into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    let user = state
        .user_service
        .profile(&token)
        .await
        .map_err(|_| WebError::SessionEnded)?;

    let context = form_context(
        flash,
        true,
        &UpdateUserRequest::from(&user),
        &ValidationErrors::default(),
        None,
    );
    Ok(render(&state, "profile_edit.html", &context)?.into_response())
}

pub async fn update(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Form(request): Form<UpdateUserRequest>,
) -> Result<Response, WebError> {
    match state.user_service.update_profile(&token, &request).await {
        Ok(_) => Ok(with_effects(
            Redirect::to("/profile"),
            None,
            Some(Flash::success(messages::PROFILE_UPDATED)),
        )),
        Err(e) => {
            let (errors, error) = form_failure(e)?;
            let context = form_context(IncomingFlash::default(), true, &request, &errors, error.as_deref());
            Ok(render(&state, "profile_edit.html", &context)?.into_response())
        }
    }
}
