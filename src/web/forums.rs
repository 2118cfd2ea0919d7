//! Forum pages
//!
//! Forum list with search, date range, ordering and the "own forums only"
//! toggle, plus create, edit and delete.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Serialize;

use super::middleware::with_effects;
use super::{
    comments_path, form_context, form_failure, forum_path, page_context, redirect_with_error,
    render, AppState, CurrentSession, Flash, IncomingFlash, WebError,
};
use crate::models::{Forum, ForumInput, ForumOrder, ForumQuery};
use crate::services::{messages, ServiceError, ValidationErrors};

/// One row of the forum table
#[derive(Debug, Serialize)]
struct ForumRow<'a> {
    forum: &'a Forum,
    author: String,
    last_comment_author: Option<String>,
    can_manage: bool,
}

/// Entry of the order selector
#[derive(Debug, Serialize)]
struct OrderOption {
    value: String,
    label: &'static str,
    selected: bool,
}

fn order_options(selected: ForumOrder) -> Vec<OrderOption> {
    ForumOrder::ALL
        .into_iter()
        .map(|order| OrderOption {
            value: order.to_string(),
            label: order.label(),
            selected: order == selected,
        })
        .collect()
}

/// Target and wording of the shared create/edit form
#[derive(Debug, Serialize)]
struct FormTarget {
    action: String,
    editing: bool,
}

impl FormTarget {
    fn create() -> Self {
        Self {
            action: "/forum/new".to_string(),
            editing: false,
        }
    }

    fn edit(forum_id: &str) -> Self {
        Self {
            action: format!("{}/edit", forum_path(forum_id)),
            editing: true,
        }
    }
}

// ============================================================================
// List
// ============================================================================

pub async fn list(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Query(query): Query<ForumQuery>,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    let mut context = page_context(flash, true);
    context.insert("query", &query);
    context.insert("orders", &order_options(query.order()));
    context.insert("own_only", &query.own_forums_only());
    context.insert("toggle_query", &query.toggled_own_forums().to_query_string());

    match state.forum_service.list(&token, &query).await {
        Ok(listing) => {
            let rows: Vec<ForumRow> = listing
                .forums
                .iter()
                .map(|forum| ForumRow {
                    forum,
                    author: forum.created_by.full_name(),
                    last_comment_author: forum.last_comment.as_ref().map(|c| c.user.full_name()),
                    can_manage: listing.can_manage(forum),
                })
                .collect();
            context.insert("user", &listing.user);
            context.insert("rows", &rows);
            context.insert("error", &Option::<String>::None);
        }
        Err(ServiceError::Unauthorized) => return Err(WebError::SessionEnded),
        Err(e) => {
            context.insert("user", &Option::<()>::None);
            context.insert("rows", &Vec::<ForumRow>::new());
            context.insert("error", &e.user_message());
        }
    }

    Ok(render(&state, "forums.html", &context)?.into_response())
}

/// A forum is shown through its comment list
pub async fn show(Path(forum_id): Path<String>) -> Redirect {
    Redirect::to(&comments_path(&forum_id))
}

// ============================================================================
// Create / edit
// ============================================================================

fn forum_form_page(
    state: &AppState,
    flash: IncomingFlash,
    target: FormTarget,
    values: &ForumInput,
    errors: &ValidationErrors,
    error: Option<&str>,
) -> Result<Response, WebError> {
    let mut context = form_context(flash, true, values, errors, error);
    context.insert("target", &target);
    Ok(render(state, "forum_form.html", &context)?.into_response())
}

pub async fn new_form(State(state): State<AppState>, flash: IncomingFlash) -> Result<Response, WebError> {
    forum_form_page(
        &state,
        flash,
        FormTarget::create(),
        &ForumInput::default(),
        &ValidationErrors::default(),
        None,
    )
}

pub async fn create(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Form(input): Form<ForumInput>,
) -> Result<Response, WebError> {
    match state.forum_service.create(&token, &input).await {
        Ok(forum) => Ok(with_effects(
            Redirect::to("/forum"),
            None,
            Some(
                Flash::success(messages::FORUM_CREATED)
                    .with_description(messages::forum_created_detail(&forum.title)),
            ),
        )),
        Err(e) => {
            let (errors, error) = form_failure(e)?;
            forum_form_page(
                &state,
                IncomingFlash::default(),
                FormTarget::create(),
                &input,
                &errors,
                error.as_deref(),
            )
        }
    }
}

/// Edit form, prefilled from the backend
pub async fn edit_form(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Path(forum_id): Path<String>,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    match state.forum_service.get(Some(&token), &forum_id).await {
        Ok(forum) => forum_form_page(
            &state,
            flash,
            FormTarget::edit(&forum_id),
            &ForumInput::from(&forum),
            &ValidationErrors::default(),
            None,
        ),
        Err(e) => redirect_with_error("/forum", e),
    }
}

pub async fn update(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Path(forum_id): Path<String>,
    Form(input): Form<ForumInput>,
) -> Result<Response, WebError> {
    match state.forum_service.update(&token, &forum_id, &input).await {
        Ok(forum) => Ok(with_effects(
            Redirect::to("/forum"),
            None,
            Some(
                Flash::success(messages::FORUM_UPDATED)
                    .with_description(messages::forum_updated_detail(&forum.title)),
            ),
        )),
        Err(e) => {
            let (errors, error) = form_failure(e)?;
            forum_form_page(
                &state,
                IncomingFlash::default(),
                FormTarget::edit(&forum_id),
                &input,
                &errors,
                error.as_deref(),
            )
        }
    }
}

// ============================================================================
// Delete
// ============================================================================

pub async fn delete_confirm(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Path(forum_id): Path<String>,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    match state.forum_service.get(Some(&token), &forum_id).await {
        Ok(forum) => {
            let mut context = page_context(flash, true);
            context.insert("forum", &forum);
            context.insert("action", &format!("{}/delete", forum_path(&forum_id)));
            Ok(render(&state, "forum_delete.html", &context)?.into_response())
        }
        Err(e) => redirect_with_error("/forum", e),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Path(forum_id): Path<String>,
) -> Result<Response, WebError> {
    match state.forum_service.delete(&token, &forum_id).await {
        Ok(()) => Ok(with_effects(
            Redirect::to("/forum"),
            None,
            Some(Flash::success(messages::FORUM_DELETED).with_description(messages::FORUM_DELETED_DETAIL)),
        )),
        Err(e) => redirect_with_error("/forum", e),
    }
}
