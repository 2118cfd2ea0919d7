//! Comment pages
//!
//! The comment list is public; writing needs a session. Edit and delete
//! links are offered to every signed-in user and the backend decides
//! whether the action is allowed.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Serialize;

use super::middleware::with_effects;
use super::{
    comments_path, form_context, form_failure, page_context, redirect_with_error, render,
    AppState, CurrentSession, Flash, IncomingFlash, OptionalSession, WebError,
};
use crate::config::COMMENT_PAGE_SIZES;
use crate::models::{Comment, CommentInput, CommentOrder};
use crate::services::{messages, CommentListParams, CommentPager, ValidationErrors};

#[derive(Debug, Serialize)]
struct CommentRow<'a> {
    comment: &'a Comment,
    author: String,
    edit_link: String,
    delete_link: String,
}

#[derive(Debug, Serialize)]
struct SizeOption {
    value: u32,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct OrderOption {
    value: String,
    label: &'static str,
    selected: bool,
}

/// Pagination controls of the list page
#[derive(Debug, Serialize)]
struct PagerView {
    limit: u32,
    offset: u64,
    total: u64,
    page: u64,
    page_count: u64,
    previous_link: Option<String>,
    next_link: Option<String>,
    sizes: Vec<SizeOption>,
    orders: Vec<OrderOption>,
}

impl PagerView {
    fn new(forum_id: &str, pager: &CommentPager) -> Self {
        let base = comments_path(forum_id);
        let link = |offset: u64| format!("{}?{}", base, pager.query_string(offset));

        Self {
            limit: pager.limit,
            offset: pager.offset,
            total: pager.total,
            page: pager.page(),
            page_count: pager.page_count(),
            previous_link: pager.previous_offset().map(&link),
            next_link: pager.next_offset().map(&link),
            sizes: COMMENT_PAGE_SIZES
                .into_iter()
                .map(|value| SizeOption {
                    value,
                    selected: value == pager.limit,
                })
                .collect(),
            orders: CommentOrder::ALL
                .into_iter()
                .map(|order| OrderOption {
                    value: order.to_string(),
                    label: order.label(),
                    selected: order == pager.order_by,
                })
                .collect(),
        }
    }
}

fn comment_path(forum_id: &str, comment_id: &str) -> String {
    format!("{}/{}", comments_path(forum_id), urlencoding::encode(comment_id))
}

/// Target of the shared create/edit form
#[derive(Debug, Serialize)]
struct FormTarget {
    action: String,
    cancel: String,
    editing: bool,
}

impl FormTarget {
    fn create(forum_id: &str) -> Self {
        Self {
            action: format!("{}/new", comments_path(forum_id)),
            cancel: comments_path(forum_id),
            editing: false,
        }
    }

    fn edit(forum_id: &str, comment_id: &str) -> Self {
        Self {
            action: format!("{}/edit", comment_path(forum_id, comment_id)),
            cancel: comments_path(forum_id),
            editing: true,
        }
    }
}

// ============================================================================
// List
// ============================================================================

pub async fn list(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    Path(forum_id): Path<String>,
    Query(params): Query<CommentListParams>,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    let query = params.to_query(state.comment_page_size);

    let mut context = page_context(flash, session.is_some());
    context.insert("forum_id", &forum_id);
    context.insert("comments_path", &comments_path(&forum_id));
    context.insert("new_comment_link", &format!("{}/new", comments_path(&forum_id)));

    match state.comment_service.list(&forum_id, &query).await {
        Ok(listing) => {
            let rows: Vec<CommentRow> = listing
                .comments
                .iter()
                .map(|comment| CommentRow {
                    comment,
                    author: comment.user.full_name(),
                    edit_link: format!("{}/edit", comment_path(&forum_id, &comment.id)),
                    delete_link: format!("{}/delete", comment_path(&forum_id, &comment.id)),
                })
                .collect();
            context.insert("rows", &rows);
            context.insert("pager", &PagerView::new(&forum_id, &listing.pager));
            context.insert("error", &Option::<String>::None);
        }
        Err(e) => {
            let pager = CommentPager {
                limit: query.limit,
                offset: query.offset,
                total: 0,
                order_by: query.order_by,
            };
            context.insert("rows", &Vec::<CommentRow>::new());
            context.insert("pager", &PagerView::new(&forum_id, &pager));
            context.insert("error", &e.user_message());
        }
    }

    Ok(render(&state, "comments.html", &context)?.into_response())
}

// ============================================================================
// Create / edit
// ============================================================================

fn comment_form_page(
    state: &AppState,
    flash: IncomingFlash,
    target: FormTarget,
    values: &CommentInput,
    errors: &ValidationErrors,
    error: Option<&str>,
) -> Result<Response, WebError> {
    let mut context = form_context(flash, true, values, errors, error);
    context.insert("target", &target);
    Ok(render(state, "comment_form.html", &context)?.into_response())
}

pub async fn new_form(
    State(state): State<AppState>,
    Path(forum_id): Path<String>,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    comment_form_page(
        &state,
        flash,
        FormTarget::create(&forum_id),
        &CommentInput::default(),
        &ValidationErrors::default(),
        None,
    )
}

pub async fn create(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Path(forum_id): Path<String>,
    Form(input): Form<CommentInput>,
) -> Result<Response, WebError> {
    match state.comment_service.create(&token, &forum_id, &input).await {
        Ok(_) => Ok(with_effects(
            Redirect::to(&comments_path(&forum_id)),
            None,
            Some(Flash::success(messages::COMMENT_CREATED).with_description(messages::COMMENT_CREATED_DETAIL)),
        )),
        Err(e) => {
            let (errors, error) = form_failure(e)?;
            comment_form_page(
                &state,
                IncomingFlash::default(),
                FormTarget::create(&forum_id),
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
    Path((forum_id, comment_id)): Path<(String, String)>,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    match state.comment_service.get(&forum_id, &comment_id).await {
        Ok(comment) => comment_form_page(
            &state,
            flash,
            FormTarget::edit(&forum_id, &comment_id),
            &CommentInput {
                message: comment.message,
            },
            &ValidationErrors::default(),
            None,
        ),
        Err(e) => redirect_with_error(&comments_path(&forum_id), e),
    }
}

pub async fn update(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Path((forum_id, comment_id)): Path<(String, String)>,
    Form(input): Form<CommentInput>,
) -> Result<Response, WebError> {
    match state
        .comment_service
        .update(&token, &forum_id, &comment_id, &input)
        .await
    {
        Ok(_) => Ok(with_effects(
            Redirect::to(&comments_path(&forum_id)),
            None,
            Some(Flash::success(messages::COMMENT_UPDATED).with_description(messages::COMMENT_UPDATED_DETAIL)),
        )),
        Err(e) => {
            let (errors, error) = form_failure(e)?;
            comment_form_page(
                &state,
                IncomingFlash::default(),
                FormTarget::edit(&forum_id, &comment_id),
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
    Path((forum_id, comment_id)): Path<(String, String)>,
    flash: IncomingFlash,
) -> Result<Response, WebError> {
    match state.comment_service.get(&forum_id, &comment_id).await {
        Ok(comment) => {
            let mut context = page_context(flash, true);
            context.insert("comment", &comment);
            context.insert("author", &comment.user.full_name());
            context.insert("action", &format!("{}/delete", comment_path(&forum_id, &comment_id)));
            context.insert("cancel", &comments_path(&forum_id));
            Ok(render(&state, "comment_delete.html", &context)?.into_response())
        }
        Err(e) => redirect_with_error(&comments_path(&forum_id), e),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    Path((forum_id, comment_id)): Path<(String, String)>,
) -> Result<Response, WebError> {
    match state.comment_service.delete(&token, &forum_id, &comment_id).await {
        Ok(()) => Ok(with_effects(
            Redirect::to(&comments_path(&forum_id)),
            None,
            Some(Flash::success(messages::COMMENT_DELETED).with_description(messages::COMMENT_DELETED_DETAIL)),
        )),
        Err(e) => redirect_with_error(&comments_path(&forum_id), e),
    }
}
