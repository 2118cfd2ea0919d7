//! Comment service
//!
//! Implements the comment screens of a forum:
//! - Paginated comment list (limit / offset / order)
//! - Comment create, edit and delete
//!
//! Pagination follows the backend's offset model. The previous page starts
//! at `max(offset - limit, 0)` and does not exist at offset 0; the next page
//! starts at `offset + limit` and does not exist once that reaches `total`.

use std::sync::Arc;

use serde::Deserialize;

use super::messages::*;
use super::validation::validate_comment;
use super::{ServiceResult, SessionToken, StatusMessages};
use crate::backend::ForumBackend;
use crate::config::COMMENT_PAGE_SIZES;
use crate::models::{Comment, CommentInput, CommentOrder, CommentQuery};

const LIST: StatusMessages =
    StatusMessages::new(&[(400, INVALID_INPUT), (404, FORUM_NOT_FOUND)]).public();
const GET: StatusMessages = StatusMessages::new(&[(404, COMMENT_NOT_FOUND)])
    .public()
    .fallback(PROFILE_LOAD_FAILED);
const CREATE: StatusMessages =
    StatusMessages::new(&[(400, INVALID_INPUT), (404, FORUM_NOT_FOUND)]);
const UPDATE: StatusMessages =
    StatusMessages::new(&[(400, INVALID_INPUT), (404, COMMENT_NOT_FOUND)]).server_first();
const DELETE: StatusMessages = StatusMessages::new(&[]).server_first();

/// Pagination controls as submitted by the browser.
///
/// Values arrive as raw strings; anything unparsable falls back to the
/// defaults instead of failing the page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListParams {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub order_by: Option<String>,
    /// Page size the browser was showing before this request
    #[serde(default)]
    pub current_limit: Option<String>,
}

impl CommentListParams {
    /// Resolve into a backend query. A changed page size restarts at offset 0.
    pub fn to_query(&self, default_limit: u32) -> CommentQuery {
        let parse_limit = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| COMMENT_PAGE_SIZES.contains(v))
        };

        let limit = parse_limit(&self.limit).unwrap_or(default_limit);
        let offset = self
            .offset
            .as_deref()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let order_by = self
            .order_by
            .as_deref()
            .and_then(|v| v.parse::<CommentOrder>().ok())
            .unwrap_or_default();

        let page_size_changed = parse_limit(&self.current_limit).is_some_and(|current| current != limit);

        CommentQuery {
            limit,
            offset: if page_size_changed { 0 } else { offset },
            order_by,
        }
    }
}

/// Position of the shown page within all comments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPager {
    pub limit: u32,
    pub offset: u64,
    pub total: u64,
    pub order_by: CommentOrder,
}

impl CommentPager {
    pub fn previous_offset(&self) -> Option<u64> {
        if self.offset == 0 {
            None
        } else {
            Some(self.offset.saturating_sub(u64::from(self.limit)))
        }
    }

    pub fn next_offset(&self) -> Option<u64> {
        let next = self.offset.saturating_add(u64::from(self.limit));
        if next >= self.total {
            None
        } else {
            Some(next)
        }
    }

    /// 1-based number of the shown page
    pub fn page(&self) -> u64 {
        self.offset / u64::from(self.limit.max(1)) + 1
    }

    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1))).max(1)
    }

    /// Query string of the list at `offset`, keeping size and order
    pub fn query_string(&self, offset: u64) -> String {
        format!(
            "limit={}&offset={}&orderBy={}",
            self.limit, offset, self.order_by
        )
    }
}

/// One page of a forum's comments
#[derive(Debug, Clone)]
pub struct CommentListing {
    pub comments: Vec<Comment>,
    pub pager: CommentPager,
}

/// Comment service for the comment screens
pub struct CommentService {
    backend: Arc<dyn ForumBackend>,
}

impl CommentService {
    pub fn new(backend: Arc<dyn ForumBackend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, forum_id: &str, query: &CommentQuery) -> ServiceResult<CommentListing> {
        let page = self
            .backend
            .list_comments(forum_id, query)
            .await
            .map_err(|e| LIST.map(e))?;

        tracing::debug!(forum_id, total = page.total, "Comments listed");
        Ok(CommentListing {
            comments: page.comments,
            pager: CommentPager {
                limit: query.limit,
                offset: query.offset,
                total: page.total,
                order_by: query.order_by,
            },
        })
    }

    pub async fn get(&self, forum_id: &str, comment_id: &str) -> ServiceResult<Comment> {
        self.backend
            .get_comment(forum_id, comment_id)
            .await
            .map_err(|e| GET.map(e))
    }

    pub async fn create(&self, token: &SessionToken, forum_id: &str, input: &CommentInput) -> ServiceResult<Comment> {
        validate_comment(input)?;

        let comment = self
            .backend
            .create_comment(token.as_str(), forum_id, input)
            .await
            .map_err(|e| CREATE.map(e))?;

        tracing::info!(forum_id, comment_id = %comment.id, "Comment created");
        Ok(comment)
    }

    pub async fn update(
        &self,
        token: &SessionToken,
        forum_id: &str,
        comment_id: &str,
        input: &CommentInput,
    ) -> ServiceResult<Comment> {
        validate_comment(input)?;

        let comment = self
            .backend
            .update_comment(token.as_str(), forum_id, comment_id, input)
            .await
            .map_err(|e| UPDATE.map(e))?;

        tracing::info!(forum_id, comment_id, "Comment updated");
        Ok(comment)
    }

    pub async fn delete(&self, token: &SessionToken, forum_id: &str, comment_id: &str) -> ServiceResult<()> {
        self.backend
            .delete_comment(token.as_str(), forum_id, comment_id)
            .await
            .map_err(|e| DELETE.map(e))?;

        tracing::info!(forum_id, comment_id, "Comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{FakeBackend, ANNA_TOKEN, BELA_TOKEN};
    use crate::services::ServiceError;

    fn setup() -> (Arc<FakeBackend>, CommentService) {
        let backend = Arc::new(FakeBackend::new());
        let service = CommentService::new(backend.clone());
        (backend, service)
    }

    fn token(value: &str) -> SessionToken {
        SessionToken::new(value).unwrap()
    }

    fn params(limit: &str, offset: &str, order: &str, current: Option<&str>) -> CommentListParams {
        CommentListParams {
            limit: Some(limit.to_string()),
            offset: Some(offset.to_string()),
            order_by: Some(order.to_string()),
            current_limit: current.map(str::to_string),
        }
    }

    fn pager(limit: u32, offset: u64, total: u64) -> CommentPager {
        CommentPager {
            limit,
            offset,
            total,
            order_by: CommentOrder::Desc,
        }
    }

    #[test]
    fn test_params_defaults() {
        let query = CommentListParams::default().to_query(20);
        assert_eq!(query, CommentQuery::new(20));
    }

    #[test]
    fn test_params_unknown_values_fall_back() {
        let query = params("7", "abc", "sideways", None).to_query(10);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 0);
        assert_eq!(query.order_by, CommentOrder::Desc);
    }

    #[test]
    fn test_page_size_change_resets_offset() {
        let query = params("50", "40", "ASC", Some("20")).to_query(20);
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
        assert_eq!(query.order_by, CommentOrder::Asc);
    }

    #[test]
    fn test_order_change_keeps_offset() {
        let query = params("20", "40", "ASC", Some("20")).to_query(20);
        assert_eq!(query.offset, 40);
    }

    #[test]
    fn test_pager_boundaries() {
        let first = pager(20, 0, 45);
        assert_eq!(first.previous_offset(), None);
        assert_eq!(first.next_offset(), Some(20));
        assert_eq!(first.page(), 1);
        assert_eq!(first.page_count(), 3);

        let last = pager(20, 40, 45);
        assert_eq!(last.previous_offset(), Some(20));
        assert_eq!(last.next_offset(), None);

        let odd = pager(20, 5, 45);
        assert_eq!(odd.previous_offset(), Some(0));

        let empty = pager(20, 0, 0);
        assert_eq!(empty.next_offset(), None);
        assert_eq!(empty.page_count(), 1);
    }

    #[test]
    fn test_pager_query_string() {
        assert_eq!(pager(10, 0, 100).query_string(30), "limit=10&offset=30&orderBy=DESC");
    }

    #[tokio::test]
    async fn test_list_sends_query_and_builds_pager() {
        let (backend, service) = setup();
        let forum_id = backend.add_forum(ANNA_TOKEN, "Rust");
        backend.add_comments(&forum_id, ANNA_TOKEN, 25);
        let query = CommentQuery {
            limit: 10,
            offset: 20,
            order_by: CommentOrder::Asc,
        };

        let listing = service.list(&forum_id, &query).await.unwrap();

        assert_eq!(listing.comments.len(), 5);
        assert_eq!(listing.comments[0].message, "Hozzászólás 21");
        assert_eq!(listing.pager.total, 25);
        assert_eq!(listing.pager.next_offset(), None);
        assert_eq!(listing.pager.previous_offset(), Some(10));
        assert_eq!(backend.last_comment_query(), Some(query));
    }

    #[tokio::test]
    async fn test_list_missing_forum() {
        let (_, service) = setup();

        let err = service.list("nincs", &CommentQuery::default()).await.unwrap_err();
        assert_eq!(err, ServiceError::Rejected(FORUM_NOT_FOUND.to_string()));
    }

    #[tokio::test]
    async fn test_create_validates_then_posts() {
        let (backend, service) = setup();
        let forum_id = backend.add_forum(ANNA_TOKEN, "Rust");

        let err = service
            .create(&token(ANNA_TOKEN), &forum_id, &CommentInput { message: " ".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert!(backend.comments(&forum_id).is_empty());

        let comment = service
            .create(&token(BELA_TOKEN), &forum_id, &CommentInput { message: "Szia!".to_string() })
            .await
            .unwrap();
        assert_eq!(comment.user.first_name, "Béla");
        assert_eq!(backend.comments(&forum_id).len(), 1);
    }

    #[tokio::test]
    async fn test_create_with_stale_token_ends_session() {
        let (backend, service) = setup();
        let forum_id = backend.add_forum(ANNA_TOKEN, "Rust");

        let err = service
            .create(&token("tok-old"), &forum_id, &CommentInput { message: "Szia!".to_string() })
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Unauthorized);
    }

    #[tokio::test]
    async fn test_update_comment() {
        let (backend, service) = setup();
        let forum_id = backend.add_forum(ANNA_TOKEN, "Rust");
        let ids = backend.add_comments(&forum_id, ANNA_TOKEN, 1);
        let input = CommentInput {
            message: "Javítva".to_string(),
        };

        let comment = service.update(&token(ANNA_TOKEN), &forum_id, &ids[0], &input).await.unwrap();
        assert_eq!(comment.message, "Javítva");
        assert_eq!(service.get(&forum_id, &ids[0]).await.unwrap().message, "Javítva");
    }

    #[tokio::test]
    async fn test_delete_uses_server_message() {
        let (backend, service) = setup();
        let forum_id = backend.add_forum(ANNA_TOKEN, "Rust");
        let ids = backend.add_comments(&forum_id, ANNA_TOKEN, 1);

        let err = service.delete(&token(BELA_TOKEN), &forum_id, &ids[0]).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected("Csak a saját hozzászólásodat törölheted.".to_string())
        );

        service.delete(&token(ANNA_TOKEN), &forum_id, &ids[0]).await.unwrap();
        assert!(backend.comments(&forum_id).is_empty());
    }
}
