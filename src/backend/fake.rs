//! In-memory forum backend for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{BackendError, BackendResult, ForumBackend};
use crate::models::{
    ChangePasswordRequest, Comment, CommentInput, CommentOrder, CommentPage, CommentQuery, Forum,
    ForumInput, ForumOrder, ForumQuery, LoginRequest, RegisterRequest, TokenResponse,
    UpdateUserRequest, User,
};

pub(crate) const ANNA_EMAIL: &str = "anna@example.hu";
pub(crate) const ANNA_PASSWORD: &str = "jelszo123";
pub(crate) const ANNA_TOKEN: &str = "tok-anna";
pub(crate) const BELA_TOKEN: &str = "tok-bela";

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct FakeState {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    forums: Vec<Forum>,
    comments: HashMap<String, Vec<Comment>>,
    failures: HashMap<&'static str, BackendError>,
    calls: Vec<&'static str>,
    last_forum_query: Option<ForumQuery>,
    last_comment_query: Option<CommentQuery>,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn timestamp(&self) -> DateTime<Utc> {
        let base = Utc.with_ymd_and_hms(2024, 5, 12, 14, 0, 0).unwrap();
        base + Duration::minutes(self.next_id as i64)
    }

    fn user_for(&self, token: &str) -> BackendResult<User> {
        let user_id = self.tokens.get(token).ok_or_else(unauthorized)?;
        self.accounts
            .iter()
            .find(|a| &a.user.user_id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(unauthorized)
    }

    fn issue_token(&mut self, user_id: &str) -> TokenResponse {
        let token = self.next_id("tok-");
        self.tokens.insert(token.clone(), user_id.to_string());
        TokenResponse { access_token: token }
    }

    fn forum_index(&self, forum_id: &str) -> BackendResult<usize> {
        self.forums
            .iter()
            .position(|f| f.id == forum_id)
            .ok_or_else(|| status(404, "Forum not found"))
    }
}

fn unauthorized() -> BackendError {
    BackendError::Status {
        status: 401,
        message: None,
    }
}

pub(crate) fn status(status: u16, message: &str) -> BackendError {
    BackendError::Status {
        status,
        message: Some(message.to_string()),
    }
}

/// Backend double holding users, forums and comments in memory.
///
/// Two accounts exist from the start: Anna (`tok-anna`) and Béla
/// (`tok-bela`). Any operation can be forced to fail with [`FakeBackend::fail`].
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        let mut state = FakeState::default();
        for (id, email, password, first, last, token) in [
            ("u-anna", ANNA_EMAIL, ANNA_PASSWORD, "Anna", "Kovács", ANNA_TOKEN),
            ("u-bela", "bela@example.hu", "jelszo456", "Béla", "Nagy", BELA_TOKEN),
        ] {
            state.accounts.push(Account {
                user: User {
                    user_id: id.to_string(),
                    email: email.to_string(),
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    password: None,
                },
                password: password.to_string(),
            });
            state.tokens.insert(token.to_string(), id.to_string());
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Make every later call of `operation` fail with `error`
    pub(crate) fn fail(&self, operation: &'static str, error: BackendError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    /// Names of the operations called so far, in order
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn last_forum_query(&self) -> Option<ForumQuery> {
        self.state.lock().unwrap().last_forum_query.clone()
    }

    pub(crate) fn last_comment_query(&self) -> Option<CommentQuery> {
        self.state.lock().unwrap().last_comment_query
    }

    pub(crate) fn forums(&self) -> Vec<Forum> {
        self.state.lock().unwrap().forums.clone()
    }

    pub(crate) fn comments(&self, forum_id: &str) -> Vec<Comment> {
        self.state
            .lock()
            .unwrap()
            .comments
            .get(forum_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed a forum owned by the holder of `owner_token`
    pub(crate) fn add_forum(&self, owner_token: &str, title: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let owner = state.user_for(owner_token).unwrap();
        let id = state.next_id("f");
        let forum = Forum {
            id: id.clone(),
            title: title.to_string(),
            description: format!("{} leírása", title),
            created_at: state.timestamp(),
            created_by: owner,
            comments_count: 0,
            last_comment: None,
        };
        state.forums.push(forum);
        state.comments.insert(id.clone(), Vec::new());
        id
    }

    /// Seed `count` comments by the holder of `author_token`
    pub(crate) fn add_comments(&self, forum_id: &str, author_token: &str, count: usize) -> Vec<String> {
        let mut state = self.state.lock().unwrap();
        let author = state.user_for(author_token).unwrap();
        let mut ids = Vec::new();
        for n in 0..count {
            let id = state.next_id("c");
            let comment = Comment {
                id: id.clone(),
                message: format!("Hozzászólás {}", n + 1),
                created_at: state.timestamp(),
                user: author.clone(),
            };
            state.comments.entry(forum_id.to_string()).or_default().push(comment);
            ids.push(id);
        }
        ids
    }

    /// Record the call and return the forced failure, if one is set
    fn enter(&self, operation: &'static str) -> BackendResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        if let Some(error) = state.failures.get(operation).cloned() {
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl ForumBackend for FakeBackend {
    async fn login(&self, request: &LoginRequest) -> BackendResult<TokenResponse> {
        let mut state = self.enter("login")?;
        let user_id = state
            .accounts
            .iter()
            .find(|a| a.user.email == request.username && a.password == request.password)
            .map(|a| a.user.user_id.clone())
            .ok_or_else(|| status(401, "Invalid credentials"))?;
        Ok(state.issue_token(&user_id))
    }

    async fn register(&self, request: &RegisterRequest) -> BackendResult<TokenResponse> {
        let mut state = self.enter("register")?;
        if state.accounts.iter().any(|a| a.user.email == request.username) {
            return Err(status(409, "User already exists"));
        }
        let user_id = state.next_id("u");
        state.accounts.push(Account {
            user: User {
                user_id: user_id.clone(),
                email: request.username.clone(),
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                password: None,
            },
            password: request.password.clone(),
        });
        Ok(state.issue_token(&user_id))
    }

    async fn change_password(&self, token: &str, request: &ChangePasswordRequest) -> BackendResult<()> {
        let mut state = self.enter("change_password")?;
        let user = state.user_for(token)?;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.user.user_id == user.user_id)
            .ok_or_else(unauthorized)?;
        if account.password != request.old_password {
            return Err(status(400, "Old password is incorrect"));
        }
        if account.password == request.password {
            return Err(status(409, "Passwords are the same"));
        }
        account.password = request.password.clone();
        Ok(())
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        let state = self.enter("current_user")?;
        state.user_for(token)
    }

    async fn update_user(&self, token: &str, request: &UpdateUserRequest) -> BackendResult<User> {
        let mut state = self.enter("update_user")?;
        let user = state.user_for(token)?;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.user.user_id == user.user_id)
            .ok_or_else(unauthorized)?;
        account.user.first_name = request.first_name.clone();
        account.user.last_name = request.last_name.clone();
        Ok(account.user.clone())
    }

    async fn list_forums(&self, token: Option<&str>, query: &ForumQuery) -> BackendResult<Vec<Forum>> {
        let mut state = self.enter("list_forums")?;
        state.last_forum_query = Some(query.clone());
        if let Some(token) = token {
            state.user_for(token)?;
        }

        let needle = query.query.as_deref().unwrap_or("").to_lowercase();
        let mut forums: Vec<Forum> = state
            .forums
            .iter()
            .filter(|f| needle.is_empty() || f.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        match query.order() {
            ForumOrder::DateDesc => forums.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ForumOrder::DateAsc => forums.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ForumOrder::NameAsc => forums.sort_by(|a, b| a.title.cmp(&b.title)),
            ForumOrder::NameDesc => forums.sort_by(|a, b| b.title.cmp(&a.title)),
        }
        Ok(forums)
    }

    async fn get_forum(&self, token: Option<&str>, forum_id: &str) -> BackendResult<Forum> {
        let state = self.enter("get_forum")?;
        if let Some(token) = token {
            state.user_for(token)?;
        }
        let index = state.forum_index(forum_id)?;
        Ok(state.forums[index].clone())
    }

    async fn create_forum(&self, token: &str, input: &ForumInput) -> BackendResult<Forum> {
        let mut state = self.enter("create_forum")?;
        let owner = state.user_for(token)?;
        if state.forums.iter().any(|f| f.title == input.title) {
            return Err(status(409, "Forum already exists"));
        }
        let id = state.next_id("f");
        let forum = Forum {
            id: id.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            created_at: state.timestamp(),
            created_by: owner,
            comments_count: 0,
            last_comment: None,
        };
        state.forums.push(forum.clone());
        state.comments.insert(id, Vec::new());
        Ok(forum)
    }

    async fn update_forum(&self, token: &str, forum_id: &str, input: &ForumInput) -> BackendResult<Forum> {
        let mut state = self.enter("update_forum")?;
        let user = state.user_for(token)?;
        let index = state.forum_index(forum_id)?;
        if !state.forums[index].is_owned_by(&user.user_id) {
            return Err(status(403, "Forbidden"));
        }
        if state
            .forums
            .iter()
            .any(|f| f.id != forum_id && f.title == input.title)
        {
            return Err(status(409, "Forum already exists"));
        }
        let forum = &mut state.forums[index];
        forum.title = input.title.clone();
        forum.description = input.description.clone();
        Ok(forum.clone())
    }

    async fn delete_forum(&self, token: &str, forum_id: &str) -> BackendResult<()> {
        let mut state = self.enter("delete_forum")?;
        let user = state.user_for(token)?;
        let index = state.forum_index(forum_id)?;
        if !state.forums[index].is_owned_by(&user.user_id) {
            return Err(status(403, "Forbidden"));
        }
        state.forums.remove(index);
        state.comments.remove(forum_id);
        Ok(())
    }

    async fn list_comments(&self, forum_id: &str, query: &CommentQuery) -> BackendResult<CommentPage> {
        let mut state = self.enter("list_comments")?;
        state.last_comment_query = Some(*query);
        state.forum_index(forum_id)?;

        let mut comments = state.comments.get(forum_id).cloned().unwrap_or_default();
        if query.order_by == CommentOrder::Desc {
            comments.reverse();
        }
        let total = comments.len() as u64;
        let comments = comments
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(CommentPage { comments, total })
    }

    async fn get_comment(&self, forum_id: &str, comment_id: &str) -> BackendResult<Comment> {
        let state = self.enter("get_comment")?;
        state
            .comments
            .get(forum_id)
            .and_then(|comments| comments.iter().find(|c| c.id == comment_id))
            .cloned()
            .ok_or_else(|| status(404, "Comment not found"))
    }

    async fn create_comment(&self, token: &str, forum_id: &str, input: &CommentInput) -> BackendResult<Comment> {
        let mut state = self.enter("create_comment")?;
        let user = state.user_for(token)?;
        let index = state.forum_index(forum_id)?;
        let comment = Comment {
            id: state.next_id("c"),
            message: input.message.clone(),
            created_at: state.timestamp(),
            user,
        };
        state.forums[index].comments_count += 1;
        state.forums[index].last_comment = Some(comment.clone());
        state
            .comments
            .entry(forum_id.to_string())
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        token: &str,
        forum_id: &str,
        comment_id: &str,
        input: &CommentInput,
    ) -> BackendResult<Comment> {
        let mut state = self.enter("update_comment")?;
        let user = state.user_for(token)?;
        let comment = state
            .comments
            .get_mut(forum_id)
            .and_then(|comments| comments.iter_mut().find(|c| c.id == comment_id))
            .ok_or_else(|| status(404, "Comment not found"))?;
        if comment.user.user_id != user.user_id {
            return Err(status(403, "Forbidden"));
        }
        comment.message = input.message.clone();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, token: &str, forum_id: &str, comment_id: &str) -> BackendResult<()> {
        let mut state = self.enter("delete_comment")?;
        let user = state.user_for(token)?;
        let comments = state
            .comments
            .get_mut(forum_id)
            .ok_or_else(|| status(404, "Forum not found"))?;
        let index = comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| status(404, "Comment not found"))?;
        if comments[index].user.user_id != user.user_id {
            return Err(status(403, "Csak a saját hozzászólásodat törölheted."));
        }
        comments.remove(index);
        Ok(())
    }
}
