//! Data models
//!
//! This module contains the data structures exchanged with the forum backend:
//! - Entities mirrored from the backend (User, Forum, Comment)
//! - Request payloads for account, forum and comment operations
//! - List queries (forum search/sort, comment pagination)

mod comment;
mod forum;
mod user;

pub use comment::{Comment, CommentInput, CommentOrder, CommentPage, CommentQuery};
pub use forum::{Forum, ForumInput, ForumOrder, ForumQuery};
pub use user::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest, User,
};
