//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Comment posted under a forum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub user: User,
}

/// Body of comment create and update calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentInput {
    pub message: String,
}

/// One page of comments plus the total count
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub total: u64,
}

/// Comment ordering by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommentOrder {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl CommentOrder {
    pub const ALL: [CommentOrder; 2] = [CommentOrder::Asc, CommentOrder::Desc];

    /// Label shown in the order selector
    pub fn label(&self) -> &'static str {
        match self {
            Self::Asc => "Legrégebbi legelől",
            Self::Desc => "Legújabb legelől",
        }
    }
}

impl std::fmt::Display for CommentOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

impl std::str::FromStr for CommentOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(format!("Invalid comment order: {}", s)),
        }
    }
}

/// Query of `GET /forum/:id/comments`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentQuery {
    pub limit: u32,
    pub offset: u64,
    pub order_by: CommentOrder,
}

impl CommentQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            offset: 0,
            order_by: CommentOrder::default(),
        }
    }

    /// Query parameters in the order the backend documents them
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
            ("orderBy", self.order_by.to_string()),
        ]
    }
}

impl Default for CommentQuery {
    fn default() -> Self {
        Self::new(20)
    }
}
