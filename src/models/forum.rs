//! Forum model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Comment, User};

/// Forum (discussion thread) as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forum {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: User,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub last_comment: Option<Comment>,
}

impl Forum {
    /// Whether the given user created this forum
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.created_by.user_id == user_id
    }
}

/// Body of forum create and update calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumInput {
    pub title: String,
    pub description: String,
}

impl From<&Forum> for ForumInput {
    fn from(forum: &Forum) -> Self {
        Self {
            title: forum.title.clone(),
            description: forum.description.clone(),
        }
    }
}

/// Forum list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForumOrder {
    #[default]
    DateDesc,
    DateAsc,
    NameAsc,
    NameDesc,
}

impl ForumOrder {
    pub const ALL: [ForumOrder; 4] = [
        ForumOrder::DateDesc,
        ForumOrder::DateAsc,
        ForumOrder::NameAsc,
        ForumOrder::NameDesc,
    ];

    /// Label shown in the order selector
    pub fn label(&self) -> &'static str {
        match self {
            Self::DateDesc => "Legfrissebb legelöl",
            Self::DateAsc => "Legrégebbi legelöl",
            Self::NameAsc => "Név szerint A-Z",
            Self::NameDesc => "Név szerint Z-A",
        }
    }
}

impl std::fmt::Display for ForumOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateDesc => write!(f, "date.DESC"),
            Self::DateAsc => write!(f, "date.ASC"),
            Self::NameAsc => write!(f, "name.ASC"),
            Self::NameDesc => write!(f, "name.DESC"),
        }
    }
}

impl std::str::FromStr for ForumOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date.DESC" => Ok(Self::DateDesc),
            "date.ASC" => Ok(Self::DateAsc),
            "name.ASC" => Ok(Self::NameAsc),
            "name.DESC" => Ok(Self::NameDesc),
            _ => Err(format!("Invalid forum order: {}", s)),
        }
    }
}

/// Search, filter and sort parameters of the forum list
///
/// Values are kept as the browser sent them and forwarded to the backend
/// untouched; empty values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub users_first: Option<String>,
    #[serde(default)]
    pub order_by: Option<String>,
}

impl ForumQuery {
    /// Non-empty parameters, in a stable order
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        [
            ("query", &self.query),
            ("after", &self.after),
            ("before", &self.before),
            ("usersFirst", &self.users_first),
            ("orderBy", &self.order_by),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }

    /// Whether the "own forums only" toggle is on
    pub fn own_forums_only(&self) -> bool {
        self.users_first.as_deref() == Some("true")
    }

    /// Selected ordering, falling back to newest first
    pub fn order(&self) -> ForumOrder {
        self.order_by
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Copy of this query with the "own forums only" toggle flipped
    pub fn toggled_own_forums(&self) -> Self {
        let mut next = self.clone();
        next.users_first = if self.own_forums_only() {
            None
        } else {
            Some("true".to_string())
        };
        next
    }

    /// URL-encoded query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        self.to_params()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
