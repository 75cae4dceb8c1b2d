//! GitHub user and repository records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::schema::{REPO_SCHEMA, SchemaError, USER_SCHEMA};

/// Number of topics shown per repository card.
pub const DISPLAY_TOPIC_LIMIT: usize = 3;

/// Public GitHub account profile.
///
/// Nullable upstream fields are `None` when GitHub sent `null`; an empty
/// string stays `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub twitter_username: Option<String>,
    pub public_repos: u64,
    pub public_gists: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl GitHubUser {
    /// Validate an upstream payload and convert it.
    pub fn from_json(value: Value) -> Result<Self, SchemaError> {
        USER_SCHEMA.parse(value)
    }

    /// Name to show in headings; falls back to the login.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.login,
        }
    }
}

/// One repository owned by (or forked to) a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: String,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub language: Option<String>,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub topics: Vec<String>,
}

impl GitHubRepo {
    /// Validate an upstream array payload and convert every element.
    pub fn list_from_json(value: Value) -> Result<Vec<Self>, SchemaError> {
        REPO_SCHEMA.parse_list(value)
    }

    /// Topics shown on a repository card.
    pub fn display_topics(&self) -> &[String] {
        &self.topics[..self.topics.len().min(DISPLAY_TOPIC_LIMIT)]
    }
}

/// Sort order accepted by the repository listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RepoSort {
    Created,
    #[default]
    Updated,
    Pushed,
    FullName,
}

impl RepoSort {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "pushed" => Some(Self::Pushed),
            "full_name" => Some(Self::FullName),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Pushed => "pushed",
            Self::FullName => "full_name",
        }
    }
}

impl std::fmt::Display for RepoSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
