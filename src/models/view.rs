//! View models for the search and details pages.

use serde::Serialize;
use utoipa::ToSchema;

use super::github::{GitHubRepo, GitHubUser};

/// Path the details page links back to.
pub const SEARCH_PATH: &str = "/";

/// Render state of one data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState<T> {
    Loading,
    Error { message: String },
    Empty,
    Ready { data: T },
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// Profile header shown on the details page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCard {
    pub display_name: String,
    pub profile: GitHubUser,
}

impl From<GitHubUser> for UserCard {
    fn from(profile: GitHubUser) -> Self {
        Self {
            display_name: profile.display_name().to_string(),
            profile,
        }
    }
}

/// One repository card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoCard {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub fork: bool,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub updated_at: String,
    /// First few topics only.
    pub topics: Vec<String>,
}

impl From<&GitHubRepo> for RepoCard {
    fn from(repo: &GitHubRepo) -> Self {
        Self {
            id: repo.id,
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            html_url: repo.html_url.clone(),
            description: repo.description.clone(),
            language: repo.language.clone(),
            fork: repo.fork,
            stargazers_count: repo.stargazers_count,
            forks_count: repo.forks_count,
            updated_at: repo.updated_at.clone(),
            topics: repo.display_topics().to_vec(),
        }
    }
}

/// Combined state of the details page.
///
/// Each source resolves independently; `loading` is true while either is
/// still pending.
#[derive(Debug, Clone, Serialize)]
pub struct DetailsView {
    pub username: String,
    pub loading: bool,
    pub user: ViewState<UserCard>,
    pub repositories: ViewState<Vec<RepoCard>>,
    pub search_path: &'static str,
}

impl DetailsView {
    /// Both sources pending.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            loading: true,
            user: ViewState::Loading,
            repositories: ViewState::Loading,
            search_path: SEARCH_PATH,
        }
    }

    pub fn resolve_user(&mut self, result: Result<GitHubUser, String>) {
        self.user = match result {
            Ok(user) => ViewState::Ready { data: user.into() },
            Err(message) => ViewState::Error { message },
        };
        self.refresh_loading();
    }

    pub fn resolve_repositories(&mut self, result: Result<&[GitHubRepo], String>) {
        self.repositories = match result {
            Ok([]) => ViewState::Empty,
            Ok(repos) => ViewState::Ready {
                data: repos.iter().map(RepoCard::from).collect(),
            },
            Err(message) => ViewState::Error { message },
        };
        self.refresh_loading();
    }

    fn refresh_loading(&mut self) {
        self.loading = self.user.is_loading() || self.repositories.is_loading();
    }
}

/// Result of parsing the search box.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResponse {
    pub username: String,
    pub details_path: String,
}
