//! Domain models for the GitHub explorer.

pub mod github;
pub mod schema;
pub mod view;

// Re-export commonly used types
pub use github::{DISPLAY_TOPIC_LIMIT, GitHubRepo, GitHubUser, RepoSort};
pub use schema::{REPO_SCHEMA, Schema, SchemaError, USER_SCHEMA};
pub use view::{DetailsView, RepoCard, SearchResponse, UserCard, ViewState};
