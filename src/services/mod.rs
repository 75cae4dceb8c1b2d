//! Business logic services.

pub mod details;
pub mod github_client;
pub mod query_cache;
pub mod search;

pub use details::load_details;
pub use github_client::{
    FetchError, FetchFailure, GitHubClient, GitHubClientConfig, RepoQuery, ReqwestTransport,
    Transport,
};
pub use query_cache::{CachePolicy, GitHubQueries, start_cache_sweeper};
pub use search::{details_path, extract_username};
