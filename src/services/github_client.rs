//! Read-only client for the public GitHub REST API.
//!
//! The client owns no global state: the base URL, headers, and timeouts live in
//! an explicitly constructed [`GitHubClientConfig`], and the HTTP round trip is
//! delegated to a [`Transport`] so tests can substitute a fake.
//!
//! Outcomes are narrowed to a small taxonomy:
//! - `InvalidInput`: rejected before any network call
//! - `UserNotFound`: upstream answered 404
//! - `FetchFailed`: any other status, transport error, undecodable body, or a
//!   body that does not match the record schema

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::models::{GitHubRepo, GitHubUser, RepoSort, SchemaError};

/// Media type requesting the stable v3 API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Client identification sent with every request.
pub const DEFAULT_USER_AGENT: &str = "github-explorer-server";

/// Public API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repositories per page when the caller does not choose.
pub const DEFAULT_PAGE_SIZE: u8 = 6;

/// Largest page GitHub serves.
pub const MAX_PAGE_SIZE: u8 = 100;

/// HTTP connect timeout for GitHub API calls.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP total timeout for GitHub API calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Upstream connection settings.
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl GitHubClientConfig {
    /// Settings with default headers and timeouts against `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A fully resolved GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

/// Raw upstream response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Performs a single HTTP GET.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &UpstreamRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &GitHubClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &UpstreamRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.http.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(format!("failed to read body: {}", e)))?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Why a fetch failed. Never shown to end users.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchFailure {
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    #[error("response does not match schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("cannot build request URL from base {0}")]
    BadBaseUrl(String),

    #[error("fetch task ended abnormally: {0}")]
    Task(String),
}

impl FetchFailure {
    /// Short label used as a structured log field.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchFailure::Status(_) => "status",
            FetchFailure::Transport(_) => "transport",
            FetchFailure::Decode(_) => "decode",
            FetchFailure::Schema(_) => "schema",
            FetchFailure::BadBaseUrl(_) => "config",
            FetchFailure::Task(_) => "task",
        }
    }
}

/// Fetch client error taxonomy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("user not found")]
    UserNotFound,

    #[error("fetch failed: {0}")]
    FetchFailed(#[from] FetchFailure),
}

impl FetchError {
    /// Only generic failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::FetchFailed(_))
    }
}

/// Reject a username that cannot name a user before any network call.
///
/// `.` and `..` would be collapsed by URL path normalization and address a
/// different endpoint, so they are refused here.
pub fn validate_username(username: &str) -> Result<&str, FetchError> {
    if username.trim().is_empty() {
        return Err(FetchError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }
    if username == "." || username == ".." {
        return Err(FetchError::InvalidInput(format!(
            "'{}' is not a valid GitHub username",
            username
        )));
    }
    Ok(username)
}

/// Validated repository listing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepoQuery {
    sort: RepoSort,
    per_page: u8,
}

impl Default for RepoQuery {
    fn default() -> Self {
        Self {
            sort: RepoSort::default(),
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RepoQuery {
    /// Apply defaults and check the page size range.
    pub fn new(sort: Option<RepoSort>, per_page: Option<u32>) -> Result<Self, FetchError> {
        let per_page = match per_page {
            None => DEFAULT_PAGE_SIZE,
            Some(n) if (1..=u32::from(MAX_PAGE_SIZE)).contains(&n) => n as u8,
            Some(n) => {
                return Err(FetchError::InvalidInput(format!(
                    "per_page must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, n
                )));
            }
        };

        Ok(Self {
            sort: sort.unwrap_or_default(),
            per_page,
        })
    }

    /// Parse raw query-string values.
    pub fn parse(sort: Option<&str>, per_page: Option<&str>) -> Result<Self, FetchError> {
        let sort = sort
            .map(|s| {
                RepoSort::parse(s).ok_or_else(|| {
                    FetchError::InvalidInput(format!(
                        "sort must be one of created, updated, pushed, full_name; got '{}'",
                        s
                    ))
                })
            })
            .transpose()?;

        let per_page = per_page
            .map(|p| {
                p.trim().parse::<u32>().map_err(|_| {
                    FetchError::InvalidInput(format!("per_page must be a number, got '{}'", p))
                })
            })
            .transpose()?;

        Self::new(sort, per_page)
    }

    pub fn sort(&self) -> RepoSort {
        self.sort
    }

    pub fn per_page(&self) -> u8 {
        self.per_page
    }
}

/// GitHub REST client.
#[derive(Clone)]
pub struct GitHubClient {
    config: Arc<GitHubClientConfig>,
    transport: Arc<dyn Transport>,
}

impl GitHubClient {
    pub fn new(config: GitHubClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Client using the `reqwest` transport.
    pub fn with_reqwest(config: GitHubClientConfig) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &GitHubClientConfig {
        &self.config
    }

    /// Fetch a user profile by login.
    pub async fn fetch_user(&self, username: &str) -> Result<GitHubUser, FetchError> {
        let username = validate_username(username)?;
        let url = self.endpoint(&["users", username])?;

        let body = self.get_json(url).await?;
        let user = GitHubUser::from_json(body).map_err(FetchFailure::Schema)?;
        Ok(user)
    }

    /// Fetch a page of a user's repositories in upstream order.
    pub async fn fetch_user_repos(
        &self,
        username: &str,
        query: RepoQuery,
    ) -> Result<Vec<GitHubRepo>, FetchError> {
        let username = validate_username(username)?;
        let mut url = self.endpoint(&["users", username, "repos"])?;
        url.query_pairs_mut()
            .append_pair("sort", query.sort.as_str())
            .append_pair("per_page", &query.per_page.to_string());

        let body = self.get_json(url).await?;
        let repos = GitHubRepo::list_from_json(body).map_err(FetchFailure::Schema)?;
        Ok(repos)
    }

    /// Append path segments to the base URL. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchFailure> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchFailure::BadBaseUrl(self.config.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Accept", GITHUB_ACCEPT.to_string()),
            ("User-Agent", self.config.user_agent.clone()),
        ]
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        let request = UpstreamRequest {
            url,
            headers: self.headers(),
        };

        debug!(url = %request.url, "GitHub API request");

        let response = self
            .transport
            .get(&request)
            .await
            .map_err(|e| FetchFailure::Transport(e.0))?;

        match response.status {
            404 => Err(FetchError::UserNotFound),
            status if !(200..300).contains(&status) => {
                debug!(url = %request.url, status, "GitHub API returned non-success status");
                Err(FetchFailure::Status(status).into())
            }
            _ => serde_json::from_slice(&response.body)
                .map_err(|e| FetchFailure::Decode(e.to_string()).into()),
        }
    }
}
