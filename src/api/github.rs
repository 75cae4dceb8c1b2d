//! GitHub procedure endpoints.
//!
//! `getUser` and `getUserRepos` are exposed as two independent GET routes.
//! Input is validated here before any lookup, and failures are narrowed to
//! the fixed user-facing messages.

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use crate::error::{AppError, AppResult, Procedure};
use crate::services::github_client::{RepoQuery, validate_username};
use crate::services::query_cache::GitHubQueries;

/// Raw repository listing query. Parsed by [`RepoQuery::parse`] so bad values
/// come back as structured `INVALID_INPUT` errors.
#[derive(Debug, Deserialize)]
pub struct RepoListParams {
    pub sort: Option<String>,
    pub per_page: Option<String>,
}

/// Configure GitHub procedure routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Specific paths first
    cfg.service(get_user_repos).service(get_user);
}

/// Fetch a user's public profile.
///
/// GET /github/users/{username}
#[utoipa::path(
    get,
    path = "/api/v1/github/users/{username}",
    tag = "GitHub",
    params(
        ("username" = String, Path, description = "GitHub login")
    ),
    responses(
        (status = 200, description = "User profile", body = crate::models::GitHubUser),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Failed to fetch user data", body = crate::error::ErrorResponse)
    )
)]
#[get("/github/users/{username}")]
pub async fn get_user(
    queries: web::Data<GitHubQueries>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let procedure = Procedure::GetUser;
    validate_username(&username).map_err(|e| AppError::from_fetch(e, procedure))?;

    let user = queries
        .user(&username)
        .await
        .map_err(|e| AppError::from_fetch(e, procedure))?;

    Ok(HttpResponse::Ok().json(&*user))
}

/// Fetch a page of a user's repositories.
///
/// GET /github/users/{username}/repos?sort=updated&per_page=6
#[utoipa::path(
    get,
    path = "/api/v1/github/users/{username}/repos",
    tag = "GitHub",
    params(
        ("username" = String, Path, description = "GitHub login"),
        ("sort" = Option<String>, Query, description = "created, updated, pushed or full_name (default: updated)"),
        ("per_page" = Option<u32>, Query, description = "Page size, 1-100 (default: 6)")
    ),
    responses(
        (status = 200, description = "Repositories in upstream order", body = Vec<crate::models::GitHubRepo>),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Failed to fetch repositories", body = crate::error::ErrorResponse)
    )
)]
#[get("/github/users/{username}/repos")]
pub async fn get_user_repos(
    queries: web::Data<GitHubQueries>,
    path: web::Path<String>,
    params: web::Query<RepoListParams>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let procedure = Procedure::GetUserRepos;
    validate_username(&username).map_err(|e| AppError::from_fetch(e, procedure))?;
    let query = RepoQuery::parse(params.sort.as_deref(), params.per_page.as_deref())
        .map_err(|e| AppError::from_fetch(e, procedure))?;

    let repos = queries
        .user_repos(&username, query)
        .await
        .map_err(|e| AppError::from_fetch(e, procedure))?;

    Ok(HttpResponse::Ok().json(&*repos))
}
