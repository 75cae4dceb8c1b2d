//! Search and details page endpoints.

use std::time::Duration;

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::SearchResponse;
use crate::services::details::load_details;
use crate::services::query_cache::GitHubQueries;
use crate::services::search::{details_path, extract_username};

/// Longest a details request may wait on upstream.
const MAX_WAIT_MS: u64 = 30_000;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsParams {
    /// Report sources still pending after this many milliseconds as loading.
    pub wait_ms: Option<u64>,
}

/// Configure view routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(search).service(details);
}

/// Resolve free text to a username.
///
/// GET /search?q=https://github.com/torvalds
#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "Views",
    params(
        ("q" = String, Query, description = "Username, @handle, or github.com URL")
    ),
    responses(
        (status = 200, description = "Username found", body = SearchResponse),
        (status = 400, description = "No valid username in input", body = crate::error::ErrorResponse)
    )
)]
#[get("/search")]
pub async fn search(params: web::Query<SearchParams>) -> AppResult<HttpResponse> {
    let username = params
        .q
        .as_deref()
        .and_then(extract_username)
        .ok_or_else(|| {
            AppError::InvalidInput("Please enter a valid GitHub username".to_string())
        })?;

    Ok(HttpResponse::Ok().json(SearchResponse {
        details_path: details_path(&username),
        username,
    }))
}

/// Profile and recent repositories for the details page.
///
/// GET /details/{username}?wait_ms=2000
#[utoipa::path(
    get,
    path = "/api/v1/details/{username}",
    tag = "Views",
    params(
        ("username" = String, Path, description = "GitHub login"),
        ("wait_ms" = Option<u64>, Query, description = "Deadline before pending sources are reported as loading")
    ),
    responses(
        (status = 200, description = "Details view with per-source state"),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
#[get("/details/{username}")]
pub async fn details(
    queries: web::Data<GitHubQueries>,
    path: web::Path<String>,
    params: web::Query<DetailsParams>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    if username.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }

    let deadline = params
        .wait_ms
        .map(|ms| Duration::from_millis(ms.min(MAX_WAIT_MS)));
    let view = load_details(&queries, &username, deadline).await;

    Ok(HttpResponse::Ok().json(view))
}
