//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "GitHub Explorer Server",
        version = "0.1.0",
        description = "Look up GitHub user profiles and recent public repositories"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::info,
        // GitHub procedures
        api::github::get_user,
        api::github::get_user_repos,
        // Views
        api::views::search,
        api::views::details,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ServerInfoResponse,
            // GitHub
            models::GitHubUser,
            models::GitHubRepo,
            // Views
            models::SearchResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "GitHub", description = "User profile and repository lookups"),
        (name = "Views", description = "Search and details page data")
    )
)]
pub struct ApiDoc;
