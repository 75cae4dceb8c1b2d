//! Shared test helpers for API integration tests.

use actix_web::{App, dev::ServiceResponse, test, web};
use github_explorer_lib::api;
use github_explorer_lib::config::Config;
use github_explorer_lib::middleware::RequestLogger;
use github_explorer_lib::services::{GitHubClient, GitHubQueries};
use serde_json::Value;
use std::collections::HashMap;

use super::mock_github::MockGitHub;

/// Load a development config pointed at the mock, with extra overrides.
pub fn test_config(mock: &MockGitHub, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("RUST_ENV".to_string(), "development".to_string()),
        ("GHX_GITHUB_API_URL".to_string(), mock.base_url.clone()),
        ("GHX_USER_AGENT".to_string(), "explorer-integration-tests".to_string()),
        ("GHX_RETRY_DELAY_MS".to_string(), "0".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config should load")
}

/// Build the query layer against the mock through the real HTTP transport.
pub fn create_queries(config: &Config) -> GitHubQueries {
    let client = GitHubClient::with_reqwest(config.github.clone())
        .expect("Failed to build HTTP client");
    GitHubQueries::new(client, config.cache)
}

/// Create a test app with the given config and query layer.
pub async fn create_test_app(
    config: Config,
    queries: GitHubQueries,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(queries))
            .app_data(web::Data::new(config))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_github_routes)
                    .configure(api::configure_view_routes),
            ),
    )
    .await
}

/// Start a mock and an app wired to it with default settings.
pub async fn setup() -> (
    MockGitHub,
    impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
) {
    let mock = MockGitHub::start().await;
    let config = test_config(&mock, &[]);
    let queries = create_queries(&config);
    let app = create_test_app(config, queries).await;
    (mock, app)
}

/// Issue a GET and return status plus JSON body.
pub async fn get_json<S>(app: &S, uri: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
