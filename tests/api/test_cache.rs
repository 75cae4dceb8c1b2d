//! Integration tests: response caching between requests.

use std::time::Duration;

use serde_json::json;

use super::mock_github::{MockGitHub, repo_json};
use super::test_helpers::*;

#[actix_rt::test]
async fn test_fresh_results_are_served_from_cache() {
    let (mock, app) = setup().await;
    mock.add_user("torvalds");

    for _ in 0..3 {
        let (status, _) = get_json(&app, "/api/v1/github/users/torvalds").await;
        assert_eq!(status, 200);
    }

    assert_eq!(mock.request_count(), 1);
}

#[actix_rt::test]
async fn test_repo_queries_are_cached_per_options() {
    let (mock, app) = setup().await;
    mock.set_repos("torvalds", json!([repo_json(1, "torvalds", "linux")]));

    get_json(&app, "/api/v1/github/users/torvalds/repos").await;
    get_json(&app, "/api/v1/github/users/torvalds/repos?sort=updated&per_page=6").await;
    get_json(&app, "/api/v1/github/users/torvalds/repos?per_page=10").await;

    // Default and explicit default share an entry
    assert_eq!(mock.request_count(), 2);
}

#[actix_rt::test]
async fn test_details_reuses_procedure_cache() {
    let (mock, app) = setup().await;
    mock.add_user("torvalds");
    mock.set_repos("torvalds", json!([repo_json(1, "torvalds", "linux")]));

    get_json(&app, "/api/v1/github/users/torvalds").await;
    get_json(&app, "/api/v1/github/users/torvalds/repos").await;
    let (status, body) = get_json(&app, "/api/v1/details/torvalds").await;

    assert_eq!(status, 200);
    assert_eq!(body["loading"], false);
    assert_eq!(mock.request_count(), 2);
}

#[actix_rt::test]
async fn test_failures_are_not_cached() {
    let (mock, app) = setup().await;
    mock.add_user("torvalds");
    mock.fail_next(2);

    let (status, _) = get_json(&app, "/api/v1/github/users/torvalds").await;
    assert_eq!(status, 502);

    let (status, _) = get_json(&app, "/api/v1/github/users/torvalds").await;
    assert_eq!(status, 200);
    assert_eq!(mock.request_count(), 3);
}

#[actix_rt::test]
async fn test_stale_result_served_while_refreshing() {
    let mock = MockGitHub::start().await;
    let config = test_config(&mock, &[("GHX_CACHE_FRESH_SECS", "0")]);
    let queries = create_queries(&config);
    let app = create_test_app(config, queries).await;
    mock.add_user("torvalds");

    let (status, _) = get_json(&app, "/api/v1/github/users/torvalds").await;
    assert_eq!(status, 200);
    assert_eq!(mock.request_count(), 1);

    // Upstream now failing; the stale copy is still served
    mock.fail_next(10);
    let (status, body) = get_json(&app, "/api/v1/github/users/torvalds").await;
    assert_eq!(status, 200);
    assert_eq!(body["login"], "torvalds");

    // One background refresh: the attempt plus its single retry
    wait_for_request_count(&mock, 3).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mock.request_count(), 3);

    // The failed refresh left the entry in place
    let (status, body) = get_json(&app, "/api/v1/github/users/torvalds").await;
    assert_eq!(status, 200);
    assert_eq!(body["login"], "torvalds");
}

#[actix_rt::test]
async fn test_concurrent_requests_share_one_upstream_call() {
    let (mock, app) = setup().await;
    mock.add_user("torvalds");
    mock.set_repos("torvalds", json!([repo_json(1, "torvalds", "linux")]));

    let (profile, details) = tokio::join!(
        get_json(&app, "/api/v1/github/users/torvalds"),
        get_json(&app, "/api/v1/details/torvalds")
    );

    assert_eq!(profile.0, 200);
    assert_eq!(details.0, 200);
    let profile_requests = mock
        .requests()
        .iter()
        .filter(|r| r.path == "/users/torvalds")
        .count();
    assert_eq!(profile_requests, 1);
}

async fn wait_for_request_count(mock: &MockGitHub, count: usize) {
    for _ in 0..200 {
        if mock.request_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} upstream requests, saw {}", mock.request_count());
}
