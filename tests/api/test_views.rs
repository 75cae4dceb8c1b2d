//! Integration tests: search and details views.

use serde_json::json;

use super::mock_github::repo_json;
use super::test_helpers::*;

#[actix_rt::test]
async fn test_search_accepts_handles_and_urls() {
    let (_mock, app) = setup().await;

    let cases = [
        ("torvalds", "torvalds"),
        ("%40sindresorhus", "sindresorhus"),
        ("https%3A%2F%2Fgithub.com%2Fshadcn", "shadcn"),
        ("github.com%2Ftannerlinsley%2Freact-query", "tannerlinsley"),
    ];

    for (query, expected) in cases {
        let (status, body) = get_json(&app, &format!("/api/v1/search?q={query}")).await;
        assert_eq!(status, 200, "query {query}");
        assert_eq!(body["username"], expected);
        assert_eq!(body["details_path"], format!("/details/{expected}"));
    }
}

#[actix_rt::test]
async fn test_search_rejects_invalid_input() {
    let (mock, app) = setup().await;

    for uri in [
        "/api/v1/search",
        "/api/v1/search?q=",
        "/api/v1/search?q=%20%20",
        "/api/v1/search?q=not%20a%20user",
        "/api/v1/search?q=https%3A%2F%2Fgitlab.com%2Fsomeone",
    ] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, 400, "uri {uri}");
        assert_eq!(body["error"], "INVALID_INPUT");
        assert_eq!(body["message"], "Please enter a valid GitHub username");
    }

    // Search never touches upstream
    assert_eq!(mock.request_count(), 0);
}

#[actix_rt::test]
async fn test_details_ready() {
    let (mock, app) = setup().await;
    mock.add_user("torvalds");
    mock.set_repos("torvalds", json!([repo_json(1, "torvalds", "linux")]));

    let (status, body) = get_json(&app, "/api/v1/details/torvalds").await;

    assert_eq!(status, 200);
    assert_eq!(body["username"], "torvalds");
    assert_eq!(body["loading"], false);
    assert_eq!(body["search_path"], "/");

    assert_eq!(body["user"]["state"], "ready");
    assert_eq!(body["user"]["data"]["display_name"], "Linus Torvalds");
    assert_eq!(body["user"]["data"]["profile"]["login"], "torvalds");

    assert_eq!(body["repositories"]["state"], "ready");
    let cards = body["repositories"]["data"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["topics"], json!(["kernel", "linux", "os"]));

    let repo_request = mock
        .requests()
        .into_iter()
        .find(|r| r.path.ends_with("/repos"))
        .unwrap();
    assert_eq!(repo_request.query, "sort=updated&per_page=6");
}

#[actix_rt::test]
async fn test_details_empty_repositories() {
    let (mock, app) = setup().await;
    mock.add_user("newcomer");
    mock.set_repos("newcomer", json!([]));

    let (status, body) = get_json(&app, "/api/v1/details/newcomer").await;

    assert_eq!(status, 200);
    assert_eq!(body["user"]["state"], "ready");
    assert_eq!(body["repositories"]["state"], "empty");
}

#[actix_rt::test]
async fn test_details_unknown_user() {
    let (_mock, app) = setup().await;

    let (status, body) = get_json(&app, "/api/v1/details/nobody").await;

    assert_eq!(status, 200);
    assert_eq!(body["loading"], false);
    assert_eq!(body["user"]["state"], "error");
    assert_eq!(body["user"]["message"], "User not found");
    assert_eq!(body["repositories"]["state"], "error");
}

#[actix_rt::test]
async fn test_details_display_name_falls_back_to_login() {
    let (mock, app) = setup().await;
    let mut user = super::mock_github::user_json("anon");
    user["name"] = json!(null);
    mock.add_user_json("anon", user);
    mock.set_repos("anon", json!([]));

    let (_, body) = get_json(&app, "/api/v1/details/anon").await;

    assert_eq!(body["user"]["data"]["display_name"], "anon");
}
