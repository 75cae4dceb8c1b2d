//! Mock GitHub API for integration tests.
//!
//! Starts an in-process HTTP server answering `/users/{username}` and
//! `/users/{username}/repos` from canned JSON, and records every request it
//! receives so tests can assert on paths, query strings, and headers.

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, web};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

/// A request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: String,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
}

/// Shared state for the mock GitHub API.
#[derive(Default)]
pub struct MockGitHubState {
    pub users: HashMap<String, Value>,
    pub repos: HashMap<String, Value>,
    /// Answer this many upcoming requests with 500 before serving normally.
    pub failures_remaining: usize,
    pub requests: Vec<RecordedRequest>,
}

type SharedState = web::Data<Arc<Mutex<MockGitHubState>>>;

fn record(state: &SharedState, req: &HttpRequest) -> bool {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        path: req.path().to_string(),
        query: req.query_string().to_string(),
        user_agent: header("user-agent"),
        accept: header("accept"),
    });
    if state.failures_remaining > 0 {
        state.failures_remaining -= 1;
        return true;
    }
    false
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    }))
}

fn server_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({"message": "Server Error"}))
}

#[get("/users/{username}/repos")]
async fn user_repos(state: SharedState, req: HttpRequest, path: web::Path<String>) -> HttpResponse {
    if record(&state, &req) {
        return server_error();
    }
    let state = state.lock().unwrap();
    match state.repos.get(path.as_str()) {
        Some(repos) => HttpResponse::Ok().json(repos),
        None => not_found(),
    }
}

#[get("/users/{username}")]
async fn user(state: SharedState, req: HttpRequest, path: web::Path<String>) -> HttpResponse {
    if record(&state, &req) {
        return server_error();
    }
    let state = state.lock().unwrap();
    match state.users.get(path.as_str()) {
        Some(user) => HttpResponse::Ok().json(user),
        None => not_found(),
    }
}

/// Mock GitHub API server.
pub struct MockGitHub {
    pub base_url: String,
    pub state: Arc<Mutex<MockGitHubState>>,
}

impl MockGitHub {
    /// Start the mock on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockGitHubState::default()));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(user_repos)
                .service(user)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Lives as long as the test runtime
        tokio::spawn(server);

        MockGitHub { base_url, state }
    }

    /// Serve a profile for `login`.
    pub fn add_user(&self, login: &str) {
        self.add_user_json(login, user_json(login));
    }

    pub fn add_user_json(&self, login: &str, body: Value) {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(login.to_string(), body);
    }

    /// Serve a repository listing for `login`.
    pub fn set_repos(&self, login: &str, repos: Value) {
        self.state
            .lock()
            .unwrap()
            .repos
            .insert(login.to_string(), repos);
    }

    /// Fail the next `count` requests with 500.
    pub fn fail_next(&self, count: usize) {
        self.state.lock().unwrap().failures_remaining = count;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }
}

/// A complete user payload as GitHub returns it.
pub fn user_json(login: &str) -> Value {
    json!({
        "login": login,
        "id": 1024025,
        "avatar_url": format!("https://avatars.githubusercontent.com/u/1024025?v=4&u={login}"),
        "html_url": format!("https://github.com/{login}"),
        "name": "Linus Torvalds",
        "company": "Linux Foundation",
        "blog": "",
        "location": "Portland, OR",
        "email": null,
        "bio": null,
        "twitter_username": null,
        "public_repos": 8,
        "public_gists": 0,
        "followers": 230000,
        "following": 0,
        "created_at": "2011-09-03T15:26:22Z",
        "updated_at": "2024-05-01T10:00:00Z",
        "site_admin": false,
        "type": "User"
    })
}

/// A complete repository payload as GitHub returns it.
pub fn repo_json(id: u64, owner: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "description": format!("{name} source tree"),
        "html_url": format!("https://github.com/{owner}/{name}"),
        "stargazers_count": 1000 + id,
        "forks_count": 10 + id,
        "language": "C",
        "topics": ["kernel", "linux", "os", "c"],
        "updated_at": "2024-05-01T10:00:00Z",
        "created_at": "2011-09-04T22:48:12Z",
        "pushed_at": "2024-05-01T09:00:00Z",
        "size": 4096,
        "watchers_count": 1000 + id,
        "open_issues_count": 0,
        "fork": false,
        "private": false
    })
}
