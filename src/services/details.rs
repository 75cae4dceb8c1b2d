//! Details page assembly.
//!
//! The profile and repository fetches run as independent tasks. Each one
//! resolves its own view state; with a deadline, a source that has not
//! answered yet is reported as loading and its task keeps running so the
//! result lands in the query cache for the next request.

use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

use crate::error::{AppError, Procedure};
use crate::models::DetailsView;
use crate::services::github_client::{FetchError, RepoQuery};
use crate::services::query_cache::GitHubQueries;

/// Build the details view for `username`.
pub async fn load_details(
    queries: &GitHubQueries,
    username: &str,
    deadline: Option<Duration>,
) -> DetailsView {
    let user_task = {
        let queries = queries.clone();
        let username = username.to_string();
        tokio::spawn(async move { queries.user(&username).await })
    };
    let repos_task = {
        let queries = queries.clone();
        let username = username.to_string();
        tokio::spawn(async move { queries.user_repos(&username, RepoQuery::default()).await })
    };

    let (user, repos) = tokio::join!(
        await_task(user_task, deadline),
        await_task(repos_task, deadline)
    );

    let mut view = DetailsView::new(username);

    if let Some(joined) = user {
        let result = narrow(joined, Procedure::GetUser).map(|user| (*user).clone());
        view.resolve_user(result);
    }

    if let Some(joined) = repos {
        match narrow(joined, Procedure::GetUserRepos) {
            Ok(repos) => view.resolve_repositories(Ok(repos.as_slice())),
            Err(message) => view.resolve_repositories(Err(message)),
        }
    }

    view
}

/// Wait for a fetch task. `None` means it is still running past the deadline.
async fn await_task<T>(
    task: JoinHandle<T>,
    deadline: Option<Duration>,
) -> Option<Result<T, JoinError>> {
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => Some(joined),
            Err(_) => {
                debug!("details source still loading after {:?}", limit);
                None
            }
        },
        None => Some(task.await),
    }
}

/// Reduce a finished task to the message the view shows.
fn narrow<T>(
    joined: Result<Result<T, FetchError>, JoinError>,
    procedure: Procedure,
) -> Result<T, String> {
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AppError::from_fetch(e, procedure).to_string()),
        Err(join_err) => {
            error!(procedure = procedure.name(), "fetch task failed: {}", join_err);
            Err(procedure.failure_message().to_string())
        }
    }
}
