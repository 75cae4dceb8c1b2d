//! Cached, retrying access to the GitHub client.
//!
//! Successful results are kept per (operation, input):
//! - younger than `fresh_for`: served without touching the network
//! - older than `fresh_for` but younger than `retain_for`: served immediately
//!   while a single background refresh replaces the entry
//! - older than `retain_for`: evicted, the next call fetches synchronously
//!
//! Concurrent misses for the same input share one upstream load. Loads run
//! as spawned tasks, so a caller going away does not abort the fetch.
//!
//! Failures are never cached. Generic fetch failures get exactly one retry
//! after `retry_delay`; invalid input and unknown users are surfaced at once.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tokio::time::interval;
use tracing::{debug, info};

use crate::models::{GitHubRepo, GitHubUser};
use crate::services::github_client::{FetchError, FetchFailure, GitHubClient, RepoQuery};

/// Cached results are served without refetching for this long.
pub const DEFAULT_FRESH_FOR: Duration = Duration::from_secs(5 * 60);

/// Unused results are discarded after this long.
pub const DEFAULT_RETAIN_FOR: Duration = Duration::from_secs(30 * 60);

/// Pause before the single retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Freshness, retention, and retry settings.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub fresh_for: Duration,
    pub retain_for: Duration,
    pub retry_delay: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            fresh_for: DEFAULT_FRESH_FOR,
            retain_for: DEFAULT_RETAIN_FOR,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// An upstream call whose input identifies its cache entry.
#[async_trait]
trait CachedQuery: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    async fn fetch(&self, client: &GitHubClient) -> Result<Self::Output, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UserQuery(String);

#[async_trait]
impl CachedQuery for UserQuery {
    type Output = GitHubUser;

    async fn fetch(&self, client: &GitHubClient) -> Result<GitHubUser, FetchError> {
        client.fetch_user(&self.0).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReposQuery {
    username: String,
    query: RepoQuery,
}

#[async_trait]
impl CachedQuery for ReposQuery {
    type Output = Vec<GitHubRepo>;

    async fn fetch(&self, client: &GitHubClient) -> Result<Vec<GitHubRepo>, FetchError> {
        client.fetch_user_repos(&self.username, self.query).await
    }
}

/// A load other callers can await.
type PendingLoad<T> = Shared<BoxFuture<'static, Result<Arc<T>, FetchError>>>;

struct CacheEntry<T> {
    value: Arc<T>,
    fetched_at: Instant,
}

/// Cache lookup outcome.
enum Lookup<T> {
    Fresh(Arc<T>),
    Stale(Arc<T>),
    Miss,
}

/// Entries and in-flight loads for one kind of query.
struct QueryStore<K: CachedQuery> {
    entries: RwLock<HashMap<K, CacheEntry<K::Output>>>,
    in_flight: Mutex<HashMap<K, PendingLoad<K::Output>>>,
}

impl<K: CachedQuery> QueryStore<K> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    async fn lookup(&self, key: &K, policy: &CachePolicy) -> Lookup<K::Output> {
        let entries = self.entries.read().await;
        let Some(entry) = entries.get(key) else {
            return Lookup::Miss;
        };

        let age = entry.fetched_at.elapsed();
        if age < policy.fresh_for {
            Lookup::Fresh(Arc::clone(&entry.value))
        } else if age < policy.retain_for {
            Lookup::Stale(Arc::clone(&entry.value))
        } else {
            Lookup::Miss
        }
    }

    async fn store(&self, key: K, value: Arc<K::Output>) {
        self.entries.write().await.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn evict_older_than(&self, retain_for: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.fetched_at.elapsed() < retain_for);
        before - entries.len()
    }
}

/// GitHub queries with caching and retry.
#[derive(Clone)]
pub struct GitHubQueries {
    client: GitHubClient,
    policy: CachePolicy,
    users: Arc<QueryStore<UserQuery>>,
    repos: Arc<QueryStore<ReposQuery>>,
}

impl GitHubQueries {
    pub fn new(client: GitHubClient, policy: CachePolicy) -> Self {
        Self {
            client,
            policy,
            users: Arc::new(QueryStore::new()),
            repos: Arc::new(QueryStore::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Cached `fetch_user`.
    pub async fn user(&self, username: &str) -> Result<Arc<GitHubUser>, FetchError> {
        self.query(&self.users, UserQuery(username.to_string()))
            .await
    }

    /// Cached `fetch_user_repos`.
    pub async fn user_repos(
        &self,
        username: &str,
        query: RepoQuery,
    ) -> Result<Arc<Vec<GitHubRepo>>, FetchError> {
        let key = ReposQuery {
            username: username.to_string(),
            query,
        };
        self.query(&self.repos, key).await
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.users.len().await + self.repos.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop entries older than the retention window. Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let retain_for = self.policy.retain_for;
        self.users.evict_older_than(retain_for).await
            + self.repos.evict_older_than(retain_for).await
    }

    async fn query<K: CachedQuery>(
        &self,
        store: &Arc<QueryStore<K>>,
        key: K,
    ) -> Result<Arc<K::Output>, FetchError> {
        match store.lookup(&key, &self.policy).await {
            Lookup::Fresh(value) => {
                debug!(?key, "query cache hit");
                Ok(value)
            }
            Lookup::Stale(value) => {
                debug!(?key, "query cache hit (stale)");
                // The load runs on its own task; nobody waits for it here.
                let _refresh = self.start_load(store, key).await;
                Ok(value)
            }
            Lookup::Miss => self.start_load(store, key).await.await,
        }
    }

    /// Join the in-flight load for `key`, or spawn one.
    async fn start_load<K: CachedQuery>(
        &self,
        store: &Arc<QueryStore<K>>,
        key: K,
    ) -> PendingLoad<K::Output> {
        let mut in_flight = store.in_flight.lock().await;
        if let Some(pending) = in_flight.get(&key) {
            debug!(?key, "joining in-flight query");
            return pending.clone();
        }

        let task = tokio::spawn({
            let this = self.clone();
            let store = Arc::clone(store);
            let key = key.clone();
            async move {
                let result = this.load_with_retry(&key).await.map(Arc::new);
                match &result {
                    Ok(value) => store.store(key.clone(), Arc::clone(value)).await,
                    Err(e) => debug!(?key, error = %e, "query load failed"),
                }
                store.in_flight.lock().await.remove(&key);
                result
            }
        });

        let pending = async move {
            task.await
                .unwrap_or_else(|e| Err(FetchFailure::Task(e.to_string()).into()))
        }
        .boxed()
        .shared();
        in_flight.insert(key, pending.clone());
        pending
    }

    async fn load_with_retry<K: CachedQuery>(&self, key: &K) -> Result<K::Output, FetchError> {
        match key.fetch(&self.client).await {
            Err(e) if e.is_retryable() => {
                info!(?key, error = %e, "fetch failed, retrying once");
                tokio::time::sleep(self.policy.retry_delay).await;
                key.fetch(&self.client).await
            }
            other => other,
        }
    }
}

/// Start the background task that evicts expired cache entries.
pub fn start_cache_sweeper(queries: GitHubQueries, every: Duration) {
    tokio::spawn(async move {
        info!(
            "Starting query cache sweeper (retention: {}s, interval: {}s)",
            queries.policy().retain_for.as_secs(),
            every.as_secs()
        );

        let mut ticker = interval(every);

        loop {
            ticker.tick().await;

            let removed = queries.evict_expired().await;
            if removed > 0 {
                debug!("Evicted {} expired query cache entries", removed);
            }
        }
    });
}
