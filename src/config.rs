//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::services::github_client::GitHubClientConfig;
use crate::services::query_cache::CachePolicy;

/// Development default values.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const GITHUB_API_URL: &str = crate::services::github_client::DEFAULT_API_URL;
    pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
    pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 10;
    pub const CACHE_FRESH_SECS: u64 = 300; // 5 minutes
    pub const CACHE_RETENTION_SECS: u64 = 1800; // 30 minutes
    pub const RETRY_DELAY_MS: u64 = 1000;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Upstream GitHub API connection settings
    pub github: GitHubClientConfig,
    /// Query cache freshness, retention, and retry
    pub cache: CachePolicy,
    /// Directory for static frontend assets
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `GHX_HOST`: Server host (default: 127.0.0.1)
    /// - `GHX_PORT`: Server port (default: 8080)
    /// - `GHX_GITHUB_API_URL`: GitHub API base URL (default: https://api.github.com)
    /// - `GHX_USER_AGENT`: User-Agent sent upstream (default: github-explorer-server)
    /// - `GHX_HTTP_CONNECT_TIMEOUT_SECS`: Upstream connect timeout (default: 5)
    /// - `GHX_HTTP_REQUEST_TIMEOUT_SECS`: Upstream request timeout (default: 10)
    /// - `GHX_CACHE_FRESH_SECS`: Serve cached results without refetch (default: 300)
    /// - `GHX_CACHE_RETENTION_SECS`: Drop unused results after (default: 1800)
    /// - `GHX_RETRY_DELAY_MS`: Delay before the single retry (default: 1000)
    /// - `GHX_STATIC_DIR`: Static assets directory for the frontend
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_str = lookup("RUST_ENV").ok_or(ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = lookup("GHX_HOST").unwrap_or_else(|| defaults::DEV_HOST.to_string());

        let port = parse_or(
            &lookup,
            "GHX_PORT",
            defaults::DEV_PORT,
            "GHX_PORT must be a valid port number",
        )?;

        let base_url = lookup("GHX_GITHUB_API_URL")
            .unwrap_or_else(|| defaults::GITHUB_API_URL.to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|_| ConfigError::InvalidValue("GHX_GITHUB_API_URL must be a valid URL"))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue(
                "GHX_GITHUB_API_URL must be an http(s) base URL",
            ));
        }

        let mut github = GitHubClientConfig::new(base_url);
        if let Some(user_agent) = lookup("GHX_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            github.user_agent = user_agent;
        }
        github.connect_timeout = Duration::from_secs(parse_or(
            &lookup,
            "GHX_HTTP_CONNECT_TIMEOUT_SECS",
            defaults::HTTP_CONNECT_TIMEOUT_SECS,
            "GHX_HTTP_CONNECT_TIMEOUT_SECS must be a valid number",
        )?);
        github.request_timeout = Duration::from_secs(parse_or(
            &lookup,
            "GHX_HTTP_REQUEST_TIMEOUT_SECS",
            defaults::HTTP_REQUEST_TIMEOUT_SECS,
            "GHX_HTTP_REQUEST_TIMEOUT_SECS must be a valid number",
        )?);

        let cache = CachePolicy {
            fresh_for: Duration::from_secs(parse_or(
                &lookup,
                "GHX_CACHE_FRESH_SECS",
                defaults::CACHE_FRESH_SECS,
                "GHX_CACHE_FRESH_SECS must be a valid number",
            )?),
            retain_for: Duration::from_secs(parse_or(
                &lookup,
                "GHX_CACHE_RETENTION_SECS",
                defaults::CACHE_RETENTION_SECS,
                "GHX_CACHE_RETENTION_SECS must be a valid number",
            )?),
            retry_delay: Duration::from_millis(parse_or(
                &lookup,
                "GHX_RETRY_DELAY_MS",
                defaults::RETRY_DELAY_MS,
                "GHX_RETRY_DELAY_MS must be a valid number",
            )?),
        };

        let static_dir = lookup("GHX_STATIC_DIR").map(PathBuf::from);

        let config = Config {
            environment,
            host,
            port,
            github,
            cache,
            static_dir,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate settings that are tolerated in development only.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.github.base_url.scheme() != "https" {
            errors.push(format!(
                "GHX_GITHUB_API_URL must use https in production, got '{}'",
                self.github.base_url
            ));
        }

        if self.cache.fresh_for > self.cache.retain_for {
            errors.push(format!(
                "GHX_CACHE_FRESH_SECS ({}) must not exceed GHX_CACHE_RETENTION_SECS ({})",
                self.cache.fresh_for.as_secs(),
                self.cache.retain_for.as_secs()
            ));
        }

        if self.github.request_timeout.is_zero() {
            errors.push("GHX_HTTP_REQUEST_TIMEOUT_SECS must be greater than 0".to_string());
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

fn parse_or<F, T>(
    lookup: &F,
    key: &str,
    default: T,
    message: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(message)),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
