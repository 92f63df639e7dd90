use std::env;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing GITHUB_TOKEN or GH_TOKEN (or GITHUB_TOKEN_FILE)")]
    MissingToken,
    #[error("invalid {var}: {reason}")]
    InvalidUrl { var: &'static str, reason: String },
}

/// Runtime configuration for GitHub API clients.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub token_file: Option<PathBuf>,
    pub api_url: String,
    pub graphql_url: String,
    pub api_version: String,
    pub user_agent: String,
    /// Deadline applied to each tool call; 0 disables it.
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - GITHUB_TOKEN (or GH_TOKEN) [required unless GITHUB_TOKEN_FILE is set]
    /// - GITHUB_TOKEN_FILE (re-read on every request; wins over the static token)
    /// - GITHUB_API_URL (default: https://api.github.com)
    /// - GITHUB_GRAPHQL_URL (default: <GITHUB_API_URL>/graphql)
    /// - GITHUB_API_VERSION (default: 2022-11-28)
    /// - GITHUB_HTTP_TIMEOUT_SECS (default: 30)
    /// - GITHUB_USER_AGENT (default: github-projects-mcp/<version>)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token_file = non_empty("GITHUB_TOKEN_FILE").map(PathBuf::from);
        let token = match non_empty("GITHUB_TOKEN").or_else(|| non_empty("GH_TOKEN")) {
            Some(t) => t,
            None if token_file.is_some() => String::new(),
            None => return Err(ConfigError::MissingToken),
        };

        let api_url = non_empty("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        validate_url("GITHUB_API_URL", &api_url)?;

        let graphql_url = non_empty("GITHUB_GRAPHQL_URL").unwrap_or_else(|| {
            let mut base = api_url.clone();
            base.push_str("/graphql");
            base
        });
        validate_url("GITHUB_GRAPHQL_URL", &graphql_url)?;

        let api_version =
            non_empty("GITHUB_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let timeout_secs = non_empty("GITHUB_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let default_ua = format!("github-projects-mcp/{}", env!("CARGO_PKG_VERSION"));
        let user_agent = non_empty("GITHUB_USER_AGENT").unwrap_or(default_ua);

        Ok(Self {
            token,
            token_file,
            api_url,
            graphql_url,
            api_version,
            user_agent,
            timeout_secs,
        })
    }
}

fn validate_url(var: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        var,
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            var,
            reason: format!("unsupported scheme {}", other),
        }),
    }
}
