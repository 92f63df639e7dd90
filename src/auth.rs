//! Bearer-token resolution for outgoing GitHub requests.
//!
//! Requests never fail because of credentials: the chain falls back to the
//! configured static token, which may be empty, and GitHub answers with 401.

use crate::config::Config;
use log::debug;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Source of a bearer token. Returns `None` when it has nothing to offer.
///
/// `bearer_token` sits on the request path and must not block. Providers
/// backed by slow sources do their I/O in `refresh`, which callers run on a
/// blocking thread once per tool call.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;

    fn refresh(&self) {}
}

/// A fixed token, typically a personal access token from the environment.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}

/// Token kept in a file, re-read on every `refresh` so that short-lived
/// installation tokens rotated by a sidecar are picked up.
#[derive(Debug)]
pub struct TokenFile {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl TokenFile {
    /// Creates the provider without touching the file; the first
    /// `refresh` loads it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }

    fn read(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                debug!("token file {} unreadable: {}", self.path.display(), e);
                None
            }
        }
    }
}

impl CredentialProvider for TokenFile {
    fn bearer_token(&self) -> Option<String> {
        match self.cached.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn refresh(&self) {
        let token = self.read();
        match self.cached.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

/// Prefers the dynamic provider and falls back to the static token.
#[derive(Clone)]
pub struct CredentialChain {
    dynamic: Option<Arc<dyn CredentialProvider>>,
    fallback: StaticToken,
}

impl CredentialChain {
    pub fn new(fallback: StaticToken) -> Self {
        Self {
            dynamic: None,
            fallback,
        }
    }

    pub fn with_dynamic(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.dynamic = Some(provider);
        self
    }

    pub fn from_config(cfg: &Config) -> Self {
        let chain = Self::new(StaticToken::new(cfg.token.clone()));
        match &cfg.token_file {
            Some(path) => chain.with_dynamic(Arc::new(TokenFile::new(path.clone()))),
            None => chain,
        }
    }
}

impl CredentialProvider for CredentialChain {
    fn bearer_token(&self) -> Option<String> {
        self.dynamic
            .as_ref()
            .and_then(|p| p.bearer_token())
            .filter(|t| !t.is_empty())
            .or_else(|| self.fallback.bearer_token())
    }

    fn refresh(&self) {
        if let Some(p) = &self.dynamic {
            p.refresh();
        }
    }
}
