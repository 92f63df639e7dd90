use crate::auth::{CredentialChain, CredentialProvider};
use crate::config::Config;
use crate::http::{self, GraphQlExecutor, RestClient};
use log::warn;
use std::sync::Arc;

/// Shared GitHub access for tool handlers: one HTTP client and one
/// credential chain behind both the GraphQL and REST paths.
#[derive(Clone)]
pub struct GitHub {
    pub graphql: GraphQlExecutor,
    pub rest: RestClient,
    credentials: Arc<dyn CredentialProvider>,
}

impl GitHub {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let client = http::build_client(cfg)?;
        let credentials: Arc<dyn CredentialProvider> = Arc::new(CredentialChain::from_config(cfg));
        Ok(Self::new(client, cfg, credentials))
    }

    pub fn new(
        client: reqwest::Client,
        cfg: &Config,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            graphql: GraphQlExecutor::new(client.clone(), &cfg.graphql_url, credentials.clone()),
            rest: RestClient::new(client, &cfg.api_url, &cfg.api_version, credentials.clone()),
            credentials,
        }
    }

    /// Reloads file-backed tokens on the blocking pool. Call once at the
    /// start of each tool call.
    pub async fn refresh_credentials(&self) {
        let credentials = self.credentials.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || credentials.refresh()).await {
            warn!("credential refresh failed: {}", e);
        }
    }
}
