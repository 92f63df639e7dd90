use super::{encode_path_segment, extract_rate_from_rest, map_status_to_error, ErrorInfo, RateMeta};
use crate::auth::CredentialProvider;
use crate::context::CallContext;
use log::{debug, warn};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RestResponse<T> {
    pub value: Option<T>,
    pub rate: Option<RateMeta>,
    pub error: Option<ErrorInfo>,
    pub status: StatusCode,
}

impl<T> RestResponse<T> {
    fn failed(status: StatusCode, rate: Option<RateMeta>, error: ErrorInfo) -> Self {
        Self {
            value: None,
            rate,
            error: Some(error),
            status,
        }
    }

    /// Collapses the response into the decoded value or the error shape.
    pub fn into_result(self) -> Result<T, ErrorInfo> {
        match (self.value, self.error) {
            (Some(v), None) => Ok(v),
            (_, Some(e)) => Err(e),
            (None, None) => Err(ErrorInfo {
                code: "server_error".into(),
                message: "empty response".into(),
                retriable: false,
            }),
        }
    }
}

/// Subset of the REST issue payload needed to address it over GraphQL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub number: i64,
    #[serde(default)]
    pub node_id: Option<String>,
}

#[derive(Clone)]
pub struct RestClient {
    client: Client,
    api_url: String,
    api_version: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl RestClient {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        api_version: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_version: api_version.into(),
            credentials,
        }
    }

    /// Single GET, no retries. Non-2xx statuses and transport failures are
    /// reported through `error`.
    pub async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        ctx: &CallContext,
        path: &str,
    ) -> RestResponse<T> {
        let url = format!("{}{}", self.api_url, path);
        let token = self.credentials.bearer_token().unwrap_or_default();
        debug!("REST GET {}", url);
        let send = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("X-GitHub-Api-Version", &self.api_version)
            .header(
                ACCEPT,
                HeaderValue::from_static("application/vnd.github+json"),
            )
            .send();

        let res = match ctx.run(send).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => {
                warn!("REST GET error sending request: {}", e);
                return RestResponse::failed(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    ErrorInfo {
                        code: "upstream_error".into(),
                        message: e.to_string(),
                        retriable: true,
                    },
                );
            }
            Err(deadline) => {
                return RestResponse::failed(
                    StatusCode::GATEWAY_TIMEOUT,
                    None,
                    ErrorInfo {
                        code: "timeout".into(),
                        message: deadline.to_string(),
                        retriable: true,
                    },
                );
            }
        };

        let status = res.status();
        let rate = extract_rate_from_rest(res.headers());
        if let Some(remaining) = rate.remaining {
            debug!("REST rate limit remaining: {}", remaining);
        }

        if status.is_success() {
            return match ctx.run(res.json::<T>()).await {
                Ok(Ok(val)) => RestResponse {
                    value: Some(val),
                    rate: Some(rate),
                    error: None,
                    status,
                },
                Ok(Err(e)) => RestResponse::failed(
                    status,
                    Some(rate),
                    ErrorInfo {
                        code: "server_error".into(),
                        message: e.to_string(),
                        retriable: false,
                    },
                ),
                Err(deadline) => RestResponse::failed(
                    status,
                    Some(rate),
                    ErrorInfo {
                        code: "timeout".into(),
                        message: deadline.to_string(),
                        retriable: true,
                    },
                ),
            };
        }

        warn!("REST GET {} returned status {}", url, status);
        let text = ctx.run(res.text()).await.ok().and_then(Result::ok).unwrap_or_default();
        RestResponse::failed(status, Some(rate), map_status_to_error(status, text))
    }

    /// `GET /repos/{owner}/{repo}/issues/{number}`.
    pub async fn get_issue(
        &self,
        ctx: &CallContext,
        owner: &str,
        repo: &str,
        number: i64,
    ) -> RestResponse<Issue> {
        let path = format!(
            "/repos/{}/{}/issues/{}",
            encode_path_segment(owner),
            encode_path_segment(repo),
            number
        );
        self.get_json(ctx, &path).await
    }
}
