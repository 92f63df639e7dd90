//! GraphQL execution against the GitHub GraphQL endpoint.
//!
//! One POST per call, no retries. The response envelope is decoded in full
//! before `errors` is inspected, so [`GraphQlExecutor::execute_envelope`]
//! still hands back whatever `data` arrived next to the errors.
//!
//! A 200 response whose `data` is null or absent and whose `errors` is empty
//! fails with [`GraphQlError::MissingData`]. It is not decoded into an empty
//! or default value.

use crate::auth::CredentialProvider;
use crate::context::{CallContext, DeadlineExceeded};
use log::{debug, warn};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    DeadlineExceeded(#[from] DeadlineExceeded),
}

#[derive(Debug, Error)]
pub enum GraphQlError {
    #[error("failed to marshal GraphQL request")]
    Marshal(#[source] serde_json::Error),
    #[error("failed to create GraphQL request")]
    BuildRequest(#[source] reqwest::Error),
    #[error("failed to execute GraphQL request")]
    Transport(#[source] TransportError),
    #[error("GraphQL request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("failed to read GraphQL response")]
    ReadBody(#[source] reqwest::Error),
    #[error("failed to decode GraphQL response")]
    Decode(#[source] serde_json::Error),
    /// Only the first message of the `errors` array is kept.
    #[error("GraphQL errors: {message}")]
    GraphQl { message: String },
    #[error("GraphQL response contained no data")]
    MissingData,
}

impl From<DeadlineExceeded> for GraphQlError {
    fn from(e: DeadlineExceeded) -> Self {
        GraphQlError::Transport(TransportError::DeadlineExceeded(e))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlErrorMessage {
    pub message: String,
}

/// Decoded `{data, errors}` wrapper of a GraphQL response.
#[derive(Debug, Clone)]
pub struct GraphQlEnvelope<T> {
    pub data: Option<T>,
    pub errors: Vec<GraphQlErrorMessage>,
}

impl<T> GraphQlEnvelope<T> {
    /// Fails with the first error message if any errors were reported.
    pub fn into_result(self) -> Result<T, GraphQlError> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(GraphQlError::GraphQl {
                message: first.message,
            });
        }
        self.data.ok_or(GraphQlError::MissingData)
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorMessage>>,
}

/// Serializes `variables` into the JSON object sent as `variables`.
pub fn variables_object<V: Serialize + ?Sized>(
    variables: &V,
) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(variables)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(serde::ser::Error::custom(format!(
            "GraphQL variables must serialize to an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Clone)]
pub struct GraphQlExecutor {
    client: Client,
    endpoint: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GraphQlExecutor {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        }
    }

    /// Runs `query` and returns the typed `data` payload.
    pub async fn execute<V, T>(
        &self,
        ctx: &CallContext,
        query: &str,
        variables: &V,
    ) -> Result<T, GraphQlError>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_envelope(ctx, query, variables)
            .await?
            .into_result()
    }

    /// Runs `query` and returns the decoded envelope without treating
    /// GraphQL-level errors as failures.
    ///
    /// When `errors` is non-empty and `data` does not fit `T`, `data` is
    /// `None` rather than a decode error, so the API's message survives.
    pub async fn execute_envelope<V, T>(
        &self,
        ctx: &CallContext,
        query: &str,
        variables: &V,
    ) -> Result<GraphQlEnvelope<T>, GraphQlError>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = GraphQlRequest {
            query,
            variables: variables_object(variables).map_err(GraphQlError::Marshal)?,
        };
        let payload = serde_json::to_vec(&request).map_err(GraphQlError::Marshal)?;

        let token = self.credentials.bearer_token().unwrap_or_default();
        let http_request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .bearer_auth(token)
            .body(payload)
            .build()
            .map_err(GraphQlError::BuildRequest)?;

        debug!("GraphQL POST {}", self.endpoint);
        let body = ctx.run(self.round_trip(http_request)).await??;

        let raw: RawEnvelope = serde_json::from_slice(&body).map_err(GraphQlError::Decode)?;
        let errors = raw.errors.unwrap_or_default();
        let data = match raw.data {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<T>(value) {
                Ok(typed) => Some(typed),
                Err(e) if errors.is_empty() => return Err(GraphQlError::Decode(e)),
                Err(e) => {
                    debug!("dropping partial GraphQL data alongside errors: {}", e);
                    None
                }
            },
        };
        if !errors.is_empty() {
            warn!(
                "GraphQL response carried {} error(s); first: {}",
                errors.len(),
                errors[0].message
            );
        }
        Ok(GraphQlEnvelope { data, errors })
    }

    async fn round_trip(&self, request: reqwest::Request) -> Result<Vec<u8>, GraphQlError> {
        let res = self
            .client
            .execute(request)
            .await
            .map_err(|e| GraphQlError::Transport(TransportError::Http(e)))?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            warn!("GraphQL POST {} returned status {}", self.endpoint, status);
            return Err(GraphQlError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = res.bytes().await.map_err(GraphQlError::ReadBody)?;
        Ok(bytes.to_vec())
    }
}
