use crate::config::Config;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub mod graphql;
pub mod rest;

pub use graphql::{GraphQlEnvelope, GraphQlError, GraphQlErrorMessage, GraphQlExecutor};
pub use rest::{Issue, RestClient, RestResponse};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateMeta {
    pub remaining: Option<i32>,
    pub used: Option<i32>,
    pub reset_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    pub retriable: bool,
}

/// Builds the process-wide HTTP client shared by REST and GraphQL calls.
///
/// No client-level timeout is configured: deadlines come from the per-call
/// [`CallContext`](crate::context::CallContext).
pub fn build_client(cfg: &Config) -> anyhow::Result<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_str(&cfg.user_agent)?);
    // Authorization header is injected per request so rotated tokens apply.
    let client = Client::builder()
        .default_headers(default_headers)
        .use_rustls_tls()
        .build()?;
    Ok(client)
}

pub fn map_status_to_error(status: StatusCode, message: String) -> ErrorInfo {
    let (code, retriable) = match status {
        StatusCode::BAD_REQUEST => ("bad_request", false),
        StatusCode::UNAUTHORIZED => ("unauthorized", false),
        StatusCode::FORBIDDEN => ("forbidden", false),
        StatusCode::NOT_FOUND => ("not_found", false),
        StatusCode::CONFLICT => ("conflict", false),
        StatusCode::TOO_MANY_REQUESTS => ("rate_limited", true),
        s if s.is_server_error() => ("upstream_error", true),
        _ => ("server_error", false),
    };
    ErrorInfo {
        code: code.to_string(),
        message,
        retriable,
    }
}

pub fn extract_rate_from_rest(headers: &HeaderMap) -> RateMeta {
    let header_num = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok())
    };
    let remaining = header_num("x-ratelimit-remaining").map(|x| x as i32);
    let used = header_num("x-ratelimit-used").map(|x| x as i32);
    let reset_at = header_num("x-ratelimit-reset")
        .and_then(|epoch| chrono::DateTime::<chrono::Utc>::from_timestamp(epoch, 0))
        .map(|dt| dt.to_rfc3339());
    RateMeta {
        remaining,
        used,
        reset_at,
    }
}

/// Percent-encodes a single URL path segment (owner, repo, ...).
pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping_matrix() {
        assert_eq!(
            map_status_to_error(StatusCode::BAD_REQUEST, "".into()).code,
            "bad_request"
        );
        assert_eq!(
            map_status_to_error(StatusCode::UNAUTHORIZED, "".into()).code,
            "unauthorized"
        );
        assert_eq!(
            map_status_to_error(StatusCode::FORBIDDEN, "".into()).code,
            "forbidden"
        );
        assert_eq!(
            map_status_to_error(StatusCode::NOT_FOUND, "".into()).code,
            "not_found"
        );
        assert_eq!(
            map_status_to_error(StatusCode::CONFLICT, "".into()).code,
            "conflict"
        );
        let rl = map_status_to_error(StatusCode::TOO_MANY_REQUESTS, "".into());
        assert_eq!(rl.code, "rate_limited");
        assert!(rl.retriable);
        let s5 = map_status_to_error(StatusCode::INTERNAL_SERVER_ERROR, "".into());
        assert_eq!(s5.code, "upstream_error");
        assert!(s5.retriable);
    }

    #[test]
    fn rest_rate_headers() {
        let mut h = HeaderMap::new();
        h.insert("x-ratelimit-remaining", HeaderValue::from_static("4999"));
        h.insert("x-ratelimit-used", HeaderValue::from_static("1"));
        h.insert("x-ratelimit-reset", HeaderValue::from_static("0"));
        let rate = extract_rate_from_rest(&h);
        assert_eq!(rate.remaining, Some(4999));
        assert_eq!(rate.used, Some(1));
        assert_eq!(rate.reset_at.as_deref(), Some("1970-01-01T00:00:00+00:00"));
    }

    #[test]
    fn missing_rate_headers_are_none() {
        let rate = extract_rate_from_rest(&HeaderMap::new());
        assert_eq!(
            rate,
            RateMeta {
                remaining: None,
                used: None,
                reset_at: None
            }
        );
    }

    #[test]
    fn url_path_segment_encoding() {
        assert_eq!(encode_path_segment("Prod Env/Blue%"), "Prod%20Env%2FBlue%25");
        assert_eq!(encode_path_segment("abc-._~123"), "abc-._~123");
    }
}
