//! HTTP client for the estimation API
//!
//! Thin wrapper over reqwest that resolves paths against the API base URL,
//! applies per-request timeouts and bearer tokens, and maps transport
//! failures onto [`HttpError`].

use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("{0}")]
    Request(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection failed to {0}")]
    Connect(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    #[error("JSON decode error: {0}")]
    Decode(String),
}

/// Client bound to one API base URL (for example `http://localhost:3000/api`)
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a client with the default per-request timeout
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, HttpError> {
        let base_url = base_url.into();
        Url::parse(&base_url).map_err(|e| HttpError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("alterego-probe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Request(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build full URL for an API path
    fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, HttpError> {
        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let parsed = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        parsed.map_err(|e| HttpError::InvalidUrl(format!("{raw}: {e}")))
    }

    /// Send a request and buffer the whole response
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let url = self.build_url(&request.path, &request.query)?;
        let timeout_secs = request.timeout_secs.unwrap_or(self.timeout_secs);
        debug!("Sending {} request to {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .timeout(Duration::from_secs(timeout_secs));

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let start = Instant::now();

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(timeout_secs)
            } else if e.is_connect() {
                HttpError::Connect(url.to_string())
            } else {
                HttpError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(timeout_secs)
            } else {
                HttpError::Request(format!("Failed to read response body: {e}"))
            }
        })?;
        debug!(
            "Response: {} {} in {}ms",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            start.elapsed().as_millis()
        );

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Request against an API path
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            timeout_secs: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Serialize `body` as the JSON payload
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, HttpError> {
        let value = serde_json::to_value(body).map_err(|e| HttpError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Buffered API response
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; an empty body reads as `{}`
    pub fn json(&self) -> Result<Value, HttpError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(&self.body).map_err(|e| {
            HttpError::Decode(format!("{e} (HTTP {}: {})", self.status, self.preview(80)))
        })
    }

    /// Top-level field of a JSON object body
    pub fn field(&self, name: &str) -> Option<Value> {
        self.json().ok().and_then(|v| v.get(name).cloned())
    }

    /// The `error` string of an error body
    pub fn error_message(&self) -> Option<String> {
        self.field("error")
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// First `max` characters of the body, for failure messages
    pub fn preview(&self, max: usize) -> String {
        let mut chars = self.body.chars();
        let head: String = chars.by_ref().take(max).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::get("/dvf/comparables")
            .param("lat", 48.8712)
            .param("months", 24)
            .bearer("tok")
            .timeout(30);

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.query.len(), 2);
        assert_eq!(req.bearer.as_deref(), Some("tok"));
        assert_eq!(req.timeout_secs, Some(30));
    }

    #[test]
    fn test_json_body() {
        let req = ApiRequest::post("/leads")
            .json(&json!({ "name": "Jean" }))
            .unwrap();
        assert_eq!(req.body, Some(json!({ "name": "Jean" })));
    }

    #[test]
    fn test_build_url() {
        let client = ApiClient::new("http://localhost:3000/api/", 10).unwrap();
        let url = client
            .build_url(
                "/geo/resolve",
                &[("address".to_string(), "2 rue des italiens".to_string())],
            )
            .unwrap();
        assert_eq!(url.path(), "/api/geo/resolve");
        assert_eq!(url.query(), Some("address=2+rue+des+italiens"));

        let root = client.build_url("/", &[]).unwrap();
        assert_eq!(root.as_str(), "http://localhost:3000/api/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", 10),
            Err(HttpError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_response_json() {
        assert!(response(200, "").json().unwrap().is_object());
        assert_eq!(
            response(400, r#"{"error":"Address is required"}"#)
                .json()
                .unwrap()["error"],
            "Address is required"
        );
        assert!(matches!(
            response(502, "<html>Bad Gateway</html>").json(),
            Err(HttpError::Decode(_))
        ));
    }

    #[test]
    fn test_response_fields() {
        let resp = response(404, r#"{"error":"Not found","code":7}"#);
        assert_eq!(resp.error_message().as_deref(), Some("Not found"));
        assert_eq!(resp.field("code"), Some(json!(7)));
        assert!(response(500, "oops").error_message().is_none());
    }

    #[test]
    fn test_response_status_classes() {
        assert!(response(200, "").is_success());
        assert!(!response(401, "").is_success());
    }

    #[test]
    fn test_preview_truncates() {
        let resp = response(500, "abcdefghij");
        assert_eq!(resp.preview(4), "abcd...");
        assert_eq!(resp.preview(20), "abcdefghij");
    }
}
