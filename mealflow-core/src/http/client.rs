//! HTTP client trait and implementations.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::MealflowConfig;
use crate::error::FetchError;

/// Trait for HTTP clients, enabling mockability in tests.
///
/// Paths are relative to the client's base URL and may carry a query string.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET a path and decode the JSON body.
    async fn get_json(&self, path: &str) -> Result<JsonValue, FetchError>;

    /// POST a JSON body to a path and decode the JSON response.
    async fn post_json(&self, path: &str, body: &JsonValue) -> Result<JsonValue, FetchError>;
}

/// Configuration for ApiClient.
#[derive(Clone)]
pub struct ApiClientBuilder {
    base_url: String,
    api_key: String,
    timeout: Duration,
    user_agent: String,
}

impl ApiClientBuilder {
    /// Create a new builder for the given base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
            user_agent: "MealFlow/1.0".to_string(),
        }
    }

    /// Create a builder from loaded configuration.
    pub fn from_config(config: &MealflowConfig) -> Self {
        Self::new(&config.base_url, &config.api_key).timeout(config.timeout)
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Build the ApiClient.
    pub fn build(self) -> Result<ApiClient, FetchError> {
        let mut base_url =
            url::Url::parse(&self.base_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        // Endpoint paths are joined onto the base, so its path must end in `/`
        // or the last segment (e.g. a proxy prefix) would be replaced.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        Ok(ApiClient {
            inner,
            base_url,
            api_key: self.api_key,
        })
    }
}

/// Production client for the MealFlow API. Every request carries the static API key.
#[derive(Clone)]
pub struct ApiClient {
    inner: reqwest::Client,
    base_url: url::Url,
    api_key: String,
}

impl ApiClient {
    /// Get a builder for custom configuration.
    pub fn builder(base_url: impl Into<String>, api_key: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url, api_key)
    }

    pub fn from_config(config: &MealflowConfig) -> Result<Self, FetchError> {
        ApiClientBuilder::from_config(config).build()
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<JsonValue, FetchError> {
        let response = request
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = %status, "network: request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }
}

#[async_trait]
impl HttpClient for ApiClient {
    async fn get_json(&self, path: &str) -> Result<JsonValue, FetchError> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "network: GET");
        self.send(self.inner.get(url).header("content-type", "application/json"))
            .await
    }

    async fn post_json(&self, path: &str, body: &JsonValue) -> Result<JsonValue, FetchError> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "network: POST");
        self.send(self.inner.post(url).json(body)).await
    }
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    async fn get_json(&self, path: &str) -> Result<JsonValue, FetchError> {
        (**self).get_json(path).await
    }

    async fn post_json(&self, path: &str, body: &JsonValue) -> Result<JsonValue, FetchError> {
        (**self).post_json(path, body).await
    }
}

/// Mock response for testing.
#[derive(Clone)]
pub enum MockResponse {
    Json(JsonValue),
    Status(u16, String),
    Error(String),
}

/// A request the mock client received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<JsonValue>,
}

/// Mock HTTP client for testing.
///
/// Responses are keyed by path (including any query string). Every request is
/// recorded so tests can inspect what was sent and in which order.
pub struct MockClient {
    responses: HashMap<String, MockResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockClient {
    /// Create a new empty mock client.
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Add a response for a path.
    pub fn with_response(mut self, path: &str, response: MockResponse) -> Self {
        self.responses.insert(path.to_string(), response);
        self
    }

    /// Add a JSON response for a path.
    pub fn with_json(self, path: &str, json: JsonValue) -> Self {
        self.with_response(path, MockResponse::Json(json))
    }

    /// Add a non-success status for a path.
    pub fn with_status(self, path: &str, status: u16, body: &str) -> Self {
        self.with_response(path, MockResponse::Status(status, body.to_string()))
    }

    /// Add a network error for a path.
    pub fn with_error(self, path: &str, error: &str) -> Self {
        self.with_response(path, MockResponse::Error(error.to_string()))
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<RecordedRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded().clone()
    }

    /// Number of requests received for a path.
    pub fn request_count(&self, path: &str) -> usize {
        self.recorded()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    fn respond(
        &self,
        method: &'static str,
        path: &str,
        body: Option<&JsonValue>,
    ) -> Result<JsonValue, FetchError> {
        self.recorded().push(RecordedRequest {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        match self.responses.get(path) {
            Some(MockResponse::Json(json)) => Ok(json.clone()),
            Some(MockResponse::Status(status, body)) => Err(FetchError::Status {
                status: *status,
                body: body.clone(),
            }),
            Some(MockResponse::Error(e)) => Err(FetchError::Network(e.clone())),
            None => Err(FetchError::Network(format!(
                "No mock response for path: {}",
                path
            ))),
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn get_json(&self, path: &str) -> Result<JsonValue, FetchError> {
        self.respond("GET", path, None)
    }

    async fn post_json(&self, path: &str, body: &JsonValue) -> Result<JsonValue, FetchError> {
        self.respond("POST", path, Some(body))
    }
}
