//! HTTP clients for the Task and Snapshot services.
//!
//! Provides a minimal client with configurable auth (Bearer token or X-API-Key)
//! and a generic PATCH helper. The `TaskClient` and `SnapshotClient` traits in
//! `api` are what pipelines consume; `ApiClient` implements both.

pub mod api;

use reqwest::{Client, Url};
use rendition_core::ApiConfig;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub use api::{SnapshotClient, TaskClient};
pub use reqwest::StatusCode;

/// Errors raised while talking to the Task or Snapshot service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ClientError::Config(_) => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
    None,
}

/// HTTP client for the Task and Snapshot services with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Client for the configured API, authenticated with X-API-Key when a key is set.
    pub fn from_config(config: &ApiConfig) -> ClientResult<Self> {
        let auth = config
            .api_key
            .clone()
            .map(Auth::XApiKey)
            .unwrap_or(Auth::None);

        Self::new(
            config.url.clone(),
            auth,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The base URL extended by `segments`, each percent-encoded as a single
    /// path segment.
    pub fn build_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid API URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("API URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
            Auth::None => request,
        }
    }

    /// PATCH a JSON body. The response body is ignored on success.
    pub async fn patch_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<()> {
        let url = self.build_url(segments)?;
        let request = self.client.patch(url).json(body);
        let request = self.apply_auth(request);

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Status { status, body });
        }

        Ok(())
    }
}
