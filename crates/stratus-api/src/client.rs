//! Deployments API HTTP client
//!
//! Direct control plane API implementation over HTTPS.
//! Uses `ApiKey` authorization.

use crate::api::DeploymentApi;
use crate::error::{ApiError, Result};
use crate::models::{DeploymentCreateResponse, DeploymentInfo, DeploymentTemplate};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const API_PREFIX: &str = "/api/v1";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
    /// Skip TLS certificate verification (self-hosted control planes)
    pub insecure: bool,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: None,
            timeout: None,
            insecure: false,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Deployments API client
pub struct HttpDeploymentApi {
    client: reqwest::Client,
    host: String,
    api_key: Option<String>,
}

impl HttpDeploymentApi {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let host = config.host.trim().trim_end_matches('/').to_string();
        if !(host.starts_with("https://") || host.starts_with("http://")) {
            return Err(ApiError::InvalidHost(config.host));
        }

        let mut builder =
            reqwest::Client::builder().user_agent(concat!("stratus/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
            host,
            api_key: config.api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Get the API host
    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.host, API_PREFIX, path)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;
        Ok(request.header(reqwest::header::AUTHORIZATION, format!("ApiKey {}", key)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorize(request)?.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &body));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl DeploymentApi for HttpDeploymentApi {
    async fn get_template(&self, template_id: &str, region: &str) -> Result<DeploymentTemplate> {
        let url = self.url(&format!("/deployments/templates/{}", template_id));
        tracing::debug!("Fetching deployment template {} for region {}", template_id, region);

        let request = self.client.get(&url).query(&[
            ("region", region),
            ("show_instance_configurations", "false"),
        ]);
        self.send(request).await
    }

    async fn create(
        &self,
        request: &Value,
        request_id: Option<&str>,
    ) -> Result<DeploymentCreateResponse> {
        let url = self.url("/deployments");
        tracing::debug!("Creating deployment (request_id: {:?})", request_id);

        let mut builder = self.client.post(&url).json(request);
        if let Some(id) = request_id {
            builder = builder.query(&[("request_id", id)]);
        }
        self.send(builder).await
    }

    async fn get(&self, deployment_id: &str) -> Result<DeploymentInfo> {
        let url = self.url(&format!("/deployments/{}", deployment_id));
        self.send(self.client.get(&url)).await
    }
}

fn error_from_body(status: u16, body: &str) -> ApiError {
    let first = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next());

    match first {
        Some(e) => ApiError::Status {
            status,
            code: e.code,
            message: e.message,
        },
        None => ApiError::Status {
            status,
            code: "unknown".to_string(),
            message: if body.trim().is_empty() {
                "empty response body".to_string()
            } else {
                body.trim().to_string()
            },
        },
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    code: String,
    message: String,
}
