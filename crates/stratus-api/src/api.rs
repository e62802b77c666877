//! Control plane API trait definition

use crate::error::Result;
use crate::models::{DeploymentCreateResponse, DeploymentInfo, DeploymentTemplate};
use async_trait::async_trait;
use serde_json::Value;

/// Deployments API abstraction trait
///
/// The HTTP client implements this against the hosted control plane; tests
/// substitute in-memory doubles.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Read a deployment template by identifier, scoped to a region
    async fn get_template(&self, template_id: &str, region: &str) -> Result<DeploymentTemplate>;

    /// Create a deployment
    ///
    /// `request` is the body sent as is. Built requests are serialized from
    /// [`DeploymentCreateRequest`](crate::DeploymentCreateRequest); file
    /// definitions are passed through untouched.
    ///
    /// Resubmitting with the same `request_id` returns the deployment created
    /// by the first successful call instead of creating a second one.
    async fn create(
        &self,
        request: &Value,
        request_id: Option<&str>,
    ) -> Result<DeploymentCreateResponse>;

    /// Get the current state of a deployment
    async fn get(&self, deployment_id: &str) -> Result<DeploymentInfo>;
}
