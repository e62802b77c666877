//! Stratus control plane API
//!
//! This crate provides the control plane abstraction used by Stratus,
//! together with the wire models exchanged with the hosted-search
//! deployments API and an HTTP client implementing it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   Stratus CLI                    │
//! │            (stratus deployment create)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               stratus-deployment                 │
//! │     payload builder / request coordinator        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                  stratus-api                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        trait DeploymentApi { ... }        │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Wire models  │  │ HTTP client  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use stratus_api::{ClientConfig, DeploymentApi, HttpDeploymentApi};
//!
//! let api = HttpDeploymentApi::new(ClientConfig::new("https://api.elastic-cloud.com"))?;
//! let template = api.get_template("aws-io-optimized-v2", "us-east-1").await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use api::DeploymentApi;
pub use client::{ClientConfig, HttpDeploymentApi};
pub use error::{ApiError, Result};
pub use models::{
    DeploymentCreateRequest, DeploymentCreateResources, DeploymentCreateResponse, DeploymentInfo,
    DeploymentResource, DeploymentTemplate, DeploymentTemplateReference,
    ElasticsearchConfiguration, ElasticsearchPayload, ElasticsearchPlan, NodeType, ResourceInfo,
    ResourceKind, StatelessPayload, StatelessPlan, TopologyElement, TopologySize,
};
