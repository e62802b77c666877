//! Deployment assembly error types

use stratus_api::{ApiError, ResourceKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error(
        "failed reading the file definition\n  {source}\n  could not read the specified file, please make sure it exists"
    )]
    FileDefinition {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid memory size \"{input}\": {reason}")]
    InvalidSize { input: String, reason: String },

    #[error("failed unpacking raw elasticsearch node topology {fragment}: {source}")]
    TopologyDecode {
        fragment: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("elasticsearch node topology {fragment}: memory size cannot be empty")]
    EmptyTopologySize { fragment: String },

    #[error("invalid zone count {value} for {kind}: must be at least 1")]
    InvalidZoneCount { kind: ResourceKind, value: u32 },

    #[error("deployment template {template_id}: {reason}")]
    Template { template_id: String, reason: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed formatting output: {0}")]
    Format(#[source] std::io::Error),

    #[error("deployment tracking failed: {0}")]
    Track(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeploymentError>;
