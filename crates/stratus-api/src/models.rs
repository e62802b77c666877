//! Wire models for the deployments API
//!
//! Every payload type keeps the fields it does not model in a flattened
//! `extra` map, so a request decoded from a user file is forwarded to the
//! server without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource kinds that make up a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Elasticsearch,
    Kibana,
    Apm,
    Appsearch,
    EnterpriseSearch,
}

impl ResourceKind {
    /// Companion kinds, in the order they are emitted
    pub const COMPANIONS: [ResourceKind; 4] = [
        ResourceKind::Kibana,
        ResourceKind::Apm,
        ResourceKind::Appsearch,
        ResourceKind::EnterpriseSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Elasticsearch => "elasticsearch",
            ResourceKind::Kibana => "kibana",
            ResourceKind::Apm => "apm",
            ResourceKind::Appsearch => "appsearch",
            ResourceKind::EnterpriseSearch => "enterprise_search",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment creation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub resources: DeploymentCreateResources,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resources of a deployment creation request, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentCreateResources {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elasticsearch: Vec<ElasticsearchPayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kibana: Vec<StatelessPayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apm: Vec<StatelessPayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub appsearch: Vec<StatelessPayload>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enterprise_search: Vec<StatelessPayload>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentCreateResources {
    /// Payloads of a companion kind. Returns `None` for elasticsearch.
    pub fn stateless(&self, kind: ResourceKind) -> Option<&Vec<StatelessPayload>> {
        match kind {
            ResourceKind::Elasticsearch => None,
            ResourceKind::Kibana => Some(&self.kibana),
            ResourceKind::Apm => Some(&self.apm),
            ResourceKind::Appsearch => Some(&self.appsearch),
            ResourceKind::EnterpriseSearch => Some(&self.enterprise_search),
        }
    }

    pub fn stateless_mut(&mut self, kind: ResourceKind) -> Option<&mut Vec<StatelessPayload>> {
        match kind {
            ResourceKind::Elasticsearch => None,
            ResourceKind::Kibana => Some(&mut self.kibana),
            ResourceKind::Apm => Some(&mut self.apm),
            ResourceKind::Appsearch => Some(&mut self.appsearch),
            ResourceKind::EnterpriseSearch => Some(&mut self.enterprise_search),
        }
    }

    /// Total number of resources across all kinds
    pub fn len(&self) -> usize {
        self.elasticsearch.len()
            + self.kibana.len()
            + self.apm.len()
            + self.appsearch.len()
            + self.enterprise_search.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Elasticsearch resource of a creation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchPayload {
    pub ref_id: String,

    pub region: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<ElasticsearchPlan>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchPlan {
    #[serde(default)]
    pub cluster_topology: Vec<TopologyElement>,

    #[serde(default)]
    pub elasticsearch: ElasticsearchConfiguration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_template: Option<DeploymentTemplateReference>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_built_in_plugins: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentTemplateReference {
    pub id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentTemplateReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }
}

/// One node tier of a resource topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_configuration_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_roles: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TopologySize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_count: Option<u32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TopologyElement {
    /// Whether this tier serves the given node type, by tier id, node role
    /// or legacy node type flag
    pub fn serves(&self, node_type: &str) -> bool {
        if self.id.as_deref() == Some(node_type) {
            return true;
        }
        if let Some(roles) = &self.node_roles {
            if roles.iter().any(|r| r == node_type) {
                return true;
            }
        }
        self.node_type
            .as_ref()
            .is_some_and(|flags| flags.has(node_type))
    }
}

/// Legacy node type flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeType {
    pub fn has(&self, role: &str) -> bool {
        let flag = match role {
            "data" => self.data,
            "master" => self.master,
            "ingest" => self.ingest,
            "ml" => self.ml,
            other => self.extra.get(other).and_then(Value::as_bool),
        };
        flag.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySize {
    pub resource: String,
    pub value: u32,
}

impl TopologySize {
    /// Memory size in megabytes
    pub fn memory(megabytes: u32) -> Self {
        Self {
            resource: "memory".to_string(),
            value: megabytes,
        }
    }
}

/// Companion resource (kibana, apm, appsearch, enterprise_search)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatelessPayload {
    pub ref_id: String,

    pub elasticsearch_cluster_ref_id: String,

    pub region: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<StatelessPlan>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Companion plan. The application section is keyed by the resource kind
/// (`"kibana": {...}`) and lives in `settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatelessPlan {
    #[serde(default)]
    pub cluster_topology: Vec<TopologyElement>,

    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// Deployment template as returned by the templates endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub deployment_template: DeploymentCreateRequest,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of the create endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentCreateResponse {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub created: bool,

    #[serde(default)]
    pub resources: Vec<DeploymentResource>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResource {
    pub id: String,

    pub kind: ResourceKind,

    pub ref_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Deployment state as returned by the get endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub healthy: bool,

    #[serde(default)]
    pub resources: DeploymentResources,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResources {
    #[serde(default)]
    pub elasticsearch: Vec<ResourceInfo>,

    #[serde(default)]
    pub kibana: Vec<ResourceInfo>,

    #[serde(default)]
    pub apm: Vec<ResourceInfo>,

    #[serde(default)]
    pub appsearch: Vec<ResourceInfo>,

    #[serde(default)]
    pub enterprise_search: Vec<ResourceInfo>,
}

impl DeploymentResources {
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &ResourceInfo)> {
        self.elasticsearch
            .iter()
            .map(|r| (ResourceKind::Elasticsearch, r))
            .chain(self.kibana.iter().map(|r| (ResourceKind::Kibana, r)))
            .chain(self.apm.iter().map(|r| (ResourceKind::Apm, r)))
            .chain(self.appsearch.iter().map(|r| (ResourceKind::Appsearch, r)))
            .chain(
                self.enterprise_search
                    .iter()
                    .map(|r| (ResourceKind::EnterpriseSearch, r)),
            )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub ref_id: String,

    #[serde(default)]
    pub info: ResourceStatus,
}

impl ResourceInfo {
    /// No plan is pending for this resource
    pub fn is_settled(&self) -> bool {
        self.info.plan_info.pending.is_none()
    }

    /// The last finished plan attempt failed
    pub fn has_failed_plan(&self) -> bool {
        self.is_settled()
            && self
                .info
                .plan_info
                .current
                .as_ref()
                .is_some_and(|attempt| !attempt.healthy)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceStatus {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub healthy: bool,

    #[serde(default)]
    pub plan_info: PlanInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<PlanAttempt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanAttempt {
    #[serde(default)]
    pub healthy: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_end_time: Option<String>,
}
