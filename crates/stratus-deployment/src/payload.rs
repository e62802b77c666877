//! Deployment creation payload builder
//!
//! Turns the flag-driven build parameters into a [`DeploymentCreateRequest`],
//! taking per-kind topology shapes from the deployment template. File
//! definitions are read by [`read_definition`] and bypass the builder.

use crate::error::{DeploymentError, Result};
use crate::template::default_template;
use crate::topology::NodeTopology;
use serde_json::{Map, Value};
use std::path::Path;
use stratus_api::{
    DeploymentApi, DeploymentCreateRequest, DeploymentTemplate, DeploymentTemplateReference,
    ElasticsearchConfiguration, ElasticsearchPayload, ElasticsearchPlan, ResourceKind,
    StatelessPayload, StatelessPlan, TopologyElement, TopologySize,
};

/// Default memory in megabytes for each resource kind
pub fn default_size(kind: ResourceKind) -> u32 {
    match kind {
        ResourceKind::Elasticsearch => 4096,
        ResourceKind::Kibana => 1024,
        ResourceKind::Apm => 512,
        ResourceKind::Appsearch => 2048,
        ResourceKind::EnterpriseSearch => 4096,
    }
}

/// Default reference identifier for each resource kind
pub fn default_ref_id(kind: ResourceKind) -> String {
    format!("main-{}", kind)
}

/// Instance parameters for one resource kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    pub ref_id: String,
    /// Explicitly requested memory in megabytes. `None` falls back to
    /// [`default_size`].
    pub size: Option<u32>,
    pub zone_count: u32,
}

impl InstanceSpec {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            ref_id: default_ref_id(kind),
            size: None,
            zone_count: 1,
        }
    }

    /// Explicit non-zero size
    fn requested_size(&self) -> Option<u32> {
        self.size.filter(|mb| *mb > 0)
    }

    fn effective_size(&self, kind: ResourceKind) -> u32 {
        self.requested_size().unwrap_or_else(|| default_size(kind))
    }
}

/// Inputs of the flag-driven payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParams {
    pub name: Option<String>,
    /// Empty means the latest available version
    pub version: Option<String>,
    pub template_id: String,
    pub region: String,
    pub plugins: Vec<String>,
    pub elasticsearch: InstanceSpec,
    pub kibana: InstanceSpec,
    pub apm: InstanceSpec,
    pub appsearch: InstanceSpec,
    pub enterprise_search: InstanceSpec,
    pub apm_enable: bool,
    pub appsearch_enable: bool,
    pub enterprise_search_enable: bool,
    pub topology: Vec<NodeTopology>,
}

impl BuildParams {
    /// Parameters with default instance specs. The template defaults to the
    /// region's template when `template_id` is empty or absent.
    pub fn new(region: impl Into<String>, template_id: Option<&str>) -> Self {
        let region = region.into();
        let template_id = match template_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => default_template(&region).to_string(),
        };

        Self {
            name: None,
            version: None,
            template_id,
            region,
            plugins: Vec::new(),
            elasticsearch: InstanceSpec::new(ResourceKind::Elasticsearch),
            kibana: InstanceSpec::new(ResourceKind::Kibana),
            apm: InstanceSpec::new(ResourceKind::Apm),
            appsearch: InstanceSpec::new(ResourceKind::Appsearch),
            enterprise_search: InstanceSpec::new(ResourceKind::EnterpriseSearch),
            apm_enable: false,
            appsearch_enable: false,
            enterprise_search_enable: false,
            topology: Vec::new(),
        }
    }

    pub fn instance(&self, kind: ResourceKind) -> &InstanceSpec {
        match kind {
            ResourceKind::Elasticsearch => &self.elasticsearch,
            ResourceKind::Kibana => &self.kibana,
            ResourceKind::Apm => &self.apm,
            ResourceKind::Appsearch => &self.appsearch,
            ResourceKind::EnterpriseSearch => &self.enterprise_search,
        }
    }

    fn enabled(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Elasticsearch => true,
            ResourceKind::Kibana => false,
            ResourceKind::Apm => self.apm_enable,
            ResourceKind::Appsearch => self.appsearch_enable,
            ResourceKind::EnterpriseSearch => self.enterprise_search_enable,
        }
    }

    /// Memory for a resource that will be emitted, or `None` when the kind
    /// is not part of the deployment
    ///
    /// A companion is emitted when its enable flag is set or when a non-zero
    /// size was asked for explicitly. A zero size never enables a companion.
    pub fn emitted_size(&self, kind: ResourceKind) -> Option<u32> {
        let spec = self.instance(kind);
        if self.enabled(kind) || spec.requested_size().is_some() {
            Some(spec.effective_size(kind))
        } else {
            None
        }
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }

    fn validate(&self) -> Result<()> {
        if self.template_id.is_empty() {
            return Err(DeploymentError::Template {
                template_id: String::new(),
                reason: "template identifier cannot be empty".to_string(),
            });
        }
        let kinds = std::iter::once(ResourceKind::Elasticsearch).chain(ResourceKind::COMPANIONS);
        for kind in kinds {
            let spec = self.instance(kind);
            if self.emitted_size(kind).is_some() && spec.zone_count == 0 {
                return Err(DeploymentError::InvalidZoneCount {
                    kind,
                    value: spec.zone_count,
                });
            }
        }
        Ok(())
    }
}

/// Build the creation request from flag parameters
///
/// Reads the deployment template; never calls the create endpoint.
pub async fn build_payload(
    params: &BuildParams,
    api: &dyn DeploymentApi,
) -> Result<DeploymentCreateRequest> {
    params.validate()?;

    tracing::debug!(
        "Reading deployment template {} in {}",
        params.template_id,
        params.region
    );
    let template = api
        .get_template(&params.template_id, &params.region)
        .await?;

    let mut request = DeploymentCreateRequest::default();
    request
        .resources
        .elasticsearch
        .push(elasticsearch_payload(params, &template)?);

    for kind in ResourceKind::COMPANIONS {
        let Some(size) = params.emitted_size(kind) else {
            continue;
        };
        let payload = stateless_payload(params, &template, kind, size)?;
        if let Some(resources) = request.resources.stateless_mut(kind) {
            resources.push(payload);
        }
    }

    if let Some(name) = params.name.as_deref().filter(|n| !n.is_empty()) {
        request.name = Some(name.to_string());
    }

    tracing::info!(
        "Assembled deployment payload with {} resource(s) from template {}",
        request.resources.len(),
        params.template_id
    );
    Ok(request)
}

fn template_error(params: &BuildParams, reason: impl Into<String>) -> DeploymentError {
    DeploymentError::Template {
        template_id: params.template_id.clone(),
        reason: reason.into(),
    }
}

fn elasticsearch_payload(
    params: &BuildParams,
    template: &DeploymentTemplate,
) -> Result<ElasticsearchPayload> {
    let shape = template
        .deployment_template
        .resources
        .elasticsearch
        .first()
        .ok_or_else(|| template_error(params, "has no elasticsearch resource"))?;
    let plan = shape
        .plan
        .as_ref()
        .ok_or_else(|| template_error(params, "has no elasticsearch plan"))?;
    let tiers = &plan.cluster_topology;

    let cluster_topology = if params.topology.is_empty() {
        let mut topology = tiers.clone();
        let first = topology
            .first_mut()
            .ok_or_else(|| template_error(params, "has no elasticsearch topology"))?;
        first.size = Some(TopologySize::memory(
            params
                .elasticsearch
                .effective_size(ResourceKind::Elasticsearch),
        ));
        first.zone_count = Some(params.elasticsearch.zone_count);
        topology
    } else {
        // Tier index and the node type that selected it
        let mut selected: Vec<(usize, &str)> = Vec::with_capacity(params.topology.len());
        let mut topology = Vec::with_capacity(params.topology.len());
        for element in &params.topology {
            let index = find_tier(tiers, &element.node_type).ok_or_else(|| {
                template_error(
                    params,
                    format!("no topology for node type \"{}\"", element.node_type),
                )
            })?;
            if let Some((_, previous)) = selected.iter().find(|(i, _)| *i == index) {
                return Err(template_error(
                    params,
                    format!(
                        "node types \"{}\" and \"{}\" select the same topology \"{}\"",
                        previous,
                        element.node_type,
                        tiers[index].id.as_deref().unwrap_or("-")
                    ),
                ));
            }
            selected.push((index, &element.node_type));

            let mut tier = tiers[index].clone();
            let zone_count = match element.zone_count {
                0 => tier.zone_count.filter(|z| *z > 0).unwrap_or(1),
                n => n,
            };
            tier.size = Some(TopologySize::memory(element.size));
            tier.zone_count = Some(zone_count);
            topology.push(tier);
        }
        topology
    };

    Ok(ElasticsearchPayload {
        ref_id: params.elasticsearch.ref_id.clone(),
        region: params.region.clone(),
        plan: Some(ElasticsearchPlan {
            cluster_topology,
            elasticsearch: ElasticsearchConfiguration {
                version: params.version().map(str::to_string),
                enabled_built_in_plugins: (!params.plugins.is_empty())
                    .then(|| params.plugins.clone()),
                extra: plan.elasticsearch.extra.clone(),
            },
            deployment_template: Some(DeploymentTemplateReference::new(
                params.template_id.clone(),
            )),
            extra: plan.extra.clone(),
        }),
        extra: Map::new(),
    })
}

/// Index of the tier for a node type. Tier ids win over roles and legacy
/// node type flags.
fn find_tier(tiers: &[TopologyElement], node_type: &str) -> Option<usize> {
    if node_type.is_empty() {
        return None;
    }
    tiers
        .iter()
        .position(|tier| tier.id.as_deref() == Some(node_type))
        .or_else(|| tiers.iter().position(|tier| tier.serves(node_type)))
}

fn stateless_payload(
    params: &BuildParams,
    template: &DeploymentTemplate,
    kind: ResourceKind,
    size: u32,
) -> Result<StatelessPayload> {
    let spec = params.instance(kind);
    let shape = template
        .deployment_template
        .resources
        .stateless(kind)
        .and_then(|resources| resources.first())
        .ok_or_else(|| template_error(params, format!("does not support {}", kind)))?;

    let mut tier = shape
        .plan
        .as_ref()
        .and_then(|plan| plan.cluster_topology.first())
        .cloned()
        .unwrap_or_default();
    tier.size = Some(TopologySize::memory(size));
    tier.zone_count = Some(spec.zone_count);

    let mut settings = shape
        .plan
        .as_ref()
        .map(|plan| plan.settings.clone())
        .unwrap_or_default();
    let section = settings
        .entry(kind.as_str())
        .or_insert_with(|| Value::Object(Map::new()));
    if !section.is_object() {
        *section = Value::Object(Map::new());
    }
    if let (Some(version), Value::Object(section)) = (params.version(), section) {
        section.insert("version".to_string(), Value::String(version.to_string()));
    }

    Ok(StatelessPayload {
        ref_id: spec.ref_id.clone(),
        elasticsearch_cluster_ref_id: params.elasticsearch.ref_id.clone(),
        region: params.region.clone(),
        plan: Some(StatelessPlan {
            cluster_topology: vec![tier],
            settings,
        }),
        extra: Map::new(),
    })
}

/// Read a creation request from a user file
///
/// YAML is accepted for `.yaml`/`.yml` files, JSON otherwise. The content must
/// have the shape of a [`DeploymentCreateRequest`], but the returned value is
/// the file content itself, forwarded without re-encoding.
pub fn read_definition(path: &Path) -> Result<Value> {
    let file_error = |source: Box<dyn std::error::Error + Send + Sync>| {
        DeploymentError::FileDefinition { source }
    };

    let content = std::fs::read_to_string(path).map_err(|e| file_error(Box::new(e)))?;
    let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|e| file_error(Box::new(e)))?
        }
        _ => serde_json::from_str(&content).map_err(|e| file_error(Box::new(e)))?,
    };

    serde_json::from_value::<DeploymentCreateRequest>(value.clone())
        .map_err(|e| file_error(Box::new(e)))?;
    Ok(value)
}
