//! In-memory deployments API for tests

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use stratus_api::{
    ApiError, DeploymentApi, DeploymentCreateResponse, DeploymentInfo, DeploymentTemplate,
};

#[derive(Default)]
pub(crate) struct MockApi {
    template: DeploymentTemplate,
    fail_next_create: AtomicBool,
    pub(crate) template_reads: Mutex<Vec<(String, String)>>,
    pub(crate) creates: Mutex<Vec<(Value, Option<String>)>>,
    deployments_by_request: Mutex<HashMap<String, String>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self {
            template: sample_template(),
            ..Default::default()
        }
    }

    pub(crate) fn with_template(template: DeploymentTemplate) -> Self {
        Self {
            template,
            ..Default::default()
        }
    }

    pub(crate) fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub(crate) fn create_count(&self) -> usize {
        self.creates.lock().unwrap().len()
    }
}

#[async_trait]
impl DeploymentApi for MockApi {
    async fn get_template(
        &self,
        template_id: &str,
        region: &str,
    ) -> stratus_api::Result<DeploymentTemplate> {
        self.template_reads
            .lock()
            .unwrap()
            .push((template_id.to_string(), region.to_string()));
        if template_id == "missing" {
            return Err(ApiError::Status {
                status: 404,
                code: "deployments.template_not_found".to_string(),
                message: "template not found".to_string(),
            });
        }
        Ok(self.template.clone())
    }

    async fn create(
        &self,
        request: &Value,
        request_id: Option<&str>,
    ) -> stratus_api::Result<DeploymentCreateResponse> {
        self.creates
            .lock()
            .unwrap()
            .push((request.clone(), request_id.map(str::to_string)));

        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                code: "root.unexpected_error".to_string(),
                message: "connection reset".to_string(),
            });
        }

        let mut known = self.deployments_by_request.lock().unwrap();
        let next_id = format!("d-{}", known.len() + 1);
        let id = match request_id {
            Some(rid) => known.entry(rid.to_string()).or_insert(next_id).clone(),
            None => next_id,
        };

        Ok(serde_json::from_value(json!({
            "id": id,
            "name": request.get("name"),
            "created": true,
            "resources": [{
                "id": "es-1",
                "kind": "elasticsearch",
                "ref_id": "main-elasticsearch",
                "credentials": { "username": "elastic", "password": "changeme" }
            }]
        }))
        .unwrap())
    }

    async fn get(&self, deployment_id: &str) -> stratus_api::Result<DeploymentInfo> {
        Ok(DeploymentInfo {
            id: deployment_id.to_string(),
            healthy: true,
            ..Default::default()
        })
    }
}

/// A trimmed-down `aws-io-optimized-v2`
pub(crate) fn sample_template() -> DeploymentTemplate {
    serde_json::from_value(json!({
        "id": "aws-io-optimized-v2",
        "name": "I/O Optimized",
        "deployment_template": {
            "resources": {
                "elasticsearch": [{
                    "ref_id": "es-ref-id",
                    "region": "us-east-1",
                    "plan": {
                        "cluster_topology": [
                            {
                                "id": "hot_content",
                                "instance_configuration_id": "aws.data.highio.i3",
                                "node_roles": ["master", "ingest", "data_hot", "data_content"],
                                "node_type": { "data": true, "master": true, "ingest": true },
                                "size": { "resource": "memory", "value": 8192 },
                                "zone_count": 2
                            },
                            {
                                "id": "master",
                                "instance_configuration_id": "aws.master.r5d",
                                "node_roles": ["master"],
                                "node_type": { "data": false, "master": true, "ingest": false, "voting_only": false },
                                "size": { "resource": "memory", "value": 0 },
                                "zone_count": 3
                            },
                            {
                                "id": "ml",
                                "instance_configuration_id": "aws.ml.m5d",
                                "node_roles": ["ml", "remote_cluster_client"],
                                "size": { "resource": "memory", "value": 0 },
                                "zone_count": 1
                            }
                        ],
                        "elasticsearch": { "autoscaling_enabled": false }
                    }
                }],
                "kibana": [{
                    "ref_id": "kibana-ref-id",
                    "elasticsearch_cluster_ref_id": "es-ref-id",
                    "region": "us-east-1",
                    "plan": {
                        "cluster_topology": [{
                            "instance_configuration_id": "aws.kibana.r5d",
                            "size": { "resource": "memory", "value": 1024 },
                            "zone_count": 1
                        }],
                        "kibana": {}
                    }
                }],
                "apm": [{
                    "ref_id": "apm-ref-id",
                    "elasticsearch_cluster_ref_id": "es-ref-id",
                    "region": "us-east-1",
                    "plan": {
                        "cluster_topology": [{
                            "instance_configuration_id": "aws.apm.r5d",
                            "size": { "resource": "memory", "value": 512 },
                            "zone_count": 1
                        }],
                        "apm": {}
                    }
                }],
                "appsearch": [{
                    "ref_id": "appsearch-ref-id",
                    "elasticsearch_cluster_ref_id": "es-ref-id",
                    "region": "us-east-1",
                    "plan": {
                        "cluster_topology": [{
                            "instance_configuration_id": "aws.appsearch.m5d",
                            "size": { "resource": "memory", "value": 2048 },
                            "zone_count": 1
                        }],
                        "appsearch": {}
                    }
                }],
                "enterprise_search": [{
                    "ref_id": "enterprise_search-ref-id",
                    "elasticsearch_cluster_ref_id": "es-ref-id",
                    "region": "us-east-1",
                    "plan": {
                        "cluster_topology": [{
                            "instance_configuration_id": "aws.enterprisesearch.m5d",
                            "size": { "resource": "memory", "value": 4096 },
                            "zone_count": 1
                        }],
                        "enterprise_search": {}
                    }
                }]
            }
        }
    }))
    .unwrap()
}
