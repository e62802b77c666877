//! Post-create handling: print the response, optionally wait for the plans

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use stratus_api::{DeploymentApi, DeploymentInfo};
use stratus_deployment::{DeploymentError, Formatter, Result, TrackParams, Tracker};
use tokio::time::Instant;

pub struct ProgressTracker<'a> {
    api: Arc<dyn DeploymentApi>,
    formatter: &'a dyn Formatter,
    interval: Duration,
    timeout: Duration,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(
        api: Arc<dyn DeploymentApi>,
        formatter: &'a dyn Formatter,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            formatter,
            interval,
            timeout,
        }
    }

    fn spinner(deployment_id: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Waiting for deployment {}...", deployment_id));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// Poll until every resource is settled, a plan fails or the timeout hits
    async fn wait(&self, deployment_id: &str) -> Result<DeploymentInfo> {
        let pb = Self::spinner(deployment_id);
        let deadline = Instant::now() + self.timeout;

        loop {
            let info = match self.api.get(deployment_id).await {
                Ok(info) => info,
                Err(e) => {
                    pb.abandon_with_message(format!("Tracking failed: {}", e));
                    return Err(e.into());
                }
            };

            if let Some((kind, resource)) = info.resources.iter().find(|(_, r)| r.has_failed_plan())
            {
                let reason = format!(
                    "{} resource {} failed its plan",
                    kind, resource.ref_id
                );
                pb.abandon_with_message(reason.clone());
                return Err(DeploymentError::Track(reason));
            }

            let pending: Vec<String> = info
                .resources
                .iter()
                .filter(|(_, r)| !r.is_settled())
                .map(|(kind, r)| format!("{}/{}", kind, r.ref_id))
                .collect();

            // A fresh deployment may not list its resources yet
            let settled = pending.is_empty() && info.resources.iter().next().is_some();
            if settled {
                pb.finish_with_message(format!("Deployment {} is ready ✓", deployment_id));
                return Ok(info);
            }

            if Instant::now() >= deadline {
                let reason = format!(
                    "timed out after {}s waiting for deployment {}",
                    self.timeout.as_secs(),
                    deployment_id
                );
                pb.abandon_with_message(reason.clone());
                return Err(DeploymentError::Track(reason));
            }

            tracing::debug!("Pending plans on {}: {:?}", deployment_id, pending);
            if !pending.is_empty() {
                pb.set_message(format!("Waiting for {}...", pending.join(", ")));
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[async_trait]
impl<'a> Tracker for ProgressTracker<'a> {
    async fn track(&self, params: TrackParams<'_>) -> Result<()> {
        let value = serde_json::to_value(params.response)?;
        self.formatter
            .format("deployment/create", &value)
            .map_err(DeploymentError::Format)?;

        if !params.track {
            return Ok(());
        }

        let info = self.wait(params.deployment_id).await?;
        let value = serde_json::to_value(&info)?;
        self.formatter
            .format("deployment/status", &value)
            .map_err(DeploymentError::Format)
    }
}
