//! Deployment creation
//!
//! Dispatches the request input once (file or flags), then either prints
//! the payload or submits it with an idempotency token and hands the
//! response to a [`Tracker`].

use crate::error::{DeploymentError, Result};
use crate::payload::{BuildParams, build_payload};
use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::io::Write;
use std::sync::Arc;
use serde_json::Value;
use stratus_api::{DeploymentApi, DeploymentCreateResponse};

const REQUEST_ID_LENGTH: usize = 64;

pub const CREATE_FAILURE_MESSAGE: &str = "The deployment creation returned with an error. Use the displayed request ID to recreate the deployment resources";

/// Renders values on the output device
pub trait Formatter: Send + Sync {
    /// `kind` names what is being rendered, e.g. `deployment/create`
    fn format(&self, kind: &str, value: &Value) -> std::io::Result<()>;
}

/// What the tracker receives after a successful create call
#[derive(Debug, Clone, Copy)]
pub struct TrackParams<'a> {
    pub deployment_id: &'a str,
    /// Wait for the deployment plans to finish
    pub track: bool,
    pub response: &'a DeploymentCreateResponse,
}

#[async_trait]
pub trait Tracker: Send + Sync {
    async fn track(&self, params: TrackParams<'_>) -> Result<()>;
}

/// Source of the creation request
#[derive(Debug, Clone)]
pub enum CreateInput {
    /// Content of a user file, forwarded as is
    File(Value),
    /// Assembled from command line flags
    Flags(BuildParams),
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Print the payload instead of submitting it
    pub generate_payload: bool,
    pub track: bool,
    pub request_id: Option<String>,
}

/// Handles shared by the create pipeline
pub struct CreateContext<'a> {
    pub api: Arc<dyn DeploymentApi>,
    pub formatter: &'a dyn Formatter,
    pub tracker: &'a dyn Tracker,
    pub error_device: &'a mut (dyn Write + Send),
}

/// Return the supplied request ID, or a fresh random one
pub fn request_id(supplied: Option<&str>) -> String {
    match supplied {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(REQUEST_ID_LENGTH)
            .map(char::from)
            .collect(),
    }
}

/// Resolve the request body for an input
pub async fn resolve_payload(input: CreateInput, api: &dyn DeploymentApi) -> Result<Value> {
    match input {
        CreateInput::File(request) => Ok(request),
        CreateInput::Flags(params) => Ok(serde_json::to_value(
            build_payload(&params, api).await?,
        )?),
    }
}

fn write_advisory<W: Write + ?Sized>(device: &mut W, request_id: &str) -> std::io::Result<()> {
    writeln!(device, "{}", CREATE_FAILURE_MESSAGE)?;
    writeln!(device, "Request ID: {}", request_id)?;
    device.flush()
}

/// Create a deployment
///
/// Never retries. On a failed create call the request ID is written to the
/// error device so the user can resubmit it.
pub async fn create(
    ctx: &mut CreateContext<'_>,
    input: CreateInput,
    options: CreateOptions,
) -> Result<()> {
    let payload = resolve_payload(input, ctx.api.as_ref()).await?;

    if options.generate_payload {
        return ctx
            .formatter
            .format("deployment/payload", &payload)
            .map_err(DeploymentError::Format);
    }

    let request_id = request_id(options.request_id.as_deref());
    tracing::info!("Submitting deployment creation (request ID {})", request_id);

    let response = match ctx.api.create(&payload, Some(&request_id)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Deployment creation failed: {}", e);
            if let Err(write_err) = write_advisory(&mut *ctx.error_device, &request_id) {
                tracing::warn!(
                    "Could not write the retry advisory ({}); request ID was {}",
                    write_err,
                    request_id
                );
            }
            return Err(e.into());
        }
    };

    ctx.tracker
        .track(TrackParams {
            deployment_id: &response.id,
            track: options.track,
            response: &response,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFormatter {
        values: Mutex<Vec<(String, Value)>>,
    }

    impl Formatter for RecordingFormatter {
        fn format(&self, kind: &str, value: &Value) -> std::io::Result<()> {
            self.values
                .lock()
                .unwrap()
                .push((kind.to_string(), value.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingTracker {
        tracked: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl Tracker for RecordingTracker {
        async fn track(&self, params: TrackParams<'_>) -> Result<()> {
            assert_eq!(params.deployment_id, params.response.id);
            self.tracked
                .lock()
                .unwrap()
                .push((params.deployment_id.to_string(), params.track));
            Ok(())
        }
    }

    struct Harness {
        api: Arc<MockApi>,
        formatter: RecordingFormatter,
        tracker: RecordingTracker,
        stderr: Vec<u8>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                api: Arc::new(MockApi::new()),
                formatter: RecordingFormatter::default(),
                tracker: RecordingTracker::default(),
                stderr: Vec::new(),
            }
        }

        async fn run(&mut self, input: CreateInput, options: CreateOptions) -> Result<()> {
            let mut ctx = CreateContext {
                api: self.api.clone(),
                formatter: &self.formatter,
                tracker: &self.tracker,
                error_device: &mut self.stderr,
            };
            create(&mut ctx, input, options).await
        }

        fn stderr(&self) -> String {
            String::from_utf8(self.stderr.clone()).unwrap()
        }
    }

    fn flags() -> CreateInput {
        CreateInput::Flags(BuildParams::new("us-east-1", None))
    }

    #[test]
    fn test_request_id_is_kept_or_generated() {
        assert_eq!(request_id(Some("R1")), "R1");

        let generated = request_id(None);
        assert_eq!(generated.len(), REQUEST_ID_LENGTH);
        assert!(generated.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(request_id(Some("")).len(), REQUEST_ID_LENGTH);
        assert_ne!(request_id(None), generated);
    }

    #[tokio::test]
    async fn test_generate_payload_skips_create() {
        let mut h = Harness::new();
        let mut params = BuildParams::new("us-east-1", None);
        params.apm_enable = true;

        h.run(
            CreateInput::Flags(params.clone()),
            CreateOptions {
                generate_payload: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(h.api.create_count(), 0);
        assert!(h.tracker.tracked.lock().unwrap().is_empty());

        // The printed payload is what would have been submitted
        let expected = build_payload(&params, h.api.as_ref()).await.unwrap();
        let values = h.formatter.values.lock().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].0, "deployment/payload");
        assert_eq!(values[0].1, serde_json::to_value(&expected).unwrap());
        assert_eq!(values[0].1["resources"]["apm"][0]["ref_id"], "main-apm");
    }

    #[tokio::test]
    async fn test_create_hands_off_to_tracker() {
        let mut h = Harness::new();

        h.run(
            flags(),
            CreateOptions {
                track: true,
                request_id: Some("R7".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let creates = h.api.creates.lock().unwrap();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].1.as_deref(), Some("R7"));
        assert_eq!(
            h.tracker.tracked.lock().unwrap().as_slice(),
            &[("d-1".to_string(), true)]
        );
        assert!(h.stderr().is_empty());
    }

    #[tokio::test]
    async fn test_generated_request_id_reaches_create() {
        let mut h = Harness::new();
        h.run(flags(), CreateOptions::default()).await.unwrap();

        let creates = h.api.creates.lock().unwrap();
        let sent = creates[0].1.as_deref().unwrap();
        assert_eq!(sent.len(), REQUEST_ID_LENGTH);
    }

    #[tokio::test]
    async fn test_failure_writes_request_id_advisory() {
        let mut h = Harness::new();
        h.api.fail_next_create();

        let err = h
            .run(
                flags(),
                CreateOptions {
                    request_id: Some("R1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DeploymentError::Api(_)));
        assert_eq!(
            h.stderr(),
            format!("{}\nRequest ID: R1\n", CREATE_FAILURE_MESSAGE)
        );
        assert!(h.tracker.tracked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_advisory_shows_generated_id() {
        let mut h = Harness::new();
        h.api.fail_next_create();

        assert!(h.run(flags(), CreateOptions::default()).await.is_err());

        let sent = h.api.creates.lock().unwrap()[0].1.clone().unwrap();
        let stderr = h.stderr();
        let lines: Vec<&str> = stderr.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CREATE_FAILURE_MESSAGE);
        assert_eq!(lines[1], format!("Request ID: {}", sent));
    }

    struct BrokenDevice;

    impl Write for BrokenDevice {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unwritable_error_device_still_returns_create_error() {
        let api = Arc::new(MockApi::new());
        api.fail_next_create();
        let formatter = RecordingFormatter::default();
        let tracker = RecordingTracker::default();
        let mut device = BrokenDevice;
        let mut ctx = CreateContext {
            api: api.clone(),
            formatter: &formatter,
            tracker: &tracker,
            error_device: &mut device,
        };

        let err = create(&mut ctx, flags(), CreateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DeploymentError::Api(_)));
        assert_eq!(api.create_count(), 1);
        assert!(tracker.tracked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retry_with_same_request_id_returns_same_deployment() {
        let mut h = Harness::new();
        h.api.fail_next_create();
        let options = CreateOptions {
            request_id: Some("R1".to_string()),
            ..Default::default()
        };

        assert!(h.run(flags(), options.clone()).await.is_err());
        h.run(flags(), options.clone()).await.unwrap();
        h.run(flags(), options).await.unwrap();

        let tracked = h.tracker.tracked.lock().unwrap();
        assert_eq!(tracked.len(), 2);
        assert_eq!(tracked[0].0, tracked[1].0);
    }

    #[tokio::test]
    async fn test_file_input_is_submitted_verbatim() {
        let mut h = Harness::new();
        let request = serde_json::json!({
            "name": "from-file",
            "resources": {
                "elasticsearch": [{ "ref_id": "custom", "region": "azure-eastus", "plan": {} }]
            },
            "settings": { "observability": {} }
        });

        h.run(CreateInput::File(request.clone()), CreateOptions::default())
            .await
            .unwrap();

        assert!(h.api.template_reads.lock().unwrap().is_empty());
        let creates = h.api.creates.lock().unwrap();
        assert_eq!(creates[0].0, request);
    }
}
