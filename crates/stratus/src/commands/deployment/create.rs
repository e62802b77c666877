use crate::output;
use crate::track::ProgressTracker;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stratus_api::{ClientConfig, DeploymentApi, HttpDeploymentApi};
use stratus_config::Config;
use stratus_deployment::{
    BuildParams, CreateContext, CreateInput, CreateOptions, InstanceSpec, size, topology,
};

fn memory_size(input: &str) -> Result<u32, String> {
    size::parse(input).map_err(|e| e.to_string())
}

/// Create a deployment from a definition file or from per-service flags
///
/// Without --file, the request is assembled from the deployment template of
/// the configured region. --es-node-topology takes a JSON object per node
/// tier, e.g. '{"node_type":"data","size":"8g","zone_count":2}'.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// DeploymentCreateRequest file definition (JSON or YAML)
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Deployment template ID on which to base the deployment from
    #[arg(long = "deployment-template")]
    pub deployment_template: Option<String>,

    /// Version to use, if not specified, the latest available stack version will be used
    #[arg(long)]
    pub version: Option<String>,

    /// Optional name for the deployment
    #[arg(long)]
    pub name: Option<String>,

    /// Wait until the deployment resources finish their plans
    #[arg(short = 't', long)]
    pub track: bool,

    /// Seconds to wait for the deployment when tracking
    #[arg(long = "track-timeout", default_value_t = 1800)]
    pub track_timeout: u64,

    /// Print the deployment payload without creating the deployment resources
    #[arg(long)]
    pub generate_payload: bool,

    /// Request ID shown on stderr when a previous creation failed; reusing it
    /// recreates the same deployment instead of a second one
    #[arg(long)]
    pub request_id: Option<String>,

    /// Additional plugins to add to the Elasticsearch deployment
    #[arg(long = "plugin", value_delimiter = ',')]
    pub plugins: Vec<String>,

    /// RefId for the Elasticsearch deployment
    #[arg(long = "es-ref-id", default_value = "main-elasticsearch")]
    pub es_ref_id: String,

    /// Number of zones the Elasticsearch instances will span
    #[arg(long = "es-zones", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3))]
    pub es_zones: u32,

    /// Memory (RAM) that each of the Elasticsearch instances will have
    #[arg(long = "es-size", default_value = "4g", value_parser = memory_size)]
    pub es_size: u32,

    /// Elasticsearch node topology element definition (repeatable)
    #[arg(short = 'e', long = "es-node-topology")]
    pub es_node_topology: Vec<String>,

    /// RefId for the Kibana deployment
    #[arg(long = "kibana-ref-id", default_value = "main-kibana")]
    pub kibana_ref_id: String,

    /// Number of zones the Kibana instances will span
    #[arg(long = "kibana-zones", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3))]
    pub kibana_zones: u32,

    /// Memory (RAM) that each of the Kibana instances will have; adds Kibana [default when added: 1g]
    #[arg(long = "kibana-size", value_parser = memory_size)]
    pub kibana_size: Option<u32>,

    /// Enables APM for the deployment
    #[arg(long)]
    pub apm: bool,

    /// RefId for the APM deployment
    #[arg(long = "apm-ref-id", default_value = "main-apm")]
    pub apm_ref_id: String,

    /// Number of zones the APM instances will span
    #[arg(long = "apm-zones", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3))]
    pub apm_zones: u32,

    /// Memory (RAM) that each of the APM instances will have [default: 0.5g]
    #[arg(long = "apm-size", value_parser = memory_size)]
    pub apm_size: Option<u32>,

    /// Enables App Search for the deployment
    #[arg(long)]
    pub appsearch: bool,

    /// RefId for the App Search deployment
    #[arg(long = "appsearch-ref-id", default_value = "main-appsearch")]
    pub appsearch_ref_id: String,

    /// Number of zones the App Search instances will span
    #[arg(long = "appsearch-zones", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3))]
    pub appsearch_zones: u32,

    /// Memory (RAM) that each of the App Search instances will have [default: 2g]
    #[arg(long = "appsearch-size", value_parser = memory_size)]
    pub appsearch_size: Option<u32>,

    /// Enables Enterprise Search for the deployment
    #[arg(long = "enterprise_search")]
    pub enterprise_search: bool,

    /// RefId for the Enterprise Search deployment
    #[arg(
        long = "enterprise_search-ref-id",
        default_value = "main-enterprise_search"
    )]
    pub enterprise_search_ref_id: String,

    /// Number of zones the Enterprise Search instances will span
    #[arg(long = "enterprise_search-zones", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3))]
    pub enterprise_search_zones: u32,

    /// Memory (RAM) that each of the Enterprise Search instances will have [default: 4g]
    #[arg(long = "enterprise_search-size", value_parser = memory_size)]
    pub enterprise_search_size: Option<u32>,
}

impl CreateArgs {
    /// Build parameters from the per-service flags
    pub fn build_params(&self, region: &str) -> stratus_deployment::Result<BuildParams> {
        let mut params = BuildParams::new(region, self.deployment_template.as_deref());
        params.name = self.name.clone();
        params.version = self.version.clone();
        params.plugins = self.plugins.clone();
        params.topology = topology::parse_all(&self.es_node_topology)?;

        params.elasticsearch = InstanceSpec {
            ref_id: self.es_ref_id.clone(),
            size: Some(self.es_size),
            zone_count: self.es_zones,
        };
        params.kibana = InstanceSpec {
            ref_id: self.kibana_ref_id.clone(),
            size: self.kibana_size,
            zone_count: self.kibana_zones,
        };
        params.apm = InstanceSpec {
            ref_id: self.apm_ref_id.clone(),
            size: self.apm_size,
            zone_count: self.apm_zones,
        };
        params.appsearch = InstanceSpec {
            ref_id: self.appsearch_ref_id.clone(),
            size: self.appsearch_size,
            zone_count: self.appsearch_zones,
        };
        params.enterprise_search = InstanceSpec {
            ref_id: self.enterprise_search_ref_id.clone(),
            size: self.enterprise_search_size,
            zone_count: self.enterprise_search_zones,
        };

        params.apm_enable = self.apm;
        params.appsearch_enable = self.appsearch;
        params.enterprise_search_enable = self.enterprise_search;
        Ok(params)
    }

    /// A file definition wins over every per-service flag
    pub fn input(&self, region: &str) -> stratus_deployment::Result<CreateInput> {
        match &self.file {
            Some(path) => {
                tracing::debug!("Reading deployment definition {}", path.display());
                Ok(CreateInput::File(stratus_deployment::read_definition(
                    path,
                )?))
            }
            None => Ok(CreateInput::Flags(self.build_params(region)?)),
        }
    }

    fn options(&self) -> CreateOptions {
        CreateOptions {
            generate_payload: self.generate_payload,
            track: self.track,
            request_id: self.request_id.clone(),
        }
    }
}

pub async fn handle(config: &Config, args: CreateArgs) -> anyhow::Result<()> {
    let input = args.input(&config.region)?;

    let mut client = ClientConfig::new(config.host.clone()).with_timeout(config.timeout());
    client.api_key = config.api_key.clone();
    client.insecure = config.insecure;
    let api: Arc<dyn DeploymentApi> = Arc::new(HttpDeploymentApi::new(client)?);

    let formatter = output::formatter(config.output, args.generate_payload);
    let tracker = ProgressTracker::new(
        api.clone(),
        formatter.as_ref(),
        config.track_interval(),
        Duration::from_secs(args.track_timeout),
    );

    let mut stderr = std::io::stderr();
    let mut ctx = CreateContext {
        api,
        formatter: formatter.as_ref(),
        tracker: &tracker,
        error_device: &mut stderr,
    };
    stratus_deployment::create(&mut ctx, input, args.options()).await?;

    Ok(())
}
