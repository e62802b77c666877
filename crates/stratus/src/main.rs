mod commands;
mod output;
mod track;

use clap::{Args, Parser, Subcommand};
use stratus_config::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "Manage hosted search deployments from the command line", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command. They override the config file.
#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Control plane API endpoint
    #[arg(long, global = true, env = "STRATUS_HOST")]
    host: Option<String>,

    /// API key used to authenticate against the control plane
    #[arg(long, global = true, env = "STRATUS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Region the deployments are created in
    #[arg(long, global = true, env = "STRATUS_REGION")]
    region: Option<String>,

    /// Output format (text, json)
    #[arg(long, global = true, env = "STRATUS_OUTPUT")]
    output: Option<OutputFormat>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl GlobalArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Manage deployments
    #[command(subcommand)]
    Deployment(DeploymentCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum DeploymentCommands {
    /// Create a deployment
    Create(Box<commands::deployment::create::CreateArgs>),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries payloads and responses, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(global: &GlobalArgs) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    global.apply(&mut config);
    config.validate()?;
    tracing::debug!(
        "Using control plane {} in region {}",
        config.host,
        config.region
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    // Version does not need configuration
    if matches!(cli.command, Commands::Version) {
        println!("stratus {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = load_config(&cli.global)?;

    match cli.command {
        Commands::Deployment(DeploymentCommands::Create(args)) => {
            commands::deployment::create::handle(&config, *args).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}
