use anyhow::Result;
use clap::Parser;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nutrition_insights_server::config;
use nutrition_insights_server::dataset::DataSource;
use nutrition_insights_server::server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the nutrition CSV. Defaults to All_Diets.csv in the working directory.
    #[clap(long, value_parser = parse_path)]
    pub csv_path: Option<PathBuf>,

    /// Full url of the dataset blob: {endpoint}/{container}/{blob}.
    #[clap(long, conflicts_with = "csv_path")]
    pub blob_url: Option<String>,

    /// Shared access token appended to the blob url.
    #[clap(long, requires = "blob_url")]
    pub blob_sas_token: Option<String>,

    /// The address to bind.
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 5000)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            csv_path: args.csv_path.clone(),
            blob_url: args.blob_url.clone(),
            blob_sas_token: args.blob_sas_token.clone(),
            host: args.host.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  source: {}", app_config.data_source.describe());
    info!("  bind: {}:{}", app_config.host, app_config.port);
    info!("  requests logging: {}", app_config.logging_level);

    if let DataSource::File(path) = &app_config.data_source {
        if !path.is_file() {
            warn!("Dataset file {:?} does not exist, data endpoints will fail", path);
        }
    }

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        host: app_config.host,
        port: app_config.port,
        metrics_port: app_config.metrics_port,
    };
    run_server(server_config, app_config.data_source).await
}
