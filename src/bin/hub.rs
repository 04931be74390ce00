use std::sync::Arc;

use clap::Parser;
use telemetry_hub::{
    Hub,
    api::{ApiConfig, ApiState, spawn_api_server},
    config::{HubConfig, read_config_file},
};
use tracing::{info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (JSON). Defaults are used if omitted
    #[arg(short)]
    file: Option<String>,

    /// Log everything down to TRACE
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    dotenv::dotenv().ok();

    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_targets(vec![
        ("telemetry_hub", level),
        ("tower_http", level),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => HubConfig::default(),
    }
    .with_env_overrides();

    let hub = Hub::from_config(&config).await?;
    info!(
        "metric and alert history are kept in memory only and start empty; \
         known services are restored from {}",
        config.registry_path.display()
    );
    if config.retention.is_none() {
        warn!("no retention configured, per-service history grows without bound");
    }

    let state = ApiState::new(Arc::new(hub));
    let addr = spawn_api_server(ApiConfig::from(&config), state).await?;
    info!("telemetry hub ready on {addr}");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    Ok(())
}
