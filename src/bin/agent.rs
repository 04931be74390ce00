use clap::Parser;
use telemetry_hub::agent::{Agent, AgentConfig, HostSampler};
use tracing::{level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Periodically pushes host metrics to a telemetry hub.
///
/// Configured through INGEST_URL, AGENT_ID, AGENT_TOKEN, INTERVAL_SECONDS and
/// REQUEST_TIMEOUT (a `.env` file is honoured).
#[derive(Debug, Clone, Parser)]
struct Args {
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
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(true),
        )
        .with(filter::Targets::new().with_targets(vec![
            ("telemetry_hub", level),
            ("telemetry_agent", level),
        ]))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);

    let config = AgentConfig::from_env();
    trace!("loaded agent config: {config:?}");

    let agent = Agent::new(config)?;
    tokio::select! {
        _ = agent.run(HostSampler::new()) => {}
        result = tokio::signal::ctrl_c() => result?,
    }

    Ok(())
}
