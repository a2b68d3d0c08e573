use anyhow::Context;
use clap::Parser;
use log::info;
use sensorcore::Metric;
use sensorfeed::{BootstrapPolicy, FeedConfig, LogRenderer, Session};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

#[derive(Parser)]
#[command(author, version, about = "Follow live temperature and humidity readings from a sensor hub")]
struct Args {
    /// Load feed settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the sensor hub, overrides the config file
    #[arg(long)]
    hub_url: Option<String>,
    /// Keep loading history when one sensor's fetch fails
    #[arg(long, default_value_t = false)]
    skip_failed_sensors: bool,
    /// Load history, print the store as JSON and exit
    #[arg(long, default_value_t = false)]
    bootstrap_only: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FeedConfig::load(path)?,
        None => FeedConfig::default(),
    };
    if let Some(hub_url) = args.hub_url {
        config.hub_url = hub_url;
    }
    if args.skip_failed_sensors {
        config.bootstrap.on_error = BootstrapPolicy::Skip;
    }

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime")?;
    runtime.block_on(run(config, args.bootstrap_only))
}

async fn run(config: FeedConfig, bootstrap_only: bool) -> anyhow::Result<()> {
    info!("following sensor hub at {}", config.hub_url);
    let mut session = Session::new(
        config,
        LogRenderer::new(Metric::Temperature),
        LogRenderer::new(Metric::Humidity),
    )?;

    if bootstrap_only {
        let outcome = session.bootstrap().await;
        println!("{}", serde_json::to_string_pretty(session.store())?);
        return outcome;
    }

    let metrics = session.metrics().clone();
    tokio::select! {
        result = session.run() => result,
        interrupted = signal::ctrl_c() => {
            interrupted.context("awaiting Ctrl+C to exit")?;
            let snapshot = metrics.snapshot();
            info!(
                "stopping: {} readings applied, {} malformed, {} disconnects, {} redraws",
                snapshot.readings_applied,
                snapshot.decode_failures,
                snapshot.disconnects,
                snapshot.renders
            );
            Ok(())
        }
    }
}
