//! mackerel-plugin-nasne - nasne recorder metrics for mackerel-agent
//!
//! Runs one collection cycle against the device and prints either metric
//! values or graph definitions to stdout, as the agent requested.

use anyhow::{Context, Result};
use clap::Parser;
use mackerel_plugin_nasne::{
    cli::Cli,
    config::Config,
    device::HttpDeviceClient,
    plugin::{OutputMode, PluginRunner},
    reporter::MetricsReporter,
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli).context("failed to load configuration")?;

    // Stdout carries the plugin protocol, so logs go to stderr.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(
        address = %cli.address,
        prefix = %config.metric_key_prefix,
        status_port = config.device.status_port,
        recorded_port = config.device.recorded_port,
        timeout_seconds = config.device.timeout_seconds,
        "Configuration loaded"
    );

    let client = HttpDeviceClient::new(&cli.address, &config.device)
        .context("failed to create device client")?;
    let reporter = MetricsReporter::new(client, config.metric_key_prefix);
    let mode = OutputMode::from_env();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    PluginRunner::new(reporter)
        .run(mode, &mut out)
        .inspect_err(|e| error!(error = %e, ?mode, "Collection cycle failed"))
}
