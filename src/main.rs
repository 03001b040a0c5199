use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use vpp_snmp_agent::*;

use crate::agent::SnmpAgent;
use crate::collector::{CollectorConfig, SharedSnapshot};
use crate::config::AgentConfig;
use crate::transport::{LogTransport, MasterTransport};
use crate::vpp::sim::SimBackend;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// SNMP agent for VPP interface counters.
///
/// Runs the collector and record pipeline against the built-in simulated
/// dataplane; production deployments plug real VPP bindings into the
/// `vpp_snmp_agent` library traits.
#[derive(Parser, Debug)]
#[command(name = "vpp-snmp-agentd", version)]
struct Cli {
    /// SNMP AgentX address
    #[arg(short, long)]
    address: Option<String>,

    /// Data polling period in seconds
    #[arg(short, long)]
    period: Option<u64>,

    /// VPP API timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Configuration TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Run one sampling pass, dump the record set as JSON lines, exit
    #[arg(long)]
    oneshot: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let mut app_config = AgentConfig::load(cli.config.as_deref());
    app_config.apply_overrides(cli.address, cli.period, cli.timeout);
    app_config.validate()?;

    tracing::info!(
        version = version::VERSION,
        address = %app_config.agent.address,
        period_secs = app_config.polling.period_secs,
        timeout_secs = app_config.polling.timeout_secs,
        "starting {}",
        version::NAME
    );

    let backend = SimBackend::typical();
    tracing::warn!("no VPP bindings in this build, sampling the simulated dataplane");
    let (api, stats) = backend.clients();

    let shared = SharedSnapshot::new();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let collector_handle = collector::spawn(
        api,
        stats,
        shared.clone(),
        CollectorConfig {
            poll_interval: Duration::from_secs(app_config.polling.period_secs),
            timeout: Duration::from_secs(app_config.polling.timeout_secs),
            ..CollectorConfig::default()
        },
        shutdown_rx,
    );

    let first = collector::wait_until_ready(&shared).await?;
    tracing::info!(
        interfaces = first.interface_order.len(),
        "data collector ready"
    );

    let agent = SnmpAgent::new(shared, app_config.agent.speed_cap);
    let mut transport = LogTransport::new(app_config.agent.address.as_str(), cli.oneshot);
    agent.setup(&mut transport).await?;

    if cli.oneshot {
        let records = agent.update();
        transport.publish(&records).await?;
        let _ = shutdown_tx.send(());
        let _ = collector_handle.await;
        return Ok(());
    }

    let period = Duration::from_secs(app_config.polling.period_secs);
    tokio::select! {
        result = agent.run(&mut transport, period) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("received shutdown signal");
        }
    }

    let _ = shutdown_tx.send(());
    let _ = collector_handle.await;
    Ok(())
}
