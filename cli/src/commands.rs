pub mod devices;
pub mod payload;
pub mod resolve;
pub mod watch;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arnet_common::config::{Config, DEFAULT_REGISTRY_PATH, ProbeConfig};
use arnet_core::{DeviceRegistry, DiagnosticsAggregator};
use clap::{ArgAction, Args, Parser, Subcommand};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Parser)]
#[command(name = "arnet")]
#[command(version, about = "Resolve scanned device labels into live network diagnostics.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Device registry document (JSON)
    #[arg(long, global = true, env = "ARNET_DEVICE_MAP", default_value = DEFAULT_REGISTRY_PATH)]
    pub registry: PathBuf,

    /// More log output; repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less decoration; -qq prints results only
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Echo requests sent per ping
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub ping_count: Option<u32>,

    /// Wait for each echo reply, in ms
    #[arg(long, global = true, value_name = "MS")]
    pub ping_wait: Option<u64>,

    /// Hard limit for a whole ping run, in ms
    #[arg(long, global = true, value_name = "MS")]
    pub ping_timeout: Option<u64>,

    /// TCP connect timeout per port, in ms
    #[arg(long, global = true, value_name = "MS")]
    pub port_timeout: Option<u64>,

    /// Port probes in flight at once
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=64))]
    pub concurrency: Option<u16>,

    /// Fail when the ping binary is missing instead of reporting the device as down
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a scanned payload into a diagnostics record
    #[command(alias = "r")]
    Resolve {
        /// Decoded QR text, e.g. '{"device_id": "SW1", "ip": "192.168.1.10"}'
        payload: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve once, then keep re-pinging the device
    #[command(alias = "w")]
    Watch {
        payload: String,
        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 5)]
        interval: u64,
    },
    /// Print the QR payload for a device
    #[command(alias = "p")]
    Payload { device_id: String, ip: IpAddr },
    /// List registered devices
    #[command(alias = "d")]
    Devices,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            registry_path: self.registry.clone(),
            quiet: self.quiet,
            probe: self.probe.apply(ProbeConfig::default()),
        }
    }
}

impl ProbeArgs {
    fn apply(&self, mut probe: ProbeConfig) -> ProbeConfig {
        if let Some(count) = self.ping_count {
            probe.ping.sample_count = count;
        }
        if let Some(ms) = self.ping_wait {
            probe.ping.per_attempt_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.ping_timeout {
            probe.ping.overall_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.port_timeout {
            probe.port_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = self.concurrency {
            probe.port_concurrency = usize::from(n);
        }
        probe.strict_ping_facility = self.strict;
        probe
    }
}

pub fn build_aggregator(cfg: &Config) -> DiagnosticsAggregator {
    let registry = Arc::new(DeviceRegistry::load_or_empty(&cfg.registry_path));
    debug!("{} devices registered", registry.len());
    DiagnosticsAggregator::with_system_probes(registry, cfg.probe.clone())
}

/// Cancels `token` on Ctrl-C. Abort the handle once the guarded work is done.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling");
            token.cancel();
        }
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
