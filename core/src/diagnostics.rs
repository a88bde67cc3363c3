//! # Diagnostics Aggregator
//!
//! Implements the "resolve a scanned device" use case.
//!
//! Orchestrates the resolution by:
//! 1. looking the device up in the [`DeviceRegistry`] (a miss aborts before any probing),
//! 2. pinging the address once through the [`PingProbe`],
//! 3. probing the well-known ports plus the device's declared ports through the [`PortProbe`],
//! 4. assembling a fresh [`DiagnosticsRecord`].
//!
//! Steps 2 and 3 are independent and run concurrently. The aggregator keeps no
//! state between calls apart from the immutable registry.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;

use arnet_common::config::ProbeConfig;
use arnet_common::device::{DevicePayload, DeviceRecord, UNKNOWN};
use arnet_common::diagnostics::{DiagnosticsRecord, PingResult, PortResult};
use arnet_common::error::ResolveError;
use arnet_common::services;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::probe::{PingProbe, PortProbe, SystemPing, TcpConnectProbe};
use crate::registry::DeviceRegistry;

pub struct DiagnosticsAggregator {
    registry: Arc<DeviceRegistry>,
    pinger: Arc<dyn PingProbe>,
    port_prober: Arc<dyn PortProbe>,
    config: ProbeConfig,
}

impl DiagnosticsAggregator {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        pinger: Arc<dyn PingProbe>,
        port_prober: Arc<dyn PortProbe>,
        config: ProbeConfig,
    ) -> Self {
        Self {
            registry,
            pinger,
            port_prober,
            config,
        }
    }

    /// Wires the aggregator to the system `ping` binary and plain TCP connects.
    pub fn with_system_probes(registry: Arc<DeviceRegistry>, config: ProbeConfig) -> Self {
        Self::new(registry, Arc::new(SystemPing::new()), Arc::new(TcpConnectProbe), config)
    }

    pub async fn resolve_payload(&self, payload: &DevicePayload) -> Result<DiagnosticsRecord, ResolveError> {
        self.resolve(&payload.device_id, payload.ip).await
    }

    /// Produces a complete diagnostics snapshot for a registered device.
    ///
    /// Unreachable hosts and closed ports are part of the record; only an
    /// unregistered device (or, in strict mode, a missing ping facility) is an error.
    #[instrument(skip(self))]
    pub async fn resolve(&self, device_id: &str, address: IpAddr) -> Result<DiagnosticsRecord, ResolveError> {
        let device = self
            .registry
            .lookup(device_id)
            .ok_or_else(|| ResolveError::DeviceUnknown {
                device_id: device_id.to_string(),
            })?;

        let plan = probe_port_plan(&self.config.well_known_ports, device);
        debug!("Probing {} ports on {address}", plan.len());

        let (ping, ports) = tokio::join!(self.ping(address), self.probe_ports(address, plan));
        let ping = ping?;

        Ok(DiagnosticsRecord {
            device_id: device.device_id.clone(),
            address,
            device_type: device.device_type.clone(),
            location: device.location.clone(),
            model: device.model.clone(),
            ping,
            ports,
            captured_at: Utc::now(),
        })
    }

    /// [`DiagnosticsAggregator::resolve`], abandoned as soon as `token` is cancelled.
    ///
    /// Abandoning drops every in-flight probe: the ping child is killed and
    /// pending sockets are closed.
    pub async fn resolve_cancellable(
        &self,
        device_id: &str,
        address: IpAddr,
        token: &CancellationToken,
    ) -> Result<DiagnosticsRecord, ResolveError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ResolveError::Cancelled),
            result = self.resolve(device_id, address) => result,
        }
    }

    /// Re-pings an already resolved device.
    ///
    /// Ports and registry metadata are carried over untouched; only `ping`
    /// and `captured_at` change.
    #[instrument(skip_all, fields(device_id = %record.device_id))]
    pub async fn refresh_ping(&self, record: &DiagnosticsRecord) -> Result<DiagnosticsRecord, ResolveError> {
        let ping = self.ping(record.address).await?;
        Ok(record.with_ping(ping, Utc::now()))
    }

    pub async fn refresh_ping_cancellable(
        &self,
        record: &DiagnosticsRecord,
        token: &CancellationToken,
    ) -> Result<DiagnosticsRecord, ResolveError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ResolveError::Cancelled),
            result = self.refresh_ping(record) => result,
        }
    }

    async fn ping(&self, address: IpAddr) -> Result<PingResult, ResolveError> {
        match self.pinger.probe(address, &self.config.ping).await {
            Ok(result) => Ok(result),
            Err(e) if self.config.strict_ping_facility => Err(e.into()),
            Err(e) => {
                warn!("{e}; reporting {address} as down");
                Ok(PingResult::Down)
            }
        }
    }

    async fn probe_ports(&self, address: IpAddr, plan: BTreeMap<u16, String>) -> Vec<PortResult> {
        let timeout = self.config.port_timeout;
        let prober = &self.port_prober;

        let results: BTreeMap<u16, PortResult> = stream::iter(plan)
            .map(move |(port, service)| async move {
                let status = prober.probe(address, port, timeout).await;
                PortResult { port, service, status }
            })
            .buffer_unordered(self.config.port_concurrency.max(1))
            .map(|result| (result.port, result))
            .collect()
            .await;

        results.into_values().collect()
    }
}

/// Ports to check for `device`, keyed and therefore ordered by port number.
///
/// The well-known set is always included. Declared ports are merged in and
/// win on collision; entries that are not valid port numbers are skipped.
pub fn probe_port_plan(well_known: &BTreeMap<u16, String>, device: &DeviceRecord) -> BTreeMap<u16, String> {
    let mut plan = well_known.clone();

    for (raw_port, service) in &device.declared_ports {
        let Some(port) = parse_port(raw_port) else {
            warn!("Ignoring invalid port `{raw_port}` declared for {}", device.device_id);
            continue;
        };

        let label = if service.trim().is_empty() {
            services::label_for(port).unwrap_or(UNKNOWN).to_string()
        } else {
            service.clone()
        };
        plan.insert(port, label);
    }

    plan
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
