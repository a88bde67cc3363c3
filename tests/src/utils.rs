use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arnet_common::config::{PingSettings, ProbeConfig};
use arnet_common::device::DeviceRecord;
use arnet_common::diagnostics::{PingResult, PortStatus};
use arnet_common::error::ProbeUnavailable;
use arnet_core::probe::ping::parse_ping_output;
use arnet_core::probe::{PingProbe, PortProbe};
use arnet_core::{DeviceRegistry, DiagnosticsAggregator};
use async_trait::async_trait;

/// Renders replies the way Linux `ping` prints them.
pub fn ping_output(samples: &[f64]) -> String {
    let mut output = String::from("PING 192.168.1.10 (192.168.1.10) 56(84) bytes of data.\n");
    for (seq, ms) in samples.iter().enumerate() {
        output.push_str(&format!(
            "64 bytes from 192.168.1.10: icmp_seq={} ttl=64 time={} ms\n",
            seq + 1,
            ms
        ));
    }
    output.push_str("\n--- 192.168.1.10 ping statistics ---\n");
    output
}

/// Feeds canned facility output through the real parser.
pub struct ScriptedPing {
    output: Mutex<String>,
    pub calls: AtomicUsize,
}

impl ScriptedPing {
    pub fn replying(samples: &[f64]) -> Arc<Self> {
        Arc::new(Self {
            output: Mutex::new(ping_output(samples)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_samples(&self, samples: &[f64]) {
        *self.output.lock().unwrap() = ping_output(samples);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PingProbe for ScriptedPing {
    async fn probe(&self, _address: IpAddr, settings: &PingSettings) -> Result<PingResult, ProbeUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let output = self.output.lock().unwrap().clone();
        Ok(parse_ping_output(&output, settings.sample_count))
    }
}

/// Reports the configured ports as open and everything else as closed.
pub struct StaticPorts {
    open: HashSet<u16>,
    pub calls: AtomicUsize,
}

impl StaticPorts {
    pub fn open(ports: &[u16]) -> Arc<Self> {
        Arc::new(Self {
            open: ports.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PortProbe for StaticPorts {
    async fn probe(&self, _address: IpAddr, port: u16, _timeout: Duration) -> PortStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.open.contains(&port) {
            PortStatus::Open
        } else {
            PortStatus::Closed
        }
    }
}

pub fn switch_registry() -> Arc<DeviceRegistry> {
    let json = r#"{
        "SW1": {"type": "switch", "location": "rack-1", "ports": {"22": "SSH"}},
        "WEB1": {"type": "server", "location": "dc-2", "model": "R640", "ports": {"8080": "custom"}}
    }"#;
    Arc::new(DeviceRegistry::from_json_str(json).unwrap())
}

pub fn registry_of(records: impl IntoIterator<Item = DeviceRecord>) -> Arc<DeviceRegistry> {
    Arc::new(DeviceRegistry::new(records))
}

pub fn aggregator(
    registry: Arc<DeviceRegistry>,
    ping: &Arc<ScriptedPing>,
    ports: &Arc<StaticPorts>,
) -> DiagnosticsAggregator {
    DiagnosticsAggregator::new(registry, ping.clone(), ports.clone(), ProbeConfig::default())
}
