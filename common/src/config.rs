use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::services;

pub const DEFAULT_REGISTRY_PATH: &str = "data/device_map.json";

#[derive(Clone, Debug)]
pub struct Config {
    /// Location of the device registry document.
    pub registry_path: PathBuf,
    /// Suppresses headers and decorations; `2` prints results only.
    pub quiet: u8,
    pub probe: ProbeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            quiet: 0,
            probe: ProbeConfig::default(),
        }
    }
}

/// Parameters handed to the external echo facility.
#[derive(Clone, Debug, PartialEq)]
pub struct PingSettings {
    /// Number of echo requests per probe.
    pub sample_count: u32,
    /// How long the facility waits for each individual reply.
    pub per_attempt_timeout: Duration,
    /// Hard wall-clock limit for the whole invocation.
    ///
    /// Enforced by the caller independently of the facility's own timers.
    pub overall_timeout: Duration,
}

impl Default for PingSettings {
    fn default() -> Self {
        Self {
            sample_count: 2,
            per_attempt_timeout: Duration::from_secs(1),
            overall_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProbeConfig {
    pub ping: PingSettings,
    /// Connect timeout applied to every port probe.
    pub port_timeout: Duration,
    /// Upper bound on port probes in flight for a single resolution.
    pub port_concurrency: usize,
    /// Ports probed for every device, with their default labels.
    pub well_known_ports: BTreeMap<u16, String>,
    /// Turns a missing ping facility into a resolution error instead of a `Down` result.
    pub strict_ping_facility: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ping: PingSettings::default(),
            port_timeout: Duration::from_millis(500),
            port_concurrency: 6,
            well_known_ports: services::essential_ports(),
            strict_ping_facility: false,
        }
    }
}
