//! # Device Registry
//!
//! Static map from device identifier to [`DeviceRecord`], loaded once from a
//! JSON document shaped like:
//!
//! ```json
//! { "SW1": { "type": "switch", "location": "rack-1", "model": "C2960", "ports": { "22": "SSH" } } }
//! ```
//!
//! The registry is read-only after load and can be shared between concurrent
//! resolutions behind an `Arc` without any locking.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use arnet_common::device::{DeviceRecord, UNKNOWN};
use arnet_common::error::RegistryLoadError;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Deserialize)]
struct RegistryEntry {
    #[serde(rename = "type", default)]
    device_type: Value,
    #[serde(default)]
    location: Value,
    #[serde(default)]
    model: Value,
    #[serde(default)]
    ports: BTreeMap<String, Value>,
}

impl RegistryEntry {
    fn into_record(self, device_id: &str) -> DeviceRecord {
        DeviceRecord {
            device_id: device_id.to_string(),
            device_type: text_field(device_id, "type", self.device_type),
            location: text_field(device_id, "location", self.location),
            model: text_field(device_id, "model", self.model),
            declared_ports: declared_ports(device_id, self.ports),
        }
    }
}

/// Null or absent fields become `"unknown"`; other non-strings are logged first.
fn text_field(device_id: &str, field: &str, value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => UNKNOWN.to_string(),
        other => {
            warn!("Registry entry `{device_id}`: `{field}` is not a string ({other}), using \"{UNKNOWN}\"");
            UNKNOWN.to_string()
        }
    }
}

fn declared_ports(device_id: &str, ports: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    ports
        .into_iter()
        .filter_map(|(port, label)| match label {
            Value::String(label) => Some((port, label)),
            other => {
                warn!("Registry entry `{device_id}`: skipping port {port} with non-string label {other}");
                None
            }
        })
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, DeviceRecord>,
}

impl DeviceRegistry {
    pub fn new(records: impl IntoIterator<Item = DeviceRecord>) -> Self {
        let devices = records
            .into_iter()
            .map(|record| (record.device_id.clone(), record))
            .collect();
        Self { devices }
    }

    /// Reads and decodes the registry document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryLoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RegistryLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json_str(&text).map_err(|source| RegistryLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {} devices from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Like [`DeviceRegistry::load`], but a missing or broken document yields an empty registry.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(registry) => registry,
            Err(e) => {
                warn!("{e}; continuing with an empty device registry");
                Self::default()
            }
        }
    }

    /// Decodes a registry document.
    ///
    /// The document itself must be a JSON object. Entries that do not look
    /// like device records are skipped individually.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let document: Map<String, Value> = serde_json::from_str(text)?;
        let mut devices = HashMap::with_capacity(document.len());

        for (device_id, value) in document {
            match serde_json::from_value::<RegistryEntry>(value) {
                Ok(entry) => {
                    let record = entry.into_record(&device_id);
                    devices.insert(device_id, record);
                }
                Err(e) => warn!("Skipping registry entry `{device_id}`: {e}"),
            }
        }

        Ok(Self { devices })
    }

    /// Absence is an ordinary outcome for devices nobody registered.
    pub fn lookup(&self, device_id: &str) -> Option<&DeviceRecord> {
        self.devices.get(device_id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// All records, ordered by identifier.
    pub fn records(&self) -> Vec<&DeviceRecord> {
        let mut records: Vec<&DeviceRecord> = self.devices.values().collect();
        records.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        records
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
