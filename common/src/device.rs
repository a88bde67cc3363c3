//! # Device Models
//!
//! * [`DeviceRecord`]: static metadata held by the registry.
//! * [`DevicePayload`]: the `{device_id, ip}` pair carried by a device's QR label.

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MalformedPayload;

pub const UNKNOWN: &str = "unknown";

/// Registry metadata for a single device. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    pub device_id: String,
    pub device_type: String,
    pub location: String,
    pub model: String,
    /// Port → service label, exactly as written in the registry.
    ///
    /// Keys are not validated at load time; whoever consumes them decides
    /// what to do with entries that are not valid port numbers.
    pub declared_ports: BTreeMap<String, String>,
}

impl DeviceRecord {
    pub fn new(device_id: impl Into<String>, device_type: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            device_type: device_type.into(),
            location: location.into(),
            model: UNKNOWN.to_string(),
            declared_ports: BTreeMap::new(),
        }
    }

    pub fn with_port(mut self, port: impl Into<String>, service: impl Into<String>) -> Self {
        self.declared_ports.insert(port.into(), service.into());
        self
    }
}

#[derive(Deserialize)]
struct RawPayload {
    device_id: Option<String>,
    ip: Option<String>,
}

/// A validated QR payload, ready to be handed to the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevicePayload {
    pub device_id: String,
    pub ip: IpAddr,
}

impl DevicePayload {
    pub fn new(device_id: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            device_id: device_id.into(),
            ip,
        }
    }

    /// Parses the text decoded from a QR label.
    pub fn from_json(text: &str) -> Result<Self, MalformedPayload> {
        let value: Value = serde_json::from_str(text.trim())
            .map_err(|e| MalformedPayload::new(format!("not a JSON document ({e})")))?;
        Self::from_value(value)
    }

    /// Validates a payload that an upstream decoder has already turned into JSON.
    ///
    /// Extra fields are ignored.
    pub fn from_value(value: Value) -> Result<Self, MalformedPayload> {
        if !value.is_object() {
            return Err(MalformedPayload::new("payload must be a JSON object"));
        }

        let raw: RawPayload = serde_json::from_value(value)
            .map_err(|e| MalformedPayload::new(format!("unexpected field type ({e})")))?;

        let device_id = raw
            .device_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MalformedPayload::new("missing `device_id`"))?;

        let ip_text = raw
            .ip
            .ok_or_else(|| MalformedPayload::new("missing `ip`"))?;
        let ip: IpAddr = ip_text
            .trim()
            .parse()
            .map_err(|_| MalformedPayload::new(format!("`{ip_text}` is not an IP address")))?;

        Ok(Self { device_id, ip })
    }

    /// Canonical text to embed in a QR label for this device.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "device_id": self.device_id,
            "ip": self.ip.to_string(),
        })
        .to_string()
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
