//! # Error Taxonomy
//!
//! Reachability failures are data (`Down`, `Closed`) and never show up here.
//! The types below cover configuration and input problems only, each one
//! distinguishable by the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The registry document could not be read or decoded.
///
/// Recoverable: the host keeps running with an empty registry.
#[derive(Error, Debug)]
pub enum RegistryLoadError {
    #[error("cannot read device registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed device registry {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The external echo facility could not be started at all.
///
/// Distinct from a device that simply did not answer.
#[derive(Error, Debug)]
#[error("ping facility `{program}` is unavailable: {source}")]
pub struct ProbeUnavailable {
    pub program: String,
    #[source]
    pub source: io::Error,
}

/// A decoded QR payload is missing required fields or carries unusable values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed payload: {reason}")]
pub struct MalformedPayload {
    pub reason: String,
}

impl MalformedPayload {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    /// The identifier has no registry entry; this is a configuration gap, not a down device.
    #[error("device `{device_id}` is not registered")]
    DeviceUnknown { device_id: String },

    #[error(transparent)]
    ProbeUnavailable(#[from] ProbeUnavailable),

    #[error("resolution cancelled")]
    Cancelled,
}

impl ResolveError {
    pub fn is_device_unknown(&self) -> bool {
        matches!(self, ResolveError::DeviceUnknown { .. })
    }
}
