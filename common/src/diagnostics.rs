//! # Diagnostics Models
//!
//! The values produced by a resolution. Everything here is a plain value with
//! no handles back into the resolver, so a rendering layer can consume it as-is
//! (or as JSON through `serde`).

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Average latency at or above which a reachable device is reported as degraded.
pub const DEGRADED_LATENCY_MS: f64 = 100.0;

/// Outcome of an echo probe.
///
/// Statistics only exist when at least one reply came back, so they live on
/// the `Up` variant instead of being nullable fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PingResult {
    Up {
        avg_ms: f64,
        min_ms: f64,
        max_ms: f64,
        /// Fraction of requests without a reply, within `[0, 1]`.
        loss_fraction: f64,
    },
    Down,
}

impl PingResult {
    /// Builds a result from the round-trip samples that were actually observed.
    ///
    /// No samples means `Down`. Latencies are rounded to two decimals; the
    /// loss fraction is not rounded but is clamped to `[0, 1]`, even when more samples than
    /// `requested` were observed.
    pub fn from_samples(samples: &[f64], requested: u32) -> Self {
        if samples.is_empty() {
            return PingResult::Down;
        }

        let count = samples.len() as f64;
        let avg = samples.iter().sum::<f64>() / count;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let loss_fraction = if requested == 0 {
            0.0
        } else {
            (1.0 - count / f64::from(requested)).clamp(0.0, 1.0)
        };

        PingResult::Up {
            avg_ms: round2(avg),
            min_ms: round2(min),
            max_ms: round2(max),
            loss_fraction,
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, PingResult::Up { .. })
    }

    pub fn loss_fraction(&self) -> f64 {
        match self {
            PingResult::Up { loss_fraction, .. } => *loss_fraction,
            PingResult::Down => 1.0,
        }
    }

    pub fn avg_ms(&self) -> Option<f64> {
        match self {
            PingResult::Up { avg_ms, .. } => Some(*avg_ms),
            PingResult::Down => None,
        }
    }
}

impl fmt::Display for PingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PingResult::Up {
                avg_ms,
                min_ms,
                max_ms,
                loss_fraction,
            } => write!(
                f,
                "{avg_ms:.2}ms (min {min_ms:.2}ms, max {max_ms:.2}ms, loss {:.0}%)",
                loss_fraction * 100.0
            ),
            PingResult::Down => write!(f, "no response (loss 100%)"),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    Open,
    Closed,
}

impl PortStatus {
    pub fn is_open(self) -> bool {
        self == PortStatus::Open
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortStatus::Open => write!(f, "open"),
            PortStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    pub port: u16,
    pub service: String,
    pub status: PortStatus,
}

/// Coarse traffic-light view of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Unreachable,
}

/// Complete snapshot of one device resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsRecord {
    pub device_id: String,
    pub address: IpAddr,
    pub device_type: String,
    pub location: String,
    pub model: String,
    pub ping: PingResult,
    /// Ascending by port, one entry per port.
    pub ports: Vec<PortResult>,
    pub captured_at: DateTime<Utc>,
}

impl DiagnosticsRecord {
    /// Returns a copy carrying a fresh ping outcome and timestamp; nothing else changes.
    pub fn with_ping(&self, ping: PingResult, captured_at: DateTime<Utc>) -> Self {
        Self {
            ping,
            captured_at,
            ..self.clone()
        }
    }

    pub fn port(&self, port: u16) -> Option<&PortResult> {
        self.ports.iter().find(|result| result.port == port)
    }

    pub fn open_ports(&self) -> impl Iterator<Item = &PortResult> {
        self.ports.iter().filter(|result| result.status.is_open())
    }

    pub fn health(&self) -> HealthLevel {
        match self.ping {
            PingResult::Down => HealthLevel::Unreachable,
            PingResult::Up {
                avg_ms,
                loss_fraction,
                ..
            } => {
                if avg_ms >= DEGRADED_LATENCY_MS || loss_fraction > 0.0 {
                    HealthLevel::Degraded
                } else {
                    HealthLevel::Healthy
                }
            }
        }
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
