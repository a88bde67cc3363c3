//! The central **abstraction** for reachability checks.
//!
//! A probe is a single outward-facing check with a bounded timeout. The
//! aggregator only depends on the traits below; [`ping`] and [`tcp`] hold the
//! production implementations, and tests substitute their own.
//!
//! Both traits absorb network failures into their result types. Only the
//! inability to run the echo facility at all surfaces as an error.

use std::net::IpAddr;
use std::time::Duration;

use arnet_common::config::PingSettings;
use arnet_common::diagnostics::{PingResult, PortStatus};
use arnet_common::error::ProbeUnavailable;
use async_trait::async_trait;

pub mod ping;
pub mod tcp;

pub use ping::SystemPing;
pub use tcp::TcpConnectProbe;

/// Measures round-trip latency to an address.
#[async_trait]
pub trait PingProbe: Send + Sync {
    /// Must return within `settings.overall_timeout` (plus scheduling slack),
    /// whatever the underlying facility does.
    async fn probe(&self, address: IpAddr, settings: &PingSettings) -> Result<PingResult, ProbeUnavailable>;
}

/// Checks whether a single TCP port accepts connections.
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// "Could not confirm open" and "confirmed closed" both map to [`PortStatus::Closed`].
    async fn probe(&self, address: IpAddr, port: u16, timeout: Duration) -> PortStatus;
}
