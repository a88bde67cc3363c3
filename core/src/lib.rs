//! # ARNet Core
//!
//! The device diagnostics resolver: turns a scanned `{device_id, ip}` pair
//! into a time-stamped [`DiagnosticsRecord`](arnet_common::diagnostics::DiagnosticsRecord).
//!
//! * **[`registry`]**: static device metadata, loaded once.
//! * **[`probe`]**: ping and TCP connect probes behind async traits.
//! * **[`diagnostics`]**: the aggregator that merges registry data and probe results.

pub mod diagnostics;
pub mod probe;
pub mod registry;

pub use diagnostics::DiagnosticsAggregator;
pub use registry::DeviceRegistry;
