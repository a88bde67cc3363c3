//! # ARNet Common
//!
//! Shared vocabulary for the diagnostics workspace: the device and diagnostics
//! models, probe configuration, the well-known service table, and the typed
//! error taxonomy.

pub mod config;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod services;
