//! ICMP reachability through the operating system's `ping` binary.
//!
//! The binary's textual output is the only interface, so the parsing rule is
//! kept in one pure function, [`parse_ping_output`]: every line reporting a
//! round-trip time contributes one sample, everything else is ignored.

use std::io;
use std::net::IpAddr;
use std::process::{ExitStatus, Stdio};

use arnet_common::config::PingSettings;
use arnet_common::diagnostics::PingResult;
use arnet_common::error::ProbeUnavailable;
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::PingProbe;

const DEFAULT_PROGRAM: &str = "ping";
const TIME_MARKERS: [&str; 2] = ["time=", "time<"];
/// iputils and BSD ping exit with 1 when no reply arrived and 2 or more on errors.
const FIRST_ERROR_EXIT_CODE: i32 = 2;

/// Runs the platform echo facility as a child process.
///
/// The child is spawned with `kill_on_drop`, so a call abandoned by timeout or
/// cancellation never leaves a process behind.
#[derive(Clone, Debug)]
pub struct SystemPing {
    program: String,
    leading_args: Vec<String>,
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPing {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Runs the facility through a launcher, e.g. `busybox ping`.
    ///
    /// `leading_args` come before the generated ping arguments.
    pub fn with_launcher<I, S>(program: impl Into<String>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    fn command(&self, address: IpAddr, settings: &PingSettings) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(ping_args(address, settings))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl PingProbe for SystemPing {
    async fn probe(&self, address: IpAddr, settings: &PingSettings) -> Result<PingResult, ProbeUnavailable> {
        let child = match self.command(address, settings).spawn() {
            Ok(child) => child,
            Err(source) => {
                warn!("Cannot start `{}`: {source}", self.program);
                return Err(ProbeUnavailable {
                    program: self.program.clone(),
                    source,
                });
            }
        };

        match timeout(settings.overall_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let result = parse_ping_output(&stdout, settings.sample_count);
                if !result.is_up() && facility_failed(output.status) {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let reason = match stderr.trim() {
                        "" => format!("exited with {}", output.status),
                        text => text.to_string(),
                    };
                    warn!("`{}` is unusable: {reason}", self.program);
                    return Err(ProbeUnavailable {
                        program: self.program.clone(),
                        source: io::Error::other(reason),
                    });
                }
                debug!("Ping {address}: {result}");
                Ok(result)
            }
            Ok(Err(e)) => {
                warn!("Failed to collect ping output for {address}: {e}");
                Ok(PingResult::Down)
            }
            Err(_elapsed) => {
                debug!("Ping {address} exceeded {:?}", settings.overall_timeout);
                Ok(PingResult::Down)
            }
        }
    }
}

fn facility_failed(status: ExitStatus) -> bool {
    !cfg!(windows) && status.code().is_some_and(|code| code >= FIRST_ERROR_EXIT_CODE)
}

/// Command-line arguments for the platform's ping flavour.
pub fn ping_args(address: IpAddr, settings: &PingSettings) -> Vec<String> {
    let count = settings.sample_count.max(1).to_string();

    if cfg!(windows) {
        let wait_ms = settings.per_attempt_timeout.as_millis().max(1).to_string();
        vec!["-n".into(), count, "-w".into(), wait_ms, address.to_string()]
    } else {
        // -W only takes whole seconds
        let wait_secs = settings.per_attempt_timeout.as_secs_f64().ceil().max(1.0) as u64;
        vec!["-c".into(), count, "-W".into(), wait_secs.to_string(), address.to_string()]
    }
}

/// Turns raw facility output into a [`PingResult`].
///
/// `sample_count` is the number of requests that were sent.
pub fn parse_ping_output(output: &str, sample_count: u32) -> PingResult {
    let samples: Vec<f64> = output.lines().filter_map(extract_sample).collect();
    PingResult::from_samples(&samples, sample_count)
}

fn extract_sample(line: &str) -> Option<f64> {
    let rest = TIME_MARKERS
        .iter()
        .find_map(|marker| line.split_once(marker).map(|(_, rest)| rest))?;
    let (value, _) = rest.split_once("ms")?;

    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
