use std::time::Duration;

use arnet_common::config::Config;
use arnet_common::device::DevicePayload;
use arnet_common::error::ResolveError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::commands::{build_aggregator, cancel_on_ctrl_c};
use crate::terminal::{format, print, spinner};

/// Resolves the device once, then re-pings it on every tick until Ctrl-C.
///
/// Ports and metadata are not re-probed; press Ctrl-C and resolve again for that.
pub async fn watch(raw_payload: &str, interval: Duration, cfg: &Config) -> anyhow::Result<()> {
    let payload = DevicePayload::from_json(raw_payload)?;
    let aggregator = build_aggregator(cfg);

    let token = CancellationToken::new();
    let ctrl_c = cancel_on_ctrl_c(token.clone());

    let progress = (cfg.quiet == 0)
        .then(|| spinner::start(format!("Probing {} at {}", payload.device_id, payload.ip)));
    let first = aggregator
        .resolve_cancellable(&payload.device_id, payload.ip, &token)
        .await;
    drop(progress);

    let mut record = match first {
        Ok(record) => record,
        Err(ResolveError::Cancelled) => return Ok(()),
        Err(e) => {
            ctrl_c.abort();
            return Err(e.into());
        }
    };
    format::print_record(&record, cfg.quiet);
    if cfg.quiet == 0 {
        print::print_status(format!("Refreshing every {}s, Ctrl-C to stop", interval.as_secs()));
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match aggregator.refresh_ping_cancellable(&record, &token).await {
            Ok(refreshed) => {
                format::print_refresh(&refreshed);
                record = refreshed;
            }
            Err(ResolveError::Cancelled) => break,
            Err(e) => {
                ctrl_c.abort();
                return Err(e.into());
            }
        }
    }

    ctrl_c.abort();
    print::header("watch stopped", cfg.quiet);
    Ok(())
}
