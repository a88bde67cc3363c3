use anyhow::Context;
use arnet_common::config::Config;
use arnet_common::device::DevicePayload;
use arnet_common::error::ResolveError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::commands::{build_aggregator, cancel_on_ctrl_c};
use crate::terminal::{format, spinner};

pub async fn resolve(raw_payload: &str, json: bool, cfg: &Config) -> anyhow::Result<()> {
    let payload = DevicePayload::from_json(raw_payload)?;
    let aggregator = build_aggregator(cfg);

    let token = CancellationToken::new();
    let ctrl_c = cancel_on_ctrl_c(token.clone());
    let progress = (!json && cfg.quiet == 0)
        .then(|| spinner::start(format!("Probing {} at {}", payload.device_id, payload.ip)));

    let result = aggregator
        .resolve_cancellable(&payload.device_id, payload.ip, &token)
        .await;

    drop(progress);
    ctrl_c.abort();

    let record = match result {
        Ok(record) => record,
        Err(ResolveError::Cancelled) => {
            warn!("Resolution of {} cancelled", payload.device_id);
            return Ok(());
        }
        Err(e @ ResolveError::DeviceUnknown { .. }) => {
            return Err(e).with_context(|| {
                format!("add it to {} to get diagnostics", cfg.registry_path.display())
            });
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        format::print_record(&record, cfg.quiet);
    }
    Ok(())
}
