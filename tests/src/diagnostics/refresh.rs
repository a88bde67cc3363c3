#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};

use arnet_common::diagnostics::PingResult;
use tokio_util::sync::CancellationToken;

use crate::utils::{aggregator, switch_registry, ScriptedPing, StaticPorts};

const SW1_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10));

#[tokio::test]
async fn refresh_replaces_only_ping_and_timestamp() {
    let ping = ScriptedPing::replying(&[]);
    let ports = StaticPorts::open(&[22]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let original = aggregator.resolve("SW1", SW1_ADDR).await.unwrap();
    assert_eq!(original.ping, PingResult::Down);

    ping.set_samples(&[8.0, 9.0]);
    let refreshed = aggregator.refresh_ping(&original).await.unwrap();

    assert_eq!(refreshed.ping.avg_ms(), Some(8.5));
    assert!(refreshed.captured_at >= original.captured_at);
    assert_eq!(refreshed.device_id, original.device_id);
    assert_eq!(refreshed.address, original.address);
    assert_eq!(refreshed.device_type, original.device_type);
    assert_eq!(refreshed.location, original.location);
    assert_eq!(refreshed.model, original.model);
    assert_eq!(refreshed.ports, original.ports);

    // the input record is a value; refreshing never touches it
    assert_eq!(original.ping, PingResult::Down);
}

#[tokio::test]
async fn refresh_does_not_probe_ports_or_consult_registry() {
    let ping = ScriptedPing::replying(&[1.0, 1.0]);
    let ports = StaticPorts::open(&[]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let mut record = aggregator.resolve("SW1", SW1_ADDR).await.unwrap();
    let port_calls = ports.calls();

    // a record for a device that is no longer registered still refreshes
    record.device_id = "RETIRED".to_string();
    let refreshed = aggregator.refresh_ping(&record).await.unwrap();

    assert_eq!(ports.calls(), port_calls);
    assert_eq!(ping.calls(), 2);
    assert_eq!(refreshed.device_id, "RETIRED");
}

#[tokio::test]
async fn cancelled_refresh_reports_cancellation() {
    let ping = ScriptedPing::replying(&[1.0, 1.0]);
    let ports = StaticPorts::open(&[]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);
    let record = aggregator.resolve("SW1", SW1_ADDR).await.unwrap();

    let token = CancellationToken::new();
    token.cancel();

    let result = aggregator.refresh_ping_cancellable(&record, &token).await;
    assert!(result.is_err());
    assert_eq!(ping.calls(), 1, "a pre-cancelled refresh must not ping");
}

#[tokio::test]
async fn cancelled_resolution_does_not_probe() {
    let ping = ScriptedPing::replying(&[1.0, 1.0]);
    let ports = StaticPorts::open(&[]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let token = CancellationToken::new();
    token.cancel();

    let result = aggregator.resolve_cancellable("SW1", SW1_ADDR, &token).await;
    assert!(result.is_err());
    assert_eq!(ping.calls(), 0);
    assert_eq!(ports.calls(), 0);
}
