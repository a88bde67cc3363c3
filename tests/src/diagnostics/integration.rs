#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use arnet_common::config::ProbeConfig;
use arnet_common::device::{DevicePayload, DeviceRecord};
use arnet_common::diagnostics::{PingResult, PortResult, PortStatus};
use arnet_common::error::ResolveError;
use arnet_core::probe::TcpConnectProbe;
use arnet_core::{DeviceRegistry, DiagnosticsAggregator};
use tokio::net::TcpListener;

use crate::utils::{aggregator, registry_of, switch_registry, ScriptedPing, StaticPorts};

const SW1_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10));

fn port(port: u16, service: &str, status: PortStatus) -> PortResult {
    PortResult {
        port,
        service: service.to_string(),
        status,
    }
}

/// A scanned switch with SSH declared, answering two of two pings.
#[tokio::test]
async fn resolves_registered_switch() {
    let ping = ScriptedPing::replying(&[10.2, 12.4]);
    let ports = StaticPorts::open(&[22]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let record = aggregator.resolve("SW1", SW1_ADDR).await.unwrap();

    assert_eq!(record.device_id, "SW1");
    assert_eq!(record.address, SW1_ADDR);
    assert_eq!(record.device_type, "switch");
    assert_eq!(record.location, "rack-1");
    assert_eq!(record.model, "unknown");
    assert_eq!(
        record.ping,
        PingResult::Up {
            avg_ms: 11.3,
            min_ms: 10.2,
            max_ms: 12.4,
            loss_fraction: 0.0,
        }
    );
    assert_eq!(
        record.ports,
        vec![
            port(22, "SSH", PortStatus::Open),
            port(80, "HTTP", PortStatus::Closed),
            port(443, "HTTPS", PortStatus::Closed),
        ]
    );
    assert_eq!(ping.calls(), 1);
    assert_eq!(ports.calls(), 3);
}

#[tokio::test]
async fn unknown_device_is_rejected_without_probing() {
    let ping = ScriptedPing::replying(&[1.0, 1.0]);
    let ports = StaticPorts::open(&[80]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let err = aggregator.resolve("GHOST", SW1_ADDR).await.unwrap_err();

    assert!(matches!(err, ResolveError::DeviceUnknown { ref device_id } if device_id == "GHOST"));
    assert_eq!(ping.calls(), 0, "ping must not run for unregistered devices");
    assert_eq!(ports.calls(), 0, "ports must not be probed for unregistered devices");
}

#[tokio::test]
async fn declared_port_joins_well_known_set() {
    let ping = ScriptedPing::replying(&[5.0, 5.0]);
    let ports = StaticPorts::open(&[8080]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let record = aggregator.resolve("WEB1", SW1_ADDR).await.unwrap();

    let numbers: Vec<u16> = record.ports.iter().map(|p| p.port).collect();
    assert_eq!(numbers, vec![80, 443, 8080]);
    assert_eq!(record.port(8080).unwrap().service, "custom");
    assert_eq!(record.port(8080).unwrap().status, PortStatus::Open);
    assert_eq!(record.model, "R640");
}

#[tokio::test]
async fn device_without_declared_ports_still_gets_well_known_set() {
    let ping = ScriptedPing::replying(&[]);
    let ports = StaticPorts::open(&[]);
    let registry = registry_of([DeviceRecord::new("AP1", "access point", "ceiling")]);
    let aggregator = aggregator(registry, &ping, &ports);

    let record = aggregator.resolve("AP1", SW1_ADDR).await.unwrap();

    assert_eq!(
        record.ports,
        vec![port(80, "HTTP", PortStatus::Closed), port(443, "HTTPS", PortStatus::Closed)]
    );
}

#[tokio::test]
async fn unreachable_device_is_still_resolved() {
    let ping = ScriptedPing::replying(&[]);
    let ports = StaticPorts::open(&[]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let record = aggregator.resolve("SW1", SW1_ADDR).await.unwrap();

    assert_eq!(record.ping, PingResult::Down);
    assert_eq!(record.ping.loss_fraction(), 1.0);
    assert_eq!(record.ports.len(), 3);
    assert!(record.open_ports().next().is_none());
}

#[tokio::test]
async fn partial_replies_are_reported_as_loss() {
    let ping = ScriptedPing::replying(&[20.0]);
    let ports = StaticPorts::open(&[]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let record = aggregator.resolve("SW1", SW1_ADDR).await.unwrap();

    assert!(record.ping.is_up());
    assert_eq!(record.ping.loss_fraction(), 0.5);
}

#[tokio::test]
async fn repeated_resolutions_differ_only_in_timestamp() {
    let ping = ScriptedPing::replying(&[10.2, 12.4]);
    let ports = StaticPorts::open(&[22]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let first = aggregator.resolve("SW1", SW1_ADDR).await.unwrap();
    let mut second = aggregator.resolve("SW1", SW1_ADDR).await.unwrap();

    assert!(second.captured_at >= first.captured_at);
    second.captured_at = first.captured_at;
    assert_eq!(first, second);
}

#[tokio::test]
async fn payload_drives_resolution() {
    let ping = ScriptedPing::replying(&[3.0, 4.0]);
    let ports = StaticPorts::open(&[]);
    let aggregator = aggregator(switch_registry(), &ping, &ports);

    let payload = DevicePayload::from_json(r#"{"device_id": "SW1", "ip": "192.168.1.10"}"#).unwrap();
    let record = aggregator.resolve_payload(&payload).await.unwrap();

    assert_eq!(record.address, SW1_ADDR);
    assert_eq!(record.ping.avg_ms(), Some(3.5));
}

#[tokio::test]
async fn malformed_payload_never_reaches_the_resolver() {
    let ping = ScriptedPing::replying(&[3.0]);
    let ports = StaticPorts::open(&[]);
    let _aggregator = aggregator(switch_registry(), &ping, &ports);

    assert!(DevicePayload::from_json(r#"{"ip": "192.168.1.10"}"#).is_err());
    assert!(DevicePayload::from_json(r#"{"device_id": "SW1"}"#).is_err());
    assert_eq!(ping.calls(), 0);
    assert_eq!(ports.calls(), 0);
}

#[tokio::test]
async fn missing_registry_means_every_device_is_unknown() {
    let registry = Arc::new(DeviceRegistry::load_or_empty("/definitely/not/here/device_map.json"));
    let ping = ScriptedPing::replying(&[1.0]);
    let ports = StaticPorts::open(&[]);
    let aggregator = aggregator(registry, &ping, &ports);

    let err = aggregator.resolve("SW1", SW1_ADDR).await.unwrap_err();
    assert!(err.is_device_unknown());
}

#[tokio::test]
async fn concurrent_resolutions_share_the_registry() {
    let ping = ScriptedPing::replying(&[1.0, 2.0]);
    let ports = StaticPorts::open(&[22]);
    let aggregator = Arc::new(aggregator(switch_registry(), &ping, &ports));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let aggregator = aggregator.clone();
            tokio::spawn(async move { aggregator.resolve("SW1", SW1_ADDR).await })
        })
        .collect();

    for handle in handles {
        let record = handle.await.unwrap().unwrap();
        assert_eq!(record.ports.len(), 3);
    }
    assert_eq!(ping.calls(), 8);
    assert_eq!(ports.calls(), 24);
}

/// Real TCP connects against a listener on loopback.
#[tokio::test]
async fn connect_probe_finds_local_listener() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let open_port = listener.local_addr().unwrap().port();

    let registry = registry_of([DeviceRecord::new("LAB1", "server", "desk").with_port(open_port.to_string(), "lab")]);
    let config = ProbeConfig {
        port_timeout: Duration::from_millis(300),
        ..ProbeConfig::default()
    };
    let aggregator = DiagnosticsAggregator::new(
        registry,
        ScriptedPing::replying(&[0.05, 0.07]),
        Arc::new(TcpConnectProbe),
        config,
    );

    let record = aggregator
        .resolve("LAB1", IpAddr::V4(Ipv4Addr::LOCALHOST))
        .await
        .unwrap();

    let lab = record.port(open_port).unwrap();
    assert_eq!(lab.status, PortStatus::Open);
    assert_eq!(lab.service, "lab");
    assert!(record.port(80).is_some());
    assert!(record.port(443).is_some());
    assert!(record.ports.windows(2).all(|pair| pair[0].port < pair[1].port));
}
