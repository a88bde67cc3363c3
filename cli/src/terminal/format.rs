use std::net::IpAddr;

use arnet_common::diagnostics::{DiagnosticsRecord, HealthLevel, PingResult, PortResult};
use chrono::Local;
use colored::*;

use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn print_record(record: &DiagnosticsRecord, q_level: u8) {
    print::header(&format!("{} diagnostics", record.device_id), q_level);
    print::tree_head(0, &format!("{} {}", record.device_id, health_badge(record.health())));

    let mut details: Vec<Detail> = vec![
        ("Type".to_string(), record.device_type.normal()),
        ("Where".to_string(), record.location.normal()),
        ("Model".to_string(), record.model.normal()),
        address_to_detail(record.address),
    ];
    details.extend(ping_to_details(&record.ping));
    details.push(("Checked".to_string(), local_time(record).dimmed()));
    print::as_tree_one_level(details);

    print::tree_head(1, "Ports");
    print::as_tree_one_level(record.ports.iter().map(port_to_detail).collect());
    print::fat_separator(q_level);
}

/// One line per refresh, for the watch loop.
pub fn print_refresh(record: &DiagnosticsRecord) {
    let ping: ColoredString = match &record.ping {
        PingResult::Up { .. } => record.ping.to_string().color(health_color(record.health())),
        PingResult::Down => record.ping.to_string().color(colors::UNREACHABLE),
    };
    print::print_status(format!("{} {} {}", local_time(record).dimmed(), record.device_id, ping));
}

fn local_time(record: &DiagnosticsRecord) -> String {
    record
        .captured_at
        .with_timezone(&Local)
        .format(TIME_FORMAT)
        .to_string()
}

fn address_to_detail(address: IpAddr) -> Detail {
    let value = match address {
        IpAddr::V4(v4) => v4.to_string().color(colors::IPV4_ADDR),
        IpAddr::V6(v6) => v6.to_string().color(colors::IPV6_ADDR),
    };
    ("Address".to_string(), value)
}

fn ping_to_details(ping: &PingResult) -> Vec<Detail> {
    match ping {
        PingResult::Up {
            avg_ms,
            min_ms,
            max_ms,
            loss_fraction,
        } => vec![
            (
                "Ping".to_string(),
                format!("{avg_ms:.2}ms (min {min_ms:.2}ms, max {max_ms:.2}ms)").normal(),
            ),
            ("Loss".to_string(), format!("{:.0}%", loss_fraction * 100.0).normal()),
        ],
        PingResult::Down => vec![
            ("Ping".to_string(), "no response".color(colors::UNREACHABLE)),
            ("Loss".to_string(), "100%".color(colors::UNREACHABLE)),
        ],
    }
}

fn port_to_detail(port: &PortResult) -> Detail {
    let status: ColoredString = if port.status.is_open() {
        port.status.to_string().green().bold()
    } else {
        port.status.to_string().red()
    };
    (port.port.to_string(), format!("{} {}", status, port.service.dimmed()).normal())
}

fn health_color(health: HealthLevel) -> Color {
    match health {
        HealthLevel::Healthy => colors::HEALTHY,
        HealthLevel::Degraded => colors::DEGRADED,
        HealthLevel::Unreachable => colors::UNREACHABLE,
    }
}

fn health_badge(health: HealthLevel) -> ColoredString {
    let label = match health {
        HealthLevel::Healthy => "● healthy",
        HealthLevel::Degraded => "● degraded",
        HealthLevel::Unreachable => "● unreachable",
    };
    label.color(health_color(health)).bold()
}
