use arnet_common::config::Config;
use arnet_core::DeviceRegistry;
use colored::*;

use crate::terminal::{colors, print};

pub fn devices(cfg: &Config) {
    let registry = DeviceRegistry::load_or_empty(&cfg.registry_path);

    if registry.is_empty() {
        print::header("no devices registered", cfg.quiet);
        print::print_status(format!("registry: {}", cfg.registry_path.display()));
        return;
    }

    print::header("device registry", cfg.quiet);
    for (idx, device) in registry.records().into_iter().enumerate() {
        print::tree_head(idx, &device.device_id);

        let mut details: Vec<(String, ColoredString)> = vec![
            ("Type".to_string(), device.device_type.normal()),
            ("Where".to_string(), device.location.normal()),
            ("Model".to_string(), device.model.normal()),
        ];
        if !device.declared_ports.is_empty() {
            let ports = device
                .declared_ports
                .iter()
                .map(|(port, service)| format!("{port}/{service}"))
                .collect::<Vec<String>>()
                .join(", ");
            details.push(("Ports".to_string(), ports.color(colors::ACCENT)));
        }
        print::as_tree_one_level(details);
    }
    print::fat_separator(cfg.quiet);
}
