//! Well-known TCP services and their display labels.

use std::collections::BTreeMap;

pub const HTTP_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;

const COMMON_SERVICES: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (HTTP_PORT, "HTTP"),
    (HTTPS_PORT, "HTTPS"),
];

/// The ports every resolution checks, regardless of what the registry declares.
pub fn essential_ports() -> BTreeMap<u16, String> {
    BTreeMap::from([
        (HTTP_PORT, "HTTP".to_string()),
        (HTTPS_PORT, "HTTPS".to_string()),
    ])
}

/// Looks up the conventional label of a port, if it is one we know.
pub fn label_for(port: u16) -> Option<&'static str> {
    COMMON_SERVICES
        .iter()
        .find(|(number, _)| *number == port)
        .map(|(_, label)| *label)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
