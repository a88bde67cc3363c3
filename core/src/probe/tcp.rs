use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use arnet_common::diagnostics::PortStatus;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use super::PortProbe;

/// Full TCP handshake against the target port.
///
/// The stream is dropped as soon as the handshake completes; on timeout the
/// pending connect future is dropped, which closes its socket.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnectProbe;

#[async_trait]
impl PortProbe for TcpConnectProbe {
    async fn probe(&self, address: IpAddr, port: u16, probe_timeout: Duration) -> PortStatus {
        let socket_addr: SocketAddr = SocketAddr::new(address, port);

        match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_stream)) => PortStatus::Open,
            Ok(Err(e)) => {
                trace!("{socket_addr} not accepting connections: {e}");
                PortStatus::Closed
            }
            Err(_elapsed) => {
                trace!("{socket_addr} connect timed out after {probe_timeout:?}");
                PortStatus::Closed
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
