//! WebSocket Server for the Host Page
//!
//! An acceptor thread hands every connection to its own client thread,
//! which mounts and drives one editor.

use std::net::{IpAddr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::client::{ClientContext, serve_client};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Start the host server. Returns the bound address.
///
/// The acceptor stops once shutdown is requested.
pub fn start_host_server(
    interface: IpAddr,
    base_port: u16,
    ctx: Arc<ClientContext>,
) -> Result<SocketAddr> {
    let listener = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;

    std::thread::Builder::new()
        .name("host-acceptor".into())
        .spawn(move || {
            while !crate::core::is_shutdown() {
                match listener.accept() {
                    Ok((stream, peer)) => {
                        crate::debug!("serve"; "client connected: {}", peer);

                        // Set blocking for the WebSocket handshake
                        let _ = stream.set_nonblocking(false);

                        let ctx = Arc::clone(&ctx);
                        let spawned = std::thread::Builder::new()
                            .name(format!("host-client-{peer}"))
                            .spawn(move || serve_client(stream, ctx));
                        if let Err(e) = spawned {
                            crate::log!("serve"; "failed to spawn client thread: {}", e);
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        std::thread::sleep(Duration::from_millis(100));
                    }
                    Err(e) => {
                        crate::log!("serve"; "accept error: {}", e);
                        std::thread::sleep(Duration::from_millis(100));
                    }
                }
            }
        })?;

    Ok(addr)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<TcpListener> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => return Ok(listener),
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind host server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
