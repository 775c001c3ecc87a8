//! WebSocket listener for live reload.
//!
//! Accepts raw TCP connections and hands them to the [`WsActor`] over its
//! channel; the actor performs the handshake.
//!
//! [`WsActor`]: super::ws::WsActor

use std::net::{IpAddr, SocketAddr, TcpListener};

use anyhow::Result;
use tokio::sync::mpsc;

use super::ws::WsMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the listener and spawn its acceptor thread.
///
/// Returns the port actually bound, which differs from `base_port` when
/// that one was taken.
pub fn start_ws_server(interface: IpAddr, base_port: u16, ws_tx: mpsc::Sender<WsMsg>) -> Result<u16> {
    let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Ok(addr) = stream.peer_addr() {
                        crate::debug!("ws"; "client connected: {}", addr);
                    }
                    if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                        // Actor is gone, nobody left to serve
                        break;
                    }
                }
                Err(e) => crate::log!("ws"; "accept error: {}", e),
            }
        }
    });

    Ok(port)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let addr = SocketAddr::new(interface, base_port.saturating_add(offset));
        match TcpListener::bind(addr) {
            Ok(listener) => {
                let port = listener.local_addr()?.port();
                return Ok((listener, port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
