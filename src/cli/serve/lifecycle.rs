//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tiny_http::Server;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::hmr::server::start_ws_server;
use crate::hmr::watch::WatchActor;
use crate::hmr::ws::{WsActor, WsMsg};
use crate::hmr::{ImporterGraph, ReloadNotifier};
use crate::log;
use crate::resolve::Resolver;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Capacity of the broadcast actor's mailbox.
const WS_CHANNEL_CAPACITY: usize = 64;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Runtime for the actor side: WebSocket broadcast and file watching.
pub struct Actors {
    runtime: Runtime,
    ws_tx: mpsc::Sender<WsMsg>,
    ws_port: u16,
}

impl Actors {
    /// Start the WebSocket listener and broadcast actor.
    pub fn start(interface: IpAddr, hmr_port: u16) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        let (ws_tx, ws_rx) = mpsc::channel(WS_CHANNEL_CAPACITY);
        let ws_port = start_ws_server(interface, hmr_port, ws_tx.clone())?;
        runtime.spawn(WsActor::new(ws_rx).run());

        Ok(Self {
            runtime,
            ws_tx,
            ws_port,
        })
    }

    pub fn ws_port(&self) -> u16 {
        self.ws_port
    }

    pub fn handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Watch `root` and broadcast reloads for changed files.
    pub fn watch(&self, root: &Path, resolver: Arc<dyn Resolver>, graph: Arc<ImporterGraph>) -> Result<()> {
        let notifier = Arc::new(ReloadNotifier::new(resolver, graph, Arc::new(self.ws_tx.clone())));
        let watcher = WatchActor::new(root, notifier)
            .with_context(|| format!("Failed to watch {}", root.display()))?;
        self.runtime.spawn(watcher.run());
        Ok(())
    }

    /// Forward the Ctrl+C signal to the broadcast actor.
    pub fn relay_shutdown(&self, shutdown_rx: Receiver<()>) {
        let ws_tx = self.ws_tx.clone();
        thread::spawn(move || {
            if shutdown_rx.recv().is_ok() {
                let _ = ws_tx.blocking_send(WsMsg::Shutdown);
            }
        });
    }

    /// Stop the runtime, giving actors a moment to close their clients.
    pub fn shutdown(self) {
        let _ = self.ws_tx.try_send(WsMsg::Shutdown);
        self.runtime.shutdown_timeout(Duration::from_secs(2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_with_retry_skips_taken_port() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (first, addr) = bind_with_retry(localhost, 0).unwrap();
        let taken = addr.port();

        let (_second, next) = bind_with_retry(localhost, taken).unwrap();
        assert_ne!(next.port(), taken);
        drop(first);
    }
}
