//! WebSocket Actor - client registry and broadcast
//!
//! ```text
//! ReloadNotifier --Broadcast--> WsActor --[all clients]--> Browser
//! ws listener  --AddClient--^
//! ```

use std::net::TcpStream;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::HmrMessage;
use super::notifier::{Broadcast, BroadcastError};

/// Messages to WebSocket Actor
pub enum WsMsg {
    /// Send a message to every connected client
    Broadcast(HmrMessage),
    /// Raw connection from the listener, handshake pending
    AddClient(TcpStream),
    /// Close all clients and stop
    Shutdown,
}

impl Broadcast for mpsc::Sender<WsMsg> {
    fn send(&self, message: HmrMessage) -> Result<(), BroadcastError> {
        self.try_send(WsMsg::Broadcast(message))
            .map_err(|e| match e {
                TrySendError::Full(_) => BroadcastError::Full,
                TrySendError::Closed(_) => BroadcastError::Closed,
            })
    }
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    clients: Vec<WebSocket<TcpStream>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Vec::new(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Broadcast(message) => self.broadcast(&message),
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    for mut client in self.clients.drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }

    /// Number of live clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Send to every client, dropping those whose socket failed.
    fn broadcast(&mut self, message: &HmrMessage) {
        let json = message.to_json();
        let before = self.clients.len();
        self.clients
            .retain_mut(|ws| ws.send(Message::Text(json.clone().into())).is_ok());

        let dropped = before - self.clients.len();
        if dropped > 0 {
            crate::debug!("ws"; "dropped {} disconnected client(s)", dropped);
        }
    }

    fn add_client(&mut self, stream: TcpStream) {
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let hello = HmrMessage::connected();
                if let Err(e) = ws.send(Message::Text(hello.to_json().into())) {
                    crate::log!("ws"; "failed to send connected message: {}", e);
                    return;
                }
                self.clients.push(ws);
                crate::debug!("ws"; "client connected (total: {})", self.clients.len());
            }
            Err(e) => crate::log!("ws"; "handshake failed: {}", e),
        }
    }
}
