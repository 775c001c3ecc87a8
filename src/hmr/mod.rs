//! Hot Module Reload
//!
//! # Architecture
//!
//! ```text
//! WatchActor --> ReloadNotifier --> WsActor --> Browser
//!  (notify)      (full-reload)    (broadcast)
//!                     ^
//!               ImporterGraph  <-- HTML transform (external <script src>)
//! ```
//!
//! # Modules
//!
//! - `graph` - dependency → importers mapping
//! - `message` - JSON message types
//! - `notifier` - file change → reload broadcast
//! - `server` - WebSocket listener
//! - `watch` - filesystem watcher actor
//! - `ws` - WebSocket client registry and broadcast actor

pub mod graph;
pub mod message;
pub mod notifier;
pub mod server;
pub mod watch;
pub mod ws;

pub use graph::ImporterGraph;
pub use message::HmrMessage;
pub use notifier::{Broadcast, BroadcastError, ReloadNotifier};
