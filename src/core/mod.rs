//! Core types shared across the codebase.

mod response;
mod state;

pub use response::{Body, ServeResponse};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
