//! WebSocket / HTTP front of the coordination server.

mod client_ip;
mod handler;
mod server;
mod signal;
pub mod state;

pub use client_ip::resolve_client_ip;
pub use server::Server;
