//! Room coordination server for a peer-to-peer video chat.
//!
//! Tracks who is in which room, arbitrates the single screen-share slot per
//! room, runs vote-kick ballots and keeps a temporary IP ban list. Media
//! never passes through here; clients talk to the server over a WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
