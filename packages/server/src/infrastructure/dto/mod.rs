//! Data Transfer Objects (DTOs) for the coordination server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frames in both directions
//! - `http`: HTTP API responses
//! - `catalog`: room catalog file entries

pub mod catalog;
pub mod conversion;
pub mod http;
pub mod websocket;
