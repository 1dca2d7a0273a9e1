//! Infrastructure layer: concrete transports, storage and wire formats.

pub mod dto;
pub mod message_pusher;
pub mod repository;
