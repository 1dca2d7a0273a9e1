//! UseCase layer
//!
//! - `RoomCoordinator`: serializes every room event through one task that
//!   owns the `RoomRegistry` and carries out its effects
//! - `GetRoomsUseCase`: room catalog listing for the HTTP API

mod coordinator;
mod error;
mod get_rooms;

pub use coordinator::RoomCoordinator;
pub use error::{CoordinatorError, GetRoomsError};
pub use get_rooms::GetRoomsUseCase;
