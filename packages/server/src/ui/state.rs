//! Shared handler state.

use std::sync::Arc;

use crate::usecase::{GetRoomsUseCase, RoomCoordinator};

pub struct AppState {
    pub coordinator: RoomCoordinator,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// Resolve client addresses from proxy headers
    pub trust_forwarded_headers: bool,
    pub utc_offset_hours: i32,
}
