use crate::use_cases::RoomRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Live rooms and their seated sockets.
    pub rooms: Arc<RoomRegistry>,
}
