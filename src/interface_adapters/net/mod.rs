// Relay endpoints split by the room websocket vs the HTTP room routes.

pub mod internal;
pub mod relay;

pub use internal::create_room_handler;
pub use relay::ws_handler;
