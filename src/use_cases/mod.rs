// Use cases layer: the frame loop, peer replication and the relay's room registry.

pub mod replication;
pub mod rooms;
pub mod session;
pub mod simulation;
pub mod types;

pub use replication::{PeerChannel, PeerEvent, PeerState, RemotePuppet, SendGate, TransportError, TransportEvent};
pub use rooms::{Membership, RelayEvent, Role, RoomError, RoomRegistry, RoomSettings};
pub use session::PeerSession;
pub use simulation::{Simulation, dispatch_events};
pub use types::{ConnectionChoice, FrameEvent, FrameInput, GameMode, SessionStatus};
