// Wire protocol DTOs and conversions for messages exchanged between peers and the relay.

use crate::use_cases::{PeerEvent, PeerState, TransportEvent};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Every text frame on a room socket. Peers produce the gameplay variants; the relay
/// produces `PeerJoined` and `PeerLeft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChannelMessage {
    // Continuous snapshot, rate limited by the sender.
    State(PeerStateDto),
    // Damage the receiver applies to its own player, unverified.
    Hit { damage: i32 },
    Death,
    Respawn(PositionDto),
    Win { kills: u32 },
    PeerJoined,
    PeerLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionDto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PositionDto {
    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vec3> for PositionDto {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<PositionDto> for Vec3 {
    fn from(p: PositionDto) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerStateDto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub health: i32,
    #[serde(default)]
    pub shooting: bool,
}

impl From<PeerState> for PeerStateDto {
    fn from(s: PeerState) -> Self {
        Self {
            x: s.position.x,
            y: s.position.y,
            z: s.position.z,
            yaw: s.yaw,
            health: s.health,
            shooting: s.shooting,
        }
    }
}

impl From<PeerStateDto> for PeerState {
    fn from(s: PeerStateDto) -> Self {
        Self {
            position: Vec3::new(s.x, s.y, s.z),
            yaw: s.yaw,
            health: s.health,
            shooting: s.shooting,
        }
    }
}

impl From<PeerEvent> for ChannelMessage {
    fn from(event: PeerEvent) -> Self {
        match event {
            PeerEvent::State(state) => ChannelMessage::State(state.into()),
            PeerEvent::Hit { damage } => ChannelMessage::Hit { damage },
            PeerEvent::Death => ChannelMessage::Death,
            PeerEvent::Respawn { position } => ChannelMessage::Respawn(position.into()),
            PeerEvent::Win { kills } => ChannelMessage::Win { kills },
        }
    }
}

impl ChannelMessage {
    /// Converts an inbound frame for the simulation. Non-finite coordinates are dropped.
    pub fn into_transport_event(self, received_at: Instant) -> Option<TransportEvent> {
        let event = match self {
            ChannelMessage::PeerJoined => return Some(TransportEvent::PeerJoined),
            ChannelMessage::PeerLeft => return Some(TransportEvent::PeerLeft),
            ChannelMessage::State(state) => {
                let finite = state.x.is_finite()
                    && state.y.is_finite()
                    && state.z.is_finite()
                    && state.yaw.is_finite();
                if !finite {
                    return None;
                }
                PeerEvent::State(state.into())
            }
            ChannelMessage::Hit { damage } => PeerEvent::Hit { damage },
            ChannelMessage::Death => PeerEvent::Death,
            ChannelMessage::Respawn(position) => {
                if !position.is_finite() {
                    return None;
                }
                PeerEvent::Respawn {
                    position: position.into(),
                }
            }
            ChannelMessage::Win { kills } => PeerEvent::Win { kills },
        };
        Some(TransportEvent::Message { event, received_at })
    }
}

/// Body of `POST /rooms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreatedDto {
    pub room_code: String,
}
