// Shared use-case types for the frame loop.

use crate::domain::enemy::EnemyTier;
use crate::domain::state::MatchOutcome;
use crate::domain::vehicle::VehicleKind;
use crate::domain::weapon::WeaponKind;
use crate::use_cases::replication::PeerChannel;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Enemy waves, no network.
    Solo,
    /// One remote peer as the only opponent; no enemies.
    Versus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    /// The peer channel dropped; the simulation is frozen until the caller decides.
    ConnectionLost,
    Finished,
}

/// Caller's answer to a connection loss.
pub enum ConnectionChoice {
    Reconnect(Box<dyn PeerChannel>),
    Abandon,
}

/// Frame-latched input. The edge-triggered fields are cleared by the simulation once read.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub move_forward: bool,
    pub move_back: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub fire_held: bool,
    pub aim_held: bool,
    /// Radians; positive turns left.
    pub look_yaw: f32,
    /// Radians; positive looks up.
    pub look_pitch: f32,
    pub reload_requested: bool,
    pub interact_requested: bool,
    pub switch_weapon: Option<WeaponKind>,
}

impl FrameInput {
    pub fn forward_axis(&self) -> f32 {
        axis(self.move_forward, self.move_back)
    }

    pub fn strafe_axis(&self) -> f32 {
        axis(self.move_right, self.move_left)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Things that happened during one frame, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    ShotFired { weapon: WeaponKind, origin: Vec3, direction: Vec3 },
    ReloadStarted { weapon: WeaponKind },
    ReloadFinished { weapon: WeaponKind, transferred: u32 },
    WeaponSwitched { weapon: WeaponKind },
    EnemySpawned { enemy_id: u64, tier: EnemyTier, position: Vec3 },
    EnemyHit { enemy_id: u64, damage: i32, headshot: bool, point: Vec3 },
    EnemyKilled { enemy_id: u64, tier: EnemyTier, headshot: bool, points: u64, position: Vec3 },
    EnemyRemoved { enemy_id: u64, tier: EnemyTier },
    BossSpawned { enemy_id: u64 },
    WaveAdvanced { wave: u32 },
    PlayerDamaged { damage: i32, health: i32 },
    PlayerDied { position: Vec3 },
    PlayerRespawned { position: Vec3 },
    VehicleEntered { vehicle_id: u64, kind: VehicleKind },
    VehicleExited { vehicle_id: u64, kind: VehicleKind, position: Vec3 },
    PeerHit { damage: i32, headshot: bool, point: Vec3 },
    PeerJoined,
    PeerKilled { kills: u32 },
    PeerRespawned { position: Vec3 },
    MatchEnded { outcome: MatchOutcome },
    ConnectionLost,
}
