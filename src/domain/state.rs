// Read-only snapshots handed to presentation.

use crate::domain::enemy::EnemyTier;
use crate::domain::vehicle::VehicleKind;
use crate::domain::weapon::WeaponKind;
use glam::Vec3;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActorKind {
    Player,
    Enemy(EnemyTier),
    Peer,
    Vehicle(VehicleKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchOutcome {
    InProgress,
    Won,
    Lost,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSnapshot {
    pub id: u64,
    pub kind: ActorKind,
    pub position: Vec3,
    pub yaw: f32,
    pub health: i32,
    pub max_health: i32,
    // Fall animation rotation for dying enemies.
    pub tilt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudState {
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub weapon: WeaponKind,
    pub ammo: u32,
    pub reserve: u32,
    pub reloading: bool,
    pub ads_blend: f32,
    pub recoil: f32,
    pub score: u64,
    pub kills: u32,
    pub streak: u32,
    pub multiplier: f32,
    pub wave: u32,
    pub boss_alive: bool,
    pub driving: Option<VehicleKind>,
    /// Versus only: kills scored against the remote peer.
    pub peer_kills: u32,
    pub outcome: MatchOutcome,
    pub paused: bool,
    pub connection_lost: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub camera_position: Vec3,
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub actors: Vec<ActorSnapshot>,
    pub projectiles: Vec<Vec3>,
    pub hud: HudState,
}
