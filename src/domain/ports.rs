// Ports for collaborators the simulation talks to but does not own.

use crate::domain::state::{ActorKind, HudState};
use crate::domain::weapon::WeaponKind;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    MuzzleFlash(WeaponKind),
    Impact,
    Headshot,
    EnemyDeath,
    PlayerHurt,
    PlayerDeath,
    Reload,
    BossSpawn,
    VehicleEnter,
    VehicleExit,
}

/// Render/audio collaborator. The core never reads anything back from it.
pub trait Presenter {
    fn spawn_representation(&mut self, id: u64, kind: ActorKind, position: Vec3, yaw: f32);

    fn remove_representation(&mut self, _id: u64, _kind: ActorKind) {}

    fn play_effect(&mut self, effect: EffectKind, at: Vec3);

    fn update_hud(&mut self, hud: &HudState);
}

/// Source of candidate room codes. Collisions are handled by the caller.
pub trait RoomCodeSource: Send + Sync {
    fn next_code(&self) -> String;
}
