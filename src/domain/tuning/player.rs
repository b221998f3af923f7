// Gameplay tuning for the local player.
//
// Keep this separate from runtime configuration (ports, channel sizes, timeouts).
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Ground speed in world units per second.
    pub move_speed: f32,

    /// Multiplier applied to `move_speed` while aiming down sights.
    pub aim_move_scale: f32,

    /// Initial upward velocity of a jump.
    pub jump_speed: f32,

    /// Eye height above the terrain surface.
    pub eye_height: f32,

    /// Horizontal collision radius.
    pub radius: f32,

    /// Collision box height measured from the feet.
    pub height: f32,

    pub max_hp: i32,

    /// Clamp for look pitch in radians.
    pub max_pitch: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            aim_move_scale: 0.6,
            jump_speed: 7.5,
            eye_height: 1.7,
            radius: 0.5,
            height: 1.8,
            max_hp: 100,
            max_pitch: 1.45,
        }
    }
}
