// Gameplay tuning for projectiles and hit volumes.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Lifetime in seconds before the projectile is despawned.
    pub life_time: f32,

    /// Projectiles further than this from the world origin (XZ) are culled.
    pub max_distance: f32,

    /// Extra margin added around target bounding volumes.
    pub hit_margin: f32,

    /// Radius of the head sphere used for headshot classification.
    pub head_radius: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            life_time: 3.0,
            max_distance: 300.0,
            hit_margin: 0.2,
            head_radius: 0.35,
        }
    }
}
