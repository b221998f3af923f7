// World layout, terrain generation and spawn rules.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Playable area is `[-half_extent, half_extent]` on X and Z.
    pub half_extent: f32,

    pub gravity: f32,

    /// Heightfield cells per side.
    pub terrain_cells: usize,
    pub terrain_amplitude: f32,
    pub terrain_frequency: f32,

    /// Number of static buildings placed at world load.
    pub building_count: usize,

    /// Nothing spawns closer than this to the origin.
    pub spawn_safe_radius: f32,

    /// Respawn delay window in milliseconds.
    pub respawn_min_ms: u64,
    pub respawn_max_ms: u64,

    /// Seed for terrain, buildings and spawn randomness.
    pub seed: u64,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            half_extent: 200.0,
            gravity: 20.0,
            terrain_cells: 128,
            terrain_amplitude: 2.5,
            terrain_frequency: 0.035,
            building_count: 24,
            spawn_safe_radius: 30.0,
            respawn_min_ms: 2000,
            respawn_max_ms: 4000,
            seed: 0x5eed,
        }
    }
}
