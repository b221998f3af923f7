// Wave pacing and scoring.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Regular enemies kept alive during wave 0.
    pub base_enemies: usize,
    /// Additional regular enemies per cleared wave.
    pub per_wave: usize,
    pub max_enemies: usize,

    /// A boss spawns every `boss_every_kills` kills while none is alive.
    pub boss_every_kills: u32,

    /// Duration of the hit stagger overlay.
    pub stagger_seconds: f32,
    /// Movement scale while staggered.
    pub stagger_speed_scale: f32,

    /// Length of the death fall before cleanup.
    pub death_seconds: f32,

    pub kill_score: u32,
    pub headshot_score: u32,
    pub streak_step: f32,
    pub max_multiplier: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            base_enemies: 6,
            per_wave: 2,
            max_enemies: 20,
            boss_every_kills: 10,
            stagger_seconds: 0.3,
            stagger_speed_scale: 0.3,
            death_seconds: 1.0,
            kill_score: 100,
            headshot_score: 150,
            streak_step: 0.1,
            max_multiplier: 2.0,
        }
    }
}
