// Replication tuning for peer snapshots and puppet smoothing.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct NetTuning {
    /// Minimum spacing between state snapshots in seconds.
    pub min_send_interval: f32,
    /// Position change (world units) that counts as significant.
    pub position_epsilon: f32,
    /// Yaw change (radians) that counts as significant.
    pub rotation_epsilon: f32,

    /// Puppet blend rate floor and ceiling (per second).
    pub min_lerp_rate: f32,
    pub max_lerp_rate: f32,
    /// Blend rate gained per unit of remaining distance.
    pub lerp_rate_per_unit: f32,

    /// Yaw blend rate (per second).
    pub rotation_lerp_rate: f32,

    /// Dead reckoning stops extrapolating after this long without data.
    pub max_extrapolation: f32,

    /// Kills needed to win a versus match.
    pub kills_to_win: u32,
}

impl Default for NetTuning {
    fn default() -> Self {
        Self {
            min_send_interval: 0.05,
            position_epsilon: 0.01,
            rotation_epsilon: 0.01,
            min_lerp_rate: 5.0,
            max_lerp_rate: 20.0,
            lerp_rate_per_unit: 4.0,
            rotation_lerp_rate: 10.0,
            max_extrapolation: 0.25,
            kills_to_win: 10,
        }
    }
}
