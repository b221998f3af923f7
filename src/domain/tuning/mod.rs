// Gameplay tuning tables, overridable from a TOML file.

pub mod enemy;
pub mod net;
pub mod player;
pub mod projectile;
pub mod world;

use serde::Deserialize;
use std::fmt;

pub use enemy::WaveTuning;
pub use net::NetTuning;
pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;
pub use world::WorldTuning;

/// All gameplay tuning in one place. Weapon, enemy tier and vehicle stats live in
/// per-kind tables next to their state machines.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub world: WorldTuning,
    pub waves: WaveTuning,
    pub net: NetTuning,
}

#[derive(Debug)]
pub enum TuningError {
    Toml(toml::de::Error),
    Invalid(&'static str),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Toml(err) => write!(f, "{err}"),
            TuningError::Invalid(reason) => write!(f, "invalid tuning: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Toml(err) => Some(err),
            TuningError::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for TuningError {
    fn from(err: toml::de::Error) -> Self {
        TuningError::Toml(err)
    }
}

impl Tuning {
    /// Parses a TOML document; missing tables and keys fall back to defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Rejects values that leave a range empty or the arena without area.
    pub fn validate(&self) -> Result<(), TuningError> {
        let world = &self.world;
        if !(world.half_extent.is_finite() && world.half_extent > 0.0) {
            return Err(TuningError::Invalid("world.half_extent must be a positive number"));
        }
        if world.respawn_min_ms > world.respawn_max_ms {
            return Err(TuningError::Invalid(
                "world.respawn_min_ms must not exceed world.respawn_max_ms",
            ));
        }
        let net = &self.net;
        if net.min_lerp_rate > net.max_lerp_rate {
            return Err(TuningError::Invalid(
                "net.min_lerp_rate must not exceed net.max_lerp_rate",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let tuning = Tuning::from_toml_str(
            r#"
            [player]
            move_speed = 12.0

            [net]
            kills_to_win = 3
            "#,
        )
        .expect("valid toml");

        assert_eq!(tuning.player.move_speed, 12.0);
        assert_eq!(tuning.player.max_hp, PlayerTuning::default().max_hp);
        assert_eq!(tuning.net.kills_to_win, 3);
        assert_eq!(tuning.world.respawn_min_ms, 2000);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(matches!(
            Tuning::from_toml_str("[player\nmove_speed = "),
            Err(TuningError::Toml(_))
        ));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        for source in [
            "[net]\nmin_lerp_rate = 20.0\nmax_lerp_rate = 5.0",
            "[world]\nrespawn_min_ms = 9000\nrespawn_max_ms = 1000",
            "[world]\nhalf_extent = -4.0",
        ] {
            assert!(
                matches!(Tuning::from_toml_str(source), Err(TuningError::Invalid(_))),
                "{source}"
            );
        }
    }

    #[test]
    fn small_arena_is_accepted() {
        let tuning = Tuning::from_toml_str("[world]\nhalf_extent = 10.0").expect("valid tuning");
        assert_eq!(tuning.world.half_extent, 10.0);
    }
}
