use crate::domain::Tuning;
use crate::domain::tuning::TuningError;
use std::{env, fmt, fs, io, path::PathBuf, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn relay_port() -> u16 {
    env::var("RELAY_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3010)
}

pub fn relay_url() -> String {
    env::var("RELAY_URL").unwrap_or_else(|_| format!("http://127.0.0.1:{}", relay_port()))
}

pub fn join_timeout() -> Duration {
    let millis = env::var("RELAY_JOIN_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(5000);
    Duration::from_millis(millis)
}

pub const ROOM_CODE_LEN: usize = 5;
pub const MAX_ROOM_CODE_ATTEMPTS: usize = 16;
pub const SEAT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: TuningError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read tuning file {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid tuning file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Gameplay tuning: defaults, overridden by the TOML file named in `SKIRMISH_TUNING`.
pub fn load_tuning() -> Result<Tuning, ConfigError> {
    match env::var_os("SKIRMISH_TUNING") {
        Some(path) => load_tuning_from(PathBuf::from(path)),
        None => Ok(Tuning::default()),
    }
}

pub fn load_tuning_from(path: PathBuf) -> Result<Tuning, ConfigError> {
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    let tuning = match Tuning::from_toml_str(&source) {
        Ok(tuning) => tuning,
        Err(source) => return Err(ConfigError::Parse { path, source }),
    };
    tracing::info!(path = %path.display(), "loaded tuning overrides");
    Ok(tuning)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
        fs::write(&path, contents).expect("write scratch tuning");
        path
    }

    #[test]
    fn tuning_file_overrides_defaults() {
        let path = scratch_file("skirmish-tuning-ok", "[player]\nmove_speed = 3.5\n");
        let tuning = load_tuning_from(path.clone()).expect("valid tuning");
        let _ = fs::remove_file(path);
        assert_eq!(tuning.player.move_speed, 3.5);
        assert_eq!(tuning.world.seed, Tuning::default().world.seed);
    }

    #[test]
    fn unreadable_and_malformed_files_are_reported() {
        let missing = env::temp_dir().join("skirmish-tuning-does-not-exist.toml");
        assert!(matches!(load_tuning_from(missing), Err(ConfigError::Read { .. })));

        let path = scratch_file("skirmish-tuning-bad", "[player\nmove_speed = ");
        let result = load_tuning_from(path.clone());
        let _ = fs::remove_file(path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn inverted_lerp_range_is_refused() {
        let path = scratch_file(
            "skirmish-tuning-inverted",
            "[net]\nmin_lerp_rate = 30.0\nmax_lerp_rate = 2.0\n",
        );
        let result = load_tuning_from(path.clone());
        let _ = fs::remove_file(path);
        assert!(matches!(
            result,
            Err(ConfigError::Parse {
                source: TuningError::Invalid(_),
                ..
            })
        ));
    }
}
