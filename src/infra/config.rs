use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MAX_TICKS: u32 = 500;
pub const DEFAULT_VISION_RADIUS: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid value")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be at least {min}, got {value}")]
    TooSmall {
        key: &'static str,
        value: i64,
        min: i64,
    },
}

/// Driver settings, read from the environment (a `.env` file is loaded by
/// `main` first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// ASCII arena to play on; the built-in arena when unset.
    pub map_path: Option<PathBuf>,
    /// RNG seed for exploration draws; entropy when unset.
    pub seed: Option<u64>,
    pub max_ticks: u32,
    pub vision_radius: i32,
    pub replays_folder: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_path: None,
            seed: None,
            max_ticks: DEFAULT_MAX_TICKS,
            vision_radius: DEFAULT_VISION_RADIUS,
            replays_folder: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vision_radius = parse(&lookup, "FLAGBOT_VISION_RADIUS")?.unwrap_or(DEFAULT_VISION_RADIUS);
        if vision_radius < 1 {
            return Err(ConfigError::TooSmall {
                key: "FLAGBOT_VISION_RADIUS",
                value: i64::from(vision_radius),
                min: 1,
            });
        }

        Ok(Self {
            map_path: lookup("FLAGBOT_MAP").map(PathBuf::from),
            seed: parse(&lookup, "FLAGBOT_SEED")?,
            max_ticks: parse(&lookup, "FLAGBOT_MAX_TICKS")?.unwrap_or(DEFAULT_MAX_TICKS),
            vision_radius,
            replays_folder: lookup("FLAGBOT_REPLAYS_FOLDER").map(PathBuf::from),
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(None),
    }
}
