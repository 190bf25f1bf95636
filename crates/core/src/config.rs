use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;
use crate::player::{DEFAULT_STARTING_MONEY, DEFAULT_STARTING_TALENT_POINTS};
use crate::stamina::{RegenPolicy, StaminaConfig};

/// Cadence of the cosmetic mission progress tick.
pub const DEFAULT_MISSION_TICK: Duration = Duration::from_secs(1);

/// Game configuration loaded from environment variables.
///
/// All fields have defaults matching the shipped game balance.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub stamina: StaminaConfig,
    /// How often a running mission publishes progress.
    pub mission_tick: Duration,
    /// Fixed seed for mission rolls; `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
    pub starting_money: u64,
    pub starting_talent_points: u32,
    /// Directory backing the on-device key-value store.
    pub data_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            stamina: StaminaConfig::default(),
            mission_tick: DEFAULT_MISSION_TICK,
            rng_seed: None,
            starting_money: DEFAULT_STARTING_MONEY,
            starting_talent_points: DEFAULT_STARTING_TALENT_POINTS,
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl GameConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default   |
    /// |--------------------------|-----------|
    /// | `STAMINA_MAX`            | `100`     |
    /// | `STAMINA_REGEN_MINUTES`  | `5`       |
    /// | `STAMINA_REGEN_POLICY`   | `reset`   |
    /// | `MISSION_TICK_MILLIS`    | `1000`    |
    /// | `MISSION_RNG_SEED`       | unset     |
    /// | `STARTING_MONEY`         | `3000`    |
    /// | `STARTING_TALENT_POINTS` | `3`       |
    /// | `BACKSTREET_DATA_DIR`    | `./data`  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let defaults = Self::default();

        let stamina = StaminaConfig {
            max: parse_or(&lookup, "STAMINA_MAX", defaults.stamina.max)?,
            regen_interval_minutes: parse_or(
                &lookup,
                "STAMINA_REGEN_MINUTES",
                defaults.stamina.regen_interval_minutes,
            )?,
            policy: match lookup("STAMINA_REGEN_POLICY") {
                Some(name) => RegenPolicy::from_name(&name)?,
                None => defaults.stamina.policy,
            },
        };
        stamina.validate()?;

        let tick_millis: u64 = parse_or(
            &lookup,
            "MISSION_TICK_MILLIS",
            defaults.mission_tick.as_millis() as u64,
        )?;
        if tick_millis == 0 {
            return Err(CoreError::Validation(
                "MISSION_TICK_MILLIS must be greater than zero".to_string(),
            ));
        }

        let rng_seed = match lookup("MISSION_RNG_SEED") {
            Some(raw) => Some(parse_value("MISSION_RNG_SEED", &raw)?),
            None => None,
        };

        Ok(Self {
            stamina,
            mission_tick: Duration::from_millis(tick_millis),
            rng_seed,
            starting_money: parse_or(&lookup, "STARTING_MONEY", defaults.starting_money)?,
            starting_talent_points: parse_or(
                &lookup,
                "STARTING_TALENT_POINTS",
                defaults.starting_talent_points,
            )?,
            data_dir: lookup("BACKSTREET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, CoreError> {
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("{key} has invalid value '{raw}'")))
}
