//! Simulation configuration and its validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_duel_core::Catalog;
use tower_duel_system_observation::Normalization;
use tower_duel_system_spawning::WaveMode;

/// Reasons a configuration cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A duration is negative, zero, or not a number.
    #[error("`{field}` must be a positive number of seconds, got {value}")]
    InvalidDuration {
        /// Offending field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },
    /// Composed waves would never fill.
    #[error("roster size must be at least 1")]
    EmptyRoster,
    /// The per-episode wave budget range is empty.
    #[error("sequence range {min}..{max} is empty")]
    EmptySequenceRange {
        /// Inclusive lower bound.
        min: u32,
        /// Exclusive upper bound.
        max: u32,
    },
    /// The generated wave count range is empty.
    #[error("generated wave range {min}..={max} is empty")]
    EmptyWaveCount {
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },
    /// The placement grid has no cells.
    #[error("grid must have at least one cell, got {width}x{height}")]
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// The level has nothing to defend.
    #[error("at least one home base with positive health is required")]
    NoHomeBase,
    /// The catalog lacks units or towers.
    #[error("catalog needs at least one unit and one tower")]
    EmptyCatalog,
}

/// Level flow switches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelSettings {
    /// Whether the level waits for an intro before building starts.
    pub has_intro: bool,
    /// Whether building ends as soon as an episode begins.
    pub auto_complete_building: bool,
    /// Whether attacker income also accrues during intro and building.
    pub always_gain_currency: bool,
    /// Seconds between economy log reports.
    pub economy_report_interval: f64,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            has_intro: false,
            auto_complete_building: true,
            always_gain_currency: false,
            economy_report_interval: 5.0,
        }
    }
}

/// Starting balances and attacker passive income.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomySettings {
    /// Attacker balance at the start of every episode.
    pub attacker_starting_balance: u32,
    /// Defender balance at the start of every episode.
    pub defender_starting_balance: u32,
    /// Seconds between attacker income grants.
    pub income_interval: f64,
    /// Attacker income per grant before any purchase.
    pub flat_income: u32,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            attacker_starting_balance: 100,
            defender_starting_balance: 100,
            income_interval: 1.0,
            flat_income: 10,
        }
    }
}

/// Wave composition settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveSettings {
    /// Whether waves are bought by the attacker or generated.
    pub mode: WaveMode,
    /// Instructions a composed wave needs before it runs.
    pub roster_size: usize,
    /// Lowest per-episode composed wave budget.
    pub min_sequences: u32,
    /// Exclusive upper bound of the composed wave budget.
    pub max_sequences: u32,
    /// Fewest generated waves per episode.
    pub generated_min: u32,
    /// Most generated waves per episode.
    pub generated_max: u32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            mode: WaveMode::Composed,
            roster_size: 15,
            min_sequences: 2,
            max_sequences: 5,
            generated_min: 2,
            generated_max: 5,
        }
    }
}

/// Terminal rewards and the training horizon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EpisodeSettings {
    /// Group reward of the winning team.
    pub win_reward: f32,
    /// Group reward of the losing team.
    pub loss_reward: f32,
    /// Completed games after which training stops.
    pub max_episodes: Option<u64>,
}

impl Default for EpisodeSettings {
    fn default() -> Self {
        Self {
            win_reward: 1.0,
            loss_reward: -1.0,
            max_episodes: None,
        }
    }
}

/// Battlefield dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaSettings {
    /// Placement grid columns.
    pub grid_width: u32,
    /// Placement grid rows.
    pub grid_height: u32,
    /// Number of home bases.
    pub home_bases: u32,
    /// Maximum health of each home base.
    pub base_health: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            grid_width: 6,
            grid_height: 7,
            home_bases: 1,
            base_health: 100.0,
        }
    }
}

/// Complete configuration of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Global seed every random stream derives from.
    pub seed: u64,
    /// Level flow switches.
    pub level: LevelSettings,
    /// Balances and income.
    pub economy: EconomySettings,
    /// Wave composition.
    pub waves: WaveSettings,
    /// Rewards and horizon.
    pub episodes: EpisodeSettings,
    /// Battlefield dimensions.
    pub arena: ArenaSettings,
    /// Observation scaling.
    pub observation: Normalization,
    /// Purchasable units and towers.
    pub catalog: Catalog,
}

impl SimulationConfig {
    /// Parses and validates a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every constraint the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.income_interval()?;
        let _ = self.report_interval()?;
        if self.waves.roster_size == 0 {
            return Err(ConfigError::EmptyRoster);
        }
        if self.waves.min_sequences >= self.waves.max_sequences {
            return Err(ConfigError::EmptySequenceRange {
                min: self.waves.min_sequences,
                max: self.waves.max_sequences,
            });
        }
        if self.waves.generated_min > self.waves.generated_max {
            return Err(ConfigError::EmptyWaveCount {
                min: self.waves.generated_min,
                max: self.waves.generated_max,
            });
        }
        if self.arena.grid_width == 0 || self.arena.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.arena.grid_width,
                height: self.arena.grid_height,
            });
        }
        let base_health = self.arena.base_health;
        if self.arena.home_bases == 0 || !base_health.is_finite() || base_health <= 0.0 {
            return Err(ConfigError::NoHomeBase);
        }
        if self.catalog.unit_count() == 0 || self.catalog.tower_count() == 0 {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(())
    }

    /// Interval between attacker income grants.
    pub fn income_interval(&self) -> Result<Duration, ConfigError> {
        positive_seconds("economy.income_interval", self.economy.income_interval)
    }

    /// Interval between economy log reports.
    pub fn report_interval(&self) -> Result<Duration, ConfigError> {
        positive_seconds(
            "level.economy_report_interval",
            self.level.economy_report_interval,
        )
    }
}

fn positive_seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(value) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(ConfigError::InvalidDuration { field, value }),
    }
}
