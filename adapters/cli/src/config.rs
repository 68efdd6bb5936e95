//! Scenario configuration loaded from TOML files and command-line overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use skirmish_core::{CellCoord, GridSize, Health, Team};
use thiserror::Error;

/// Raw scenario settings as written in a scenario file.
///
/// Every field is optional in the file; omitted fields fall back to the
/// classic 15 x 9 battlefield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScenarioConfig {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) trees: u32,
    pub(crate) seed: Option<u64>,
    pub(crate) red_headquarters: Option<CellCoord>,
    pub(crate) blue_headquarters: Option<CellCoord>,
    pub(crate) spawn_interval_ms: u64,
    pub(crate) soldier_health: u32,
    pub(crate) tick_interval_ms: u64,
    pub(crate) progress_per_tick: f32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            columns: 15,
            rows: 9,
            trees: 20,
            seed: None,
            red_headquarters: None,
            blue_headquarters: None,
            spawn_interval_ms: 6_000,
            soldier_health: skirmish_core::DEFAULT_SOLDIER_HEALTH.get(),
            tick_interval_ms: 100,
            progress_per_tick: 0.1,
        }
    }
}

impl ScenarioConfig {
    /// Parses a scenario from TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks the settings and resolves defaults into a runnable scenario.
    ///
    /// `fallback_seed` is used when the configuration does not pin a seed.
    pub(crate) fn validate(&self, fallback_seed: u64) -> Result<Scenario, ConfigError> {
        let grid = GridSize::new(self.columns, self.rows);
        if grid.is_empty() {
            return Err(ConfigError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }

        let red = self
            .red_headquarters
            .unwrap_or_else(|| CellCoord::new(2, 2));
        let blue = self.blue_headquarters.unwrap_or_else(|| {
            CellCoord::new(self.columns.saturating_sub(3), self.rows.saturating_sub(3))
        });
        for (team, cell) in [(Team::Red, red), (Team::Blue, blue)] {
            if !grid.contains(cell) {
                return Err(ConfigError::HeadquartersOutOfBounds {
                    team,
                    cell,
                    columns: self.columns,
                    rows: self.rows,
                });
            }
        }
        if red == blue {
            return Err(ConfigError::SharedHeadquarters { cell: red });
        }

        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::NonPositiveInterval {
                name: "spawn interval",
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::NonPositiveInterval {
                name: "tick interval",
            });
        }
        if !self.progress_per_tick.is_finite() || self.progress_per_tick <= 0.0 {
            return Err(ConfigError::InvalidProgressRate {
                value: self.progress_per_tick,
            });
        }
        if self.soldier_health == 0 {
            return Err(ConfigError::ZeroHealth);
        }

        Ok(Scenario {
            grid,
            trees: self.trees,
            seed: self.seed.unwrap_or(fallback_seed),
            red_headquarters: red,
            blue_headquarters: blue,
            spawning: skirmish_system_spawning::Config::new(
                Duration::from_millis(self.spawn_interval_ms),
                Health::new(self.soldier_health),
            ),
            movement: skirmish_system_movement::Config::new(
                Duration::from_millis(self.tick_interval_ms),
                self.progress_per_tick,
            ),
        })
    }
}

/// Validated scenario ready to drive a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Scenario {
    pub(crate) grid: GridSize,
    pub(crate) trees: u32,
    pub(crate) seed: u64,
    pub(crate) red_headquarters: CellCoord,
    pub(crate) blue_headquarters: CellCoord,
    pub(crate) spawning: skirmish_system_spawning::Config,
    pub(crate) movement: skirmish_system_movement::Config,
}

impl Scenario {
    pub(crate) fn headquarters(&self, team: Team) -> CellCoord {
        match team {
            Team::Red => self.red_headquarters,
            Team::Blue => self.blue_headquarters,
        }
    }
}

/// Reasons a scenario cannot be run.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The scenario file is not valid TOML or has unexpected fields.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    /// One of the grid dimensions is zero.
    #[error("grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// A headquarters lies outside the grid.
    #[error("{team} headquarters {cell} lies outside the {columns}x{rows} grid")]
    HeadquartersOutOfBounds {
        /// Team owning the headquarters.
        team: Team,
        /// Offending cell.
        cell: CellCoord,
        /// Grid column count.
        columns: u32,
        /// Grid row count.
        rows: u32,
    },
    /// Both headquarters were placed on the same cell.
    #[error("both headquarters occupy {cell}")]
    SharedHeadquarters {
        /// Shared cell.
        cell: CellCoord,
    },
    /// A timer interval is zero.
    #[error("{name} must be positive")]
    NonPositiveInterval {
        /// Human readable name of the interval.
        name: &'static str,
    },
    /// The movement rate is zero, negative or not a number.
    #[error("progress per tick must be a positive finite number, got {value}")]
    InvalidProgressRate {
        /// Offending rate.
        value: f32,
    },
    /// Soldiers would spawn already defeated.
    #[error("soldier health must be positive")]
    ZeroHealth,
}
