#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting soldier spawn commands.

use std::time::Duration;

use log::{debug, warn};
use skirmish_core::{Command, Event, Health, Team, DEFAULT_SOLDIER_HEALTH};

/// Default cadence at which every marching team receives a new soldier.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(6);

/// Most spawn waves a single [`Spawning::handle`] call emits.
///
/// Elapsed time worth more waves than this is dropped.
pub const MAX_WAVES_PER_CALL: u32 = 64;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    spawn_interval: Duration,
    soldier_health: Health,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and the
    /// health granted to fresh soldiers.
    #[must_use]
    pub const fn new(spawn_interval: Duration, soldier_health: Health) -> Self {
        Self {
            spawn_interval,
            soldier_health,
        }
    }

    /// Time between two spawn waves.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Health assigned to spawned soldiers.
    #[must_use]
    pub const fn soldier_health(&self) -> Health {
        self.soldier_health
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_INTERVAL, DEFAULT_SOLDIER_HEALTH)
    }
}

/// Pure system that emits one spawn command per marching team every interval.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    soldier_health: Health,
    accumulator: Duration,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            soldier_health: config.soldier_health,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and the list of teams owning a route to emit spawn
    /// commands.
    ///
    /// Time that passes while no team can march does not count towards the
    /// next wave. At most [`MAX_WAVES_PER_CALL`] waves are emitted per call.
    pub fn handle(&mut self, events: &[Event], marching_teams: &[Team], out: &mut Vec<Command>) {
        if self.spawn_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::BattlefieldConfigured { .. } => {
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        if marching_teams.is_empty() {
            self.accumulator = Duration::ZERO;
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);

        let waves = self.resolve_spawn_waves();
        for _ in 0..waves {
            for &team in marching_teams {
                out.push(Command::SpawnSoldier {
                    team,
                    health: self.soldier_health,
                });
            }
        }
        if waves > 0 {
            debug!(
                "spawning {waves} wave(s) for {} team(s)",
                marching_teams.len()
            );
        }
    }

    fn resolve_spawn_waves(&mut self) -> u32 {
        let due = self.accumulator.as_nanos() / self.spawn_interval.as_nanos();
        match u32::try_from(due) {
            Ok(waves) if waves <= MAX_WAVES_PER_CALL => {
                self.accumulator -= self.spawn_interval * waves;
                waves
            }
            _ => {
                warn!(
                    "spawning dropped {} waves beyond the limit of {MAX_WAVES_PER_CALL}",
                    due - u128::from(MAX_WAVES_PER_CALL)
                );
                self.accumulator = Duration::ZERO;
                MAX_WAVES_PER_CALL
            }
        }
    }
}

impl Default for Spawning {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
