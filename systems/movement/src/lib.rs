#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-rate movement timer that walks soldiers along their routes.

use std::time::Duration;

use log::{trace, warn};
use skirmish_core::{Command, Event};

/// Default cadence of movement ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Default route progress gained by a soldier on every movement tick.
pub const DEFAULT_PROGRESS_PER_TICK: f32 = 0.1;

/// Most `AdvanceSoldiers` commands a single [`Movement::handle`] call emits.
///
/// Elapsed time worth more ticks than this is dropped.
pub const MAX_TICKS_PER_CALL: u32 = 1_024;

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    tick_interval: Duration,
    progress_per_tick: f32,
}

impl Config {
    /// Creates a configuration advancing soldiers by `progress_per_tick`
    /// waypoints every `tick_interval`.
    #[must_use]
    pub const fn new(tick_interval: Duration, progress_per_tick: f32) -> Self {
        Self {
            tick_interval,
            progress_per_tick,
        }
    }

    /// Time between two movement ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Route progress applied per movement tick.
    #[must_use]
    pub const fn progress_per_tick(&self) -> f32 {
        self.progress_per_tick
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL, DEFAULT_PROGRESS_PER_TICK)
    }
}

/// Pure system that converts elapsed time into soldier advancement commands.
#[derive(Debug)]
pub struct Movement {
    tick_interval: Duration,
    progress_per_tick: f32,
    accumulator: Duration,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            progress_per_tick: config.progress_per_tick,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes world events and emits one `AdvanceSoldiers` per elapsed tick.
    ///
    /// Leftover time below a full interval carries over to the next call. A
    /// freshly configured battlefield discards it, since the world dropped
    /// every soldier the leftover would have moved. At most
    /// [`MAX_TICKS_PER_CALL`] commands are emitted per call.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.tick_interval.is_zero()
            || self.progress_per_tick.is_nan()
            || self.progress_per_tick <= 0.0
        {
            return;
        }

        for event in events {
            match event {
                Event::BattlefieldConfigured { .. } => self.accumulator = Duration::ZERO,
                Event::TimeAdvanced { dt } => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                }
                _ => {}
            }
        }

        let due = self.accumulator.as_nanos() / self.tick_interval.as_nanos();
        if due == 0 {
            return;
        }

        let ticks = match u32::try_from(due) {
            Ok(ticks) if ticks <= MAX_TICKS_PER_CALL => {
                self.accumulator -= self.tick_interval * ticks;
                ticks
            }
            _ => {
                warn!(
                    "movement dropped {} ticks beyond the limit of {MAX_TICKS_PER_CALL}",
                    due - u128::from(MAX_TICKS_PER_CALL)
                );
                self.accumulator = Duration::ZERO;
                MAX_TICKS_PER_CALL
            }
        };
        out.extend((0..ticks).map(|_| Command::AdvanceSoldiers {
            step: self.progress_per_tick,
        }));
        trace!("movement emitted {ticks} advance commands");
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(ms: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_millis(ms),
        }
    }

    #[test]
    fn carries_partial_intervals_between_calls() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();

        movement.handle(&[time(60)], &mut commands);
        assert!(commands.is_empty());

        movement.handle(&[time(60)], &mut commands);
        assert_eq!(commands, vec![Command::AdvanceSoldiers { step: 0.1 }]);
    }

    #[test]
    fn zero_rate_disables_movement() {
        let mut movement = Movement::new(Config::new(Duration::from_millis(100), 0.0));
        let mut commands = Vec::new();
        movement.handle(&[time(1_000)], &mut commands);
        assert!(commands.is_empty());

        let mut movement = Movement::new(Config::new(Duration::ZERO, 0.5));
        movement.handle(&[time(1_000)], &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn oversized_tick_is_capped_and_backlog_dropped() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();

        movement.handle(&[time(3_600_000)], &mut commands);
        assert_eq!(commands.len(), MAX_TICKS_PER_CALL as usize);

        commands.clear();
        movement.handle(&[time(50)], &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn exact_limit_keeps_remainder() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();

        movement.handle(&[time(102_450)], &mut commands);
        assert_eq!(commands.len(), MAX_TICKS_PER_CALL as usize);

        commands.clear();
        movement.handle(&[time(50)], &mut commands);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn reconfiguration_discards_leftover_time() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        movement.handle(&[time(90)], &mut commands);
        movement.handle(
            &[Event::BattlefieldConfigured {
                grid: skirmish_core::GridSize::new(2, 2),
                trees: 0,
            }],
            &mut commands,
        );
        movement.handle(&[time(20)], &mut commands);

        assert!(commands.is_empty());
    }
}
