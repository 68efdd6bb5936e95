//! Headless simulation loop pumping the world and its systems.

use std::time::Duration;

use log::{debug, info};
use serde::Serialize;
use skirmish_core::{Command, Event, GenerationError, RetirementReason, Team};
use skirmish_system_movement::Movement;
use skirmish_system_pathfinding::Pathfinding;
use skirmish_system_spawning::Spawning;
use skirmish_world::{self as world, query, World};

use crate::{
    config::Scenario,
    report::{Frame, SoldierFrame},
};

/// Per-team counters accumulated from world events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct TeamTally {
    pub(crate) spawned: u32,
    pub(crate) arrived: u32,
    pub(crate) defeated: u32,
}

/// World plus the systems that drive it on a fixed tick.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    pathfinding: Pathfinding,
    movement: Movement,
    spawning: Spawning,
    tick_interval: Duration,
    elapsed: Duration,
    tallies: [TeamTally; 2],
}

impl Session {
    /// Generates the battlefield and plans the initial routes.
    pub(crate) fn start(scenario: &Scenario) -> Result<Self, GenerationError> {
        let mut session = Self {
            world: World::new(),
            pathfinding: Pathfinding::default(),
            movement: Movement::new(scenario.movement),
            spawning: Spawning::new(scenario.spawning),
            tick_interval: scenario.movement.tick_interval(),
            elapsed: Duration::ZERO,
            tallies: [TeamTally::default(); 2],
        };

        let mut events = Vec::new();
        world::apply(
            &mut session.world,
            Command::ConfigureBattlefield {
                grid: scenario.grid,
                tree_count: scenario.trees,
                red_headquarters: scenario.red_headquarters,
                blue_headquarters: scenario.blue_headquarters,
                seed: scenario.seed,
            },
            &mut events,
        );
        let rejection = events.iter().find_map(|event| match event {
            Event::BattlefieldRejected { reason } => Some(*reason),
            _ => None,
        });
        if let Some(reason) = rejection {
            return Err(reason);
        }

        session.pump(events);
        Ok(session)
    }

    /// Advances the simulation by `duration`, sampling soldiers every
    /// `sample_every` of simulated time.
    ///
    /// The returned timeline always starts with the state before the first
    /// tick.
    pub(crate) fn run(&mut self, duration: Duration, sample_every: Duration) -> Vec<Frame> {
        let mut frames = vec![self.frame()];
        if self.tick_interval.is_zero() {
            return frames;
        }

        let end = self.elapsed.saturating_add(duration);
        let mut next_sample = self.elapsed.saturating_add(sample_every);
        while self.elapsed < end {
            self.step();
            if !sample_every.is_zero() && self.elapsed >= next_sample {
                frames.push(self.frame());
                while next_sample <= self.elapsed {
                    next_sample = next_sample.saturating_add(sample_every);
                }
            }
        }

        info!(
            "simulated {:.1}s: {} soldiers on the field",
            self.elapsed.as_secs_f64(),
            query::soldier_view(&self.world).len()
        );
        frames
    }

    /// Applies a single tick and lets every system react to it.
    pub(crate) fn step(&mut self) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: self.tick_interval,
            },
            &mut events,
        );
        self.elapsed = self.elapsed.saturating_add(self.tick_interval);
        self.pump(events);
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub(crate) fn tally(&self, team: Team) -> TeamTally {
        self.tallies[team_slot(team)]
    }

    fn pump(&mut self, pending_events: Vec<Event>) {
        let mut events = pending_events;

        loop {
            if events.is_empty() {
                break;
            }
            self.record(&events);

            let marching = query::marching_teams(&self.world);
            let mut commands = Vec::new();
            self.pathfinding
                .handle(&events, query::battlefield_view(&self.world), &mut commands);
            self.spawning.handle(&events, &marching, &mut commands);
            self.movement.handle(&events, &mut commands);

            if commands.is_empty() {
                break;
            }

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SoldierSpawned { team, .. } => {
                    self.tallies[team_slot(*team)].spawned += 1;
                }
                Event::SoldierRetired { team, reason, .. } => {
                    let tally = &mut self.tallies[team_slot(*team)];
                    match reason {
                        RetirementReason::Arrived => tally.arrived += 1,
                        RetirementReason::Defeated => tally.defeated += 1,
                    }
                }
                Event::SoldierSpawnRejected { team, reason } => {
                    debug!("{team} spawn rejected: {reason}");
                }
                _ => {}
            }
        }
    }

    fn frame(&self) -> Frame {
        let soldiers = query::soldier_view(&self.world)
            .iter()
            .map(|snapshot| SoldierFrame {
                id: snapshot.id,
                team: snapshot.team,
                position: snapshot.position,
                health: snapshot.health,
            })
            .collect();
        Frame {
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            soldiers,
        }
    }
}

fn team_slot(team: Team) -> usize {
    match team {
        Team::Red => 0,
        Team::Blue => 1,
    }
}
