use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use skirmish_core::{CellCoord, Command, Event, GridSize, Health, SoldierId, Team};
use skirmish_system_pathfinding::Pathfinding;
use skirmish_system_spawning::{Config, Spawning, MAX_WAVES_PER_CALL};
use skirmish_world::{self as world, query, World};

fn time(ms: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(ms),
    }
}

#[test]
fn emits_one_wave_per_interval_for_large_dt() {
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), Health::new(9)));
    let mut commands = Vec::new();

    spawning.handle(&[time(2_000)], &Team::ALL, &mut commands);

    assert_eq!(commands.len(), 8, "expected one spawn per team per interval");
    assert_eq!(
        &commands[..2],
        &[
            Command::SpawnSoldier {
                team: Team::Red,
                health: Health::new(9),
            },
            Command::SpawnSoldier {
                team: Team::Blue,
                health: Health::new(9),
            },
        ]
    );
}

#[test]
fn idle_time_without_routes_is_discarded() {
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), Health::new(1)));
    let mut commands = Vec::new();

    spawning.handle(&[time(500)], &[Team::Red], &mut commands);
    assert!(commands.is_empty(), "no spawn before full interval");

    spawning.handle(&[time(5_000)], &[], &mut commands);
    assert!(commands.is_empty(), "nobody can march");

    spawning.handle(&[time(500)], &[Team::Blue], &mut commands);
    assert!(commands.is_empty(), "idle time does not count");

    spawning.handle(&[time(500)], &[Team::Blue], &mut commands);
    assert_eq!(
        commands,
        vec![Command::SpawnSoldier {
            team: Team::Blue,
            health: Health::new(1),
        }]
    );
}

#[test]
fn reconfiguration_restarts_the_cadence() {
    let mut spawning = Spawning::default();
    let mut commands = Vec::new();

    spawning.handle(&[time(5_900)], &[Team::Red], &mut commands);
    spawning.handle(
        &[Event::BattlefieldConfigured {
            grid: GridSize::new(3, 3),
            trees: 0,
        }],
        &[Team::Red],
        &mut commands,
    );
    spawning.handle(&[time(200)], &[Team::Red], &mut commands);
    assert!(commands.is_empty());

    spawning.handle(&[time(5_800)], &[Team::Red], &mut commands);
    assert_eq!(commands.len(), 1);
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay(scripted_commands(5));
    let second = replay(scripted_commands(5));

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn open_field_replay_matches_recorded_sequence() {
    let outcome = replay(scripted_commands(0));

    let team_of = |id: u32| if id % 2 == 0 { Team::Red } else { Team::Blue };
    let expected = ReplayOutcome {
        soldiers: (0..10)
            .map(|id| (SoldierId::new(id), team_of(id), 50))
            .collect(),
        spawns: (0..10)
            .map(|id| SpawnRecord {
                soldier: SoldierId::new(id),
                team: team_of(id),
                cell: match team_of(id) {
                    Team::Red => CellCoord::new(1, 1),
                    Team::Blue => CellCoord::new(5, 5),
                },
            })
            .collect(),
    };
    assert_eq!(outcome, expected);
}

#[test]
fn oversized_tick_spawns_a_bounded_number_of_waves() {
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), Health::new(3)));
    let mut commands = Vec::new();

    spawning.handle(&[time(86_400_000)], &Team::ALL, &mut commands);
    assert_eq!(commands.len(), 2 * MAX_WAVES_PER_CALL as usize);

    commands.clear();
    spawning.handle(&[time(500)], &Team::ALL, &mut commands);
    assert!(commands.is_empty(), "backlog beyond the limit is dropped");
}

#[test]
fn spawned_soldiers_start_at_their_headquarters() {
    let outcome = replay(scripted_commands(5));

    for record in &outcome.spawns {
        let expected = match record.team {
            Team::Red => CellCoord::new(1, 1),
            Team::Blue => CellCoord::new(5, 5),
        };
        assert_eq!(record.cell, expected);
    }
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut pathfinding = Pathfinding::default();
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(750), Health::new(50)));
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        process_systems(&mut world, &mut pathfinding, &mut spawning, events, &mut log);
    }

    let soldiers = query::soldier_view(&world)
        .into_vec()
        .into_iter()
        .map(|snapshot| (snapshot.id, snapshot.team, snapshot.health.get()))
        .collect();

    ReplayOutcome {
        soldiers,
        spawns: log,
    }
}

fn process_systems(
    world: &mut World,
    pathfinding: &mut Pathfinding,
    spawning: &mut Spawning,
    pending_events: Vec<Event>,
    log: &mut Vec<SpawnRecord>,
) {
    let mut events = pending_events;

    loop {
        if events.is_empty() {
            break;
        }

        let marching = query::marching_teams(world);
        let mut commands = Vec::new();
        pathfinding.handle(&events, query::battlefield_view(world), &mut commands);
        spawning.handle(&events, &marching, &mut commands);

        if commands.is_empty() {
            break;
        }

        events.clear();
        for command in commands {
            let mut generated_events = Vec::new();
            world::apply(world, command, &mut generated_events);
            for event in &generated_events {
                if let Event::SoldierSpawned {
                    soldier,
                    team,
                    cell,
                } = event
                {
                    log.push(SpawnRecord {
                        soldier: *soldier,
                        team: *team,
                        cell: *cell,
                    });
                }
            }
            events.extend(generated_events);
        }
    }
}

fn scripted_commands(tree_count: u32) -> Vec<Command> {
    let tick = |ms| Command::Tick {
        dt: Duration::from_millis(ms),
    };

    vec![
        Command::ConfigureBattlefield {
            grid: GridSize::new(7, 7),
            tree_count,
            red_headquarters: CellCoord::new(1, 1),
            blue_headquarters: CellCoord::new(5, 5),
            seed: 0x4d59_5df4_d0f3_3173,
        },
        tick(500),
        tick(500),
        tick(1_000),
        tick(2_000),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    soldiers: Vec<(SoldierId, Team, u32)>,
    spawns: Vec<SpawnRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SpawnRecord {
    soldier: SoldierId,
    team: Team,
    cell: CellCoord,
}
