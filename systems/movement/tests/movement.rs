use std::time::Duration;

use skirmish_core::{
    CellCoord, Command, Event, GridSize, Health, Path, Position, RetirementReason, SoldierId,
    Team,
};
use skirmish_system_movement::{Config, Movement};
use skirmish_world::{self as world, query, World};

fn open_field(world: &mut World, grid: GridSize, red: CellCoord, blue: CellCoord) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::ConfigureBattlefield {
            grid,
            tree_count: 0,
            red_headquarters: red,
            blue_headquarters: blue,
            seed: 3,
        },
        &mut events,
    );
    assert!(matches!(
        events.first(),
        Some(Event::BattlefieldConfigured { .. })
    ));
}

fn assign_and_spawn(world: &mut World, team: Team, path: Path) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::AssignRoute { team, path }, &mut events);
    world::apply(
        world,
        Command::SpawnSoldier {
            team,
            health: Health::new(10),
        },
        &mut events,
    );
    events
}

fn tick(world: &mut World, movement: &mut Movement, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let mut commands = Vec::new();
    movement.handle(&events, &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn row_route(length: u32) -> Path {
    Path::new((0..length).map(|column| CellCoord::new(column, 0)).collect())
}

#[test]
fn soldier_walks_route_and_retires_on_arrival() {
    let mut world = World::new();
    open_field(
        &mut world,
        GridSize::new(5, 2),
        CellCoord::new(0, 0),
        CellCoord::new(4, 0),
    );
    let _ = assign_and_spawn(&mut world, Team::Red, row_route(5));
    let mut movement = Movement::new(Config::new(Duration::from_millis(100), 0.5));

    let events = tick(&mut world, &mut movement, Duration::from_millis(100));
    assert!(events.contains(&Event::SoldierAdvanced {
        soldier: SoldierId::new(0),
        position: Position::new(0.5, 0.0),
    }));

    let events = tick(&mut world, &mut movement, Duration::from_millis(500));
    let soldier = query::soldier_view(&world).into_vec().remove(0);
    assert_eq!(soldier.progress, 3.0);
    assert_eq!(soldier.position, Position::new(3.0, 0.0));
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::SoldierAdvanced { .. }))
            .count(),
        5
    );

    let _ = tick(&mut world, &mut movement, Duration::from_millis(100));
    assert_eq!(query::soldier_view(&world).len(), 1);

    let events = tick(&mut world, &mut movement, Duration::from_millis(100));
    assert!(query::soldier_view(&world).is_empty());
    assert_eq!(
        events.last(),
        Some(&Event::SoldierRetired {
            soldier: SoldierId::new(0),
            team: Team::Red,
            reason: RetirementReason::Arrived,
        })
    );
}

#[test]
fn overshooting_step_retires_in_the_same_tick() {
    let mut world = World::new();
    open_field(
        &mut world,
        GridSize::new(3, 3),
        CellCoord::new(1, 1),
        CellCoord::new(0, 0),
    );

    let path = Path::new(vec![CellCoord::new(1, 1), CellCoord::new(0, 1), CellCoord::new(0, 0)]);
    let events = assign_and_spawn(&mut world, Team::Red, path);
    assert!(events.contains(&Event::SoldierSpawned {
        soldier: SoldierId::new(0),
        team: Team::Red,
        cell: CellCoord::new(1, 1),
    }));

    let mut movement = Movement::new(Config::new(Duration::from_millis(100), 2.0));
    let events = tick(&mut world, &mut movement, Duration::from_millis(100));

    assert!(events.contains(&Event::SoldierRetired {
        soldier: SoldierId::new(0),
        team: Team::Red,
        reason: RetirementReason::Arrived,
    }));
    assert!(query::soldier_view(&world).is_empty());
}

#[test]
fn long_tick_emits_one_advance_per_interval() {
    let mut movement = Movement::default();
    let mut commands = Vec::new();

    movement.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(350),
        }],
        &mut commands,
    );

    assert_eq!(commands.len(), 3);
    assert!(commands
        .iter()
        .all(|command| *command == Command::AdvanceSoldiers { step: 0.1 }));
}

#[test]
fn soldiers_keep_their_route_when_team_route_changes() {
    let mut world = World::new();
    open_field(
        &mut world,
        GridSize::new(3, 2),
        CellCoord::new(0, 0),
        CellCoord::new(2, 0),
    );
    let first_route = row_route(3);
    let _ = assign_and_spawn(&mut world, Team::Red, first_route.clone());

    let detour = Path::new(vec![
        CellCoord::new(0, 0),
        CellCoord::new(0, 1),
        CellCoord::new(1, 1),
        CellCoord::new(2, 1),
        CellCoord::new(2, 0),
    ]);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::AssignRoute {
            team: Team::Red,
            path: detour.clone(),
        },
        &mut events,
    );

    let soldier = query::soldier_view(&world).into_vec().remove(0);
    assert!(soldier.route.shares_waypoints_with(&first_route));
    assert_eq!(query::route(&world, Team::Red), Some(&detour));
}

#[test]
fn damaged_soldier_is_removed_before_moving() {
    let mut world = World::new();
    open_field(
        &mut world,
        GridSize::new(4, 1),
        CellCoord::new(0, 0),
        CellCoord::new(3, 0),
    );
    let _ = assign_and_spawn(&mut world, Team::Red, row_route(4));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::DamageSoldier {
            soldier: SoldierId::new(0),
            amount: 10,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::SoldierRetired {
            soldier: SoldierId::new(0),
            team: Team::Red,
            reason: RetirementReason::Defeated,
        }]
    );
    let mut movement = Movement::default();
    let events = tick(&mut world, &mut movement, Duration::from_millis(100));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SoldierAdvanced { .. })));
}
