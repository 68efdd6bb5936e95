#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The world owns the battlefield layout (grid, trees, headquarters,
//! barracks), the route assigned to each team, and the live soldier
//! collection. All mutation flows through [`apply`]; read access goes through
//! the [`query`] module.

mod obstacles;
mod placement;
mod routes;
mod soldiers;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    CellCoord, Command, Event, GenerationError, GridSize, Health, ObstacleSet, Path, RouteError,
    SpawnError, Team,
};

pub use obstacles::{generate_obstacles, generate_obstacles_with_budget};
pub use placement::find_free_adjacent_cell;
pub use routes::validate_route;

use soldiers::SoldierRoster;

/// Represents the authoritative Skirmish world state.
#[derive(Debug, Default)]
pub struct World {
    battlefield: Option<Battlefield>,
    soldiers: SoldierRoster,
    tick_index: u64,
}

impl World {
    /// Creates an empty world awaiting a battlefield configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
struct Battlefield {
    grid: GridSize,
    trees: ObstacleSet,
    red: TeamBase,
    blue: TeamBase,
}

impl Battlefield {
    fn base(&self, team: Team) -> &TeamBase {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    fn base_mut(&mut self, team: Team) -> &mut TeamBase {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }
}

#[derive(Debug)]
struct TeamBase {
    headquarters: CellCoord,
    barracks: Option<CellCoord>,
    route: Option<Path>,
}

impl TeamBase {
    fn at(headquarters: CellCoord) -> Self {
        Self {
            headquarters,
            barracks: None,
            route: None,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBattlefield {
            grid,
            tree_count,
            red_headquarters,
            blue_headquarters,
            seed,
        } => {
            match build_battlefield(grid, tree_count, red_headquarters, blue_headquarters, seed) {
                Ok(battlefield) => {
                    info!(
                        "battlefield {}x{} configured with {} trees (seed {seed:#x})",
                        grid.columns(),
                        grid.rows(),
                        battlefield.trees.len()
                    );
                    out_events.push(Event::BattlefieldConfigured {
                        grid,
                        trees: battlefield.trees.len(),
                    });
                    for team in Team::ALL {
                        match battlefield.base(team).barracks {
                            Some(cell) => out_events.push(Event::BarracksPlaced { team, cell }),
                            None => out_events.push(Event::BarracksUnavailable { team }),
                        }
                    }
                    world.battlefield = Some(battlefield);
                    world.soldiers.clear();
                }
                Err(reason) => {
                    warn!("battlefield request rejected: {reason}");
                    out_events.push(Event::BattlefieldRejected { reason });
                }
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::AssignRoute { team, path } => assign_route(world, team, path, out_events),
        Command::SpawnSoldier { team, health } => spawn_soldier(world, team, health, out_events),
        Command::AdvanceSoldiers { step } => {
            let step = if step.is_finite() { step.max(0.0) } else { 0.0 };
            world.soldiers.advance(step, out_events);
        }
        Command::DamageSoldier { soldier, amount } => {
            world.soldiers.damage(soldier, amount, out_events);
        }
    }
}

fn build_battlefield(
    grid: GridSize,
    tree_count: u32,
    red_headquarters: CellCoord,
    blue_headquarters: CellCoord,
    seed: u64,
) -> Result<Battlefield, GenerationError> {
    if red_headquarters == blue_headquarters {
        return Err(GenerationError::DuplicateHeadquarters {
            cell: red_headquarters,
        });
    }

    let reserved = [red_headquarters, blue_headquarters];
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let trees = generate_obstacles(tree_count, grid, &reserved, &mut rng)?;

    let mut battlefield = Battlefield {
        grid,
        trees,
        red: TeamBase::at(red_headquarters),
        blue: TeamBase::at(blue_headquarters),
    };

    let mut occupied = ObstacleSet::from_cells(
        grid,
        battlefield.trees.iter().chain(reserved.iter().copied()),
    );
    for team in Team::ALL {
        let headquarters = battlefield.base(team).headquarters;
        let barracks = find_free_adjacent_cell(headquarters, grid, |cell| occupied.contains(cell));
        if let Some(cell) = barracks {
            let _ = occupied.insert(cell);
        }
        battlefield.base_mut(team).barracks = barracks;
    }

    Ok(battlefield)
}

fn assign_route(world: &mut World, team: Team, path: Path, out_events: &mut Vec<Event>) {
    let Some(battlefield) = world.battlefield.as_mut() else {
        warn!("route for {team} ignored: no battlefield configured");
        out_events.push(Event::RouteRejected {
            team,
            reason: RouteError::BattlefieldMissing,
        });
        return;
    };

    let origin = battlefield.base(team).headquarters;
    let destination = battlefield.base(team.opponent()).headquarters;
    if let Err(reason) = validate_route(
        &path,
        battlefield.grid,
        &battlefield.trees,
        origin,
        destination,
    ) {
        warn!("route for {team} rejected: {reason}");
        out_events.push(Event::RouteRejected { team, reason });
        return;
    }

    if path.is_empty() {
        info!("no route connects the {team} headquarters to its target");
        out_events.push(Event::RouteUnavailable { team });
    } else {
        debug!("{team} route assigned with {} hops", path.hop_count());
        out_events.push(Event::RouteAssigned {
            team,
            waypoints: path.len(),
        });
    }
    battlefield.base_mut(team).route = Some(path);
}

fn spawn_soldier(world: &mut World, team: Team, health: Health, out_events: &mut Vec<Event>) {
    if health.is_depleted() {
        out_events.push(Event::SoldierSpawnRejected {
            team,
            reason: SpawnError::NoHealth,
        });
        return;
    }

    let route = world
        .battlefield
        .as_ref()
        .and_then(|battlefield| battlefield.base(team).route.clone());
    let Some((route, cell)) = route.and_then(|route| route.first().map(|cell| (route, cell))) else {
        debug!("{team} spawn rejected: no route");
        out_events.push(Event::SoldierSpawnRejected {
            team,
            reason: SpawnError::NoRoute,
        });
        return;
    };

    if let Some(soldier) = world.soldiers.spawn(team, route, health) {
        debug!("{team} soldier {} spawned", soldier.id.get());
        out_events.push(Event::SoldierSpawned {
            soldier: soldier.id,
            team,
            cell,
        });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use skirmish_core::{
        BattlefieldView, CellCoord, GridSize, ObstacleSet, Path, SoldierView, Team,
    };

    /// Dimensions of the active battlefield, if one is configured.
    #[must_use]
    pub fn grid(world: &World) -> Option<GridSize> {
        world.battlefield.as_ref().map(|battlefield| battlefield.grid)
    }

    /// Trees blocking the active battlefield.
    #[must_use]
    pub fn obstacles(world: &World) -> Option<&ObstacleSet> {
        world
            .battlefield
            .as_ref()
            .map(|battlefield| &battlefield.trees)
    }

    /// Captures a read-only view of the static battlefield layout.
    #[must_use]
    pub fn battlefield_view(world: &World) -> Option<BattlefieldView<'_>> {
        world.battlefield.as_ref().map(|battlefield| {
            BattlefieldView::new(
                battlefield.grid,
                &battlefield.trees,
                battlefield.red.headquarters,
                battlefield.blue.headquarters,
            )
        })
    }

    /// Headquarters cell of the provided team.
    #[must_use]
    pub fn headquarters(world: &World, team: Team) -> Option<CellCoord> {
        world
            .battlefield
            .as_ref()
            .map(|battlefield| battlefield.base(team).headquarters)
    }

    /// Barracks cell of the provided team, absent when no free cell was found.
    #[must_use]
    pub fn barracks(world: &World, team: Team) -> Option<CellCoord> {
        world
            .battlefield
            .as_ref()
            .and_then(|battlefield| battlefield.base(team).barracks)
    }

    /// Route assigned to the team; `None` until one has been assigned.
    #[must_use]
    pub fn route(world: &World, team: Team) -> Option<&Path> {
        world
            .battlefield
            .as_ref()
            .and_then(|battlefield| battlefield.base(team).route.as_ref())
    }

    /// Teams that currently own a walkable route, in deterministic order.
    #[must_use]
    pub fn marching_teams(world: &World) -> Vec<Team> {
        Team::ALL
            .into_iter()
            .filter(|team| route(world, *team).map_or(false, |path| !path.is_empty()))
            .collect()
    }

    /// Captures a read-only view of the live soldiers.
    #[must_use]
    pub fn soldier_view(world: &World) -> SoldierView {
        SoldierView::from_snapshots(world.soldiers.iter().map(|soldier| soldier.snapshot()).collect())
    }

    /// Number of `Tick` commands processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
