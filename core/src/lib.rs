#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Health assigned to freshly spawned soldiers unless configured otherwise.
pub const DEFAULT_SOLDIER_HEALTH: Health = Health::new(207);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the battlefield with a freshly generated layout.
    ConfigureBattlefield {
        /// Dimensions of the grid measured in cells.
        grid: GridSize,
        /// Number of trees scattered across the grid.
        tree_count: u32,
        /// Cell occupied by the red headquarters.
        red_headquarters: CellCoord,
        /// Cell occupied by the blue headquarters.
        blue_headquarters: CellCoord,
        /// Seed feeding the tree placement generator.
        seed: u64,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Installs the marching route soldiers of a team will follow.
    ///
    /// An empty path clears the route and marks the team as having no way
    /// through the trees.
    AssignRoute {
        /// Team whose route is replaced.
        team: Team,
        /// Waypoints from the team's headquarters to the opposing one.
        path: Path,
    },
    /// Requests that a soldier be spawned at the start of the team's route.
    SpawnSoldier {
        /// Team the soldier fights for.
        team: Team,
        /// Starting health of the soldier.
        health: Health,
    },
    /// Moves every live soldier forward along its route.
    AdvanceSoldiers {
        /// Amount added to each soldier's progress cursor.
        step: f32,
    },
    /// Applies damage to a single soldier.
    DamageSoldier {
        /// Identifier of the soldier being hit.
        soldier: SoldierId,
        /// Health points removed from the soldier.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new battlefield layout is active.
    BattlefieldConfigured {
        /// Dimensions of the configured grid.
        grid: GridSize,
        /// Number of trees that were placed.
        trees: usize,
    },
    /// Reports that a battlefield request could not be satisfied.
    BattlefieldRejected {
        /// Specific reason the layout could not be generated.
        reason: GenerationError,
    },
    /// Confirms that a barracks was placed next to a headquarters.
    BarracksPlaced {
        /// Team owning the barracks.
        team: Team,
        /// Cell occupied by the barracks.
        cell: CellCoord,
    },
    /// Reports that no free cell surrounds a team's headquarters.
    BarracksUnavailable {
        /// Team that could not receive a barracks.
        team: Team,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a team received a walkable route.
    RouteAssigned {
        /// Team whose route changed.
        team: Team,
        /// Number of waypoints in the route, endpoints included.
        waypoints: usize,
    },
    /// Reports that no route connects the team's headquarters to its target.
    RouteUnavailable {
        /// Team left without a route.
        team: Team,
    },
    /// Reports that a supplied route violated the battlefield constraints.
    RouteRejected {
        /// Team the route was meant for.
        team: Team,
        /// Specific reason the route was refused.
        reason: RouteError,
    },
    /// Confirms that a soldier entered the battlefield.
    SoldierSpawned {
        /// Identifier assigned to the new soldier.
        soldier: SoldierId,
        /// Team the soldier fights for.
        team: Team,
        /// First waypoint of the route, where the soldier appears.
        cell: CellCoord,
    },
    /// Reports that a spawn request was refused.
    SoldierSpawnRejected {
        /// Team that requested the spawn.
        team: Team,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Reports the interpolated position of a soldier after advancing.
    SoldierAdvanced {
        /// Identifier of the soldier that moved.
        soldier: SoldierId,
        /// Position reached after the advance.
        position: Position,
    },
    /// Reports that a soldier lost health but is still standing.
    SoldierDamaged {
        /// Identifier of the damaged soldier.
        soldier: SoldierId,
        /// Health remaining after the hit.
        health: Health,
    },
    /// Confirms that a soldier left the live set.
    SoldierRetired {
        /// Identifier of the retired soldier.
        soldier: SoldierId,
        /// Team the soldier fought for.
        team: Team,
        /// Why the soldier left the battlefield.
        reason: RetirementReason,
    },
}

/// Opposing sides of the skirmish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// Team based at the red headquarters.
    Red,
    /// Team based at the blue headquarters.
    Blue,
}

impl Team {
    /// Every team in deterministic processing order.
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    /// Team marching toward the opposite headquarters.
    #[must_use]
    pub const fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    /// Lower-case label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cardinal directions on the 4-connected grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing column indices.
    West,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing row indices.
    North,
}

impl Direction {
    /// Fixed neighbour order used for placement and search tie-breaks.
    pub const PRIORITY: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index (the `x` axis) of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index (the `y` axis) of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent_to(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Neighbouring cell in the provided direction, if it lies inside the grid.
    #[must_use]
    pub fn step(self, direction: Direction, grid: GridSize) -> Option<CellCoord> {
        let candidate = match direction {
            Direction::East => CellCoord::new(self.column.checked_add(1)?, self.row),
            Direction::West => CellCoord::new(self.column.checked_sub(1)?, self.row),
            Direction::South => CellCoord::new(self.column, self.row.checked_add(1)?),
            Direction::North => CellCoord::new(self.column, self.row.checked_sub(1)?),
        };
        grid.contains(candidate).then_some(candidate)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Dimensions of the battlefield grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the grid holds no cells at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Dense row-major index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Inverse of [`GridSize::index_of`].
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Set of impassable cells (trees) backed by a dense occupancy mask.
///
/// The insertion order is preserved so that generated layouts can be
/// replayed and compared verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstacleSet {
    grid: GridSize,
    mask: Vec<bool>,
    cells: Vec<CellCoord>,
}

impl ObstacleSet {
    /// Creates an empty obstacle set covering the provided grid.
    #[must_use]
    pub fn empty(grid: GridSize) -> Self {
        Self {
            grid,
            mask: vec![false; grid.cell_count()],
            cells: Vec::new(),
        }
    }

    /// Builds an obstacle set from explicit cells, skipping duplicates and
    /// cells outside the grid.
    #[must_use]
    pub fn from_cells<I>(grid: GridSize, cells: I) -> Self
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut set = Self::empty(grid);
        for cell in cells {
            let _ = set.insert(cell);
        }
        set
    }

    /// Marks the cell as blocked, returning `false` when it was out of bounds
    /// or already present.
    pub fn insert(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.grid.index_of(cell) else {
            return false;
        };
        if self.mask[index] {
            return false;
        }
        self.mask[index] = true;
        self.cells.push(cell);
        true
    }

    /// Reports whether the cell is blocked.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.grid
            .index_of(cell)
            .map_or(false, |index| self.mask[index])
    }

    /// Number of blocked cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Grid the set was built for.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Blocked cells in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}

/// Ordered sequence of waypoints shared by every soldier walking it.
///
/// An empty path means that no route exists. Cloning is cheap and never
/// copies the waypoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    waypoints: Arc<[CellCoord]>,
}

impl Path {
    /// Wraps the provided waypoints.
    #[must_use]
    pub fn new(waypoints: Vec<CellCoord>) -> Self {
        Self {
            waypoints: waypoints.into(),
        }
    }

    /// Path signalling that no route exists.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::new(Vec::new())
    }

    /// Reports whether the path is the "no route" value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints, endpoints included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Number of single-cell moves needed to walk the path.
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// First waypoint, absent for the empty path.
    #[must_use]
    pub fn first(&self) -> Option<CellCoord> {
        self.waypoints.first().copied()
    }

    /// Last waypoint, absent for the empty path.
    #[must_use]
    pub fn last(&self) -> Option<CellCoord> {
        self.waypoints.last().copied()
    }

    /// Waypoints in walking order.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Reports whether both values point at the same waypoint allocation.
    #[must_use]
    pub fn shares_waypoints_with(&self, other: &Path) -> bool {
        Arc::ptr_eq(&self.waypoints, &other.waypoints)
    }

    /// Interpolated position for the provided progress cursor.
    ///
    /// The integer part of `progress` selects the segment and the fractional
    /// part blends linearly between its endpoints. Returns `None` once the
    /// cursor reaches the final waypoint, because no segment remains to walk.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Option<Position> {
        if !progress.is_finite() || progress < 0.0 {
            return None;
        }
        let segment = progress.floor();
        let index = segment as usize;
        if index.saturating_add(1) >= self.waypoints.len() {
            return None;
        }
        let start = Position::from(self.waypoints[index]);
        let end = Position::from(self.waypoints[index + 1]);
        Some(start.lerp(end, progress - segment))
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::unreachable()
    }
}

impl From<Vec<CellCoord>> for Path {
    fn from(waypoints: Vec<CellCoord>) -> Self {
        Self::new(waypoints)
    }
}

/// Continuous location of a soldier expressed in cell units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a position from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, aligned with cell columns.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate, aligned with cell rows.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Linear blend `self + (other - self) * t` applied per axis.
    #[must_use]
    pub fn lerp(self, other: Position, t: f32) -> Position {
        Position::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<CellCoord> for Position {
    fn from(cell: CellCoord) -> Self {
        Position::new(cell.column() as f32, cell.row() as f32)
    }
}

/// Remaining hit points of a soldier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Health value representing a defeated soldier.
    pub const ZERO: Health = Health(0);

    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric health value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Health left after absorbing the provided damage.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Health {
        Health(self.0.saturating_sub(amount))
    }
}

/// Unique identifier assigned to a soldier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SoldierId(u32);

impl SoldierId {
    /// Creates a new soldier identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a soldier leaves the live set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetirementReason {
    /// The soldier walked to the final waypoint and was consumed there.
    Arrived,
    /// The soldier's health dropped to zero.
    Defeated,
}

/// Immutable representation of a single soldier's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct SoldierSnapshot {
    /// Unique identifier assigned to the soldier.
    pub id: SoldierId,
    /// Team the soldier fights for.
    pub team: Team,
    /// Interpolated position along the route.
    pub position: Position,
    /// Progress cursor into the route.
    pub progress: f32,
    /// Remaining health.
    pub health: Health,
    /// Route shared with the rest of the team.
    pub route: Path,
}

/// Read-only snapshot describing every live soldier.
#[derive(Clone, Debug, Default)]
pub struct SoldierView {
    snapshots: Vec<SoldierSnapshot>,
}

impl SoldierView {
    /// Creates a new soldier view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SoldierSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &SoldierSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live soldiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the battlefield holds no soldier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SoldierSnapshot> {
        self.snapshots
    }
}

/// Read-only view of the static battlefield layout.
#[derive(Clone, Copy, Debug)]
pub struct BattlefieldView<'a> {
    grid: GridSize,
    obstacles: &'a ObstacleSet,
    red_headquarters: CellCoord,
    blue_headquarters: CellCoord,
}

impl<'a> BattlefieldView<'a> {
    /// Captures a new battlefield view.
    #[must_use]
    pub fn new(
        grid: GridSize,
        obstacles: &'a ObstacleSet,
        red_headquarters: CellCoord,
        blue_headquarters: CellCoord,
    ) -> Self {
        Self {
            grid,
            obstacles,
            red_headquarters,
            blue_headquarters,
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Trees blocking movement.
    #[must_use]
    pub const fn obstacles(&self) -> &'a ObstacleSet {
        self.obstacles
    }

    /// Headquarters cell of the provided team.
    #[must_use]
    pub const fn headquarters(&self, team: Team) -> CellCoord {
        match team {
            Team::Red => self.red_headquarters,
            Team::Blue => self.blue_headquarters,
        }
    }
}

/// Reasons a battlefield layout cannot be generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GenerationError {
    /// The grid has no cells.
    #[error("grid {columns}x{rows} contains no cells")]
    InvalidGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// A reserved cell lies outside the grid.
    #[error("reserved cell {cell} lies outside the grid")]
    ReservedOutOfBounds {
        /// Offending reserved cell.
        cell: CellCoord,
    },
    /// Both headquarters were placed on the same cell.
    #[error("both headquarters occupy {cell}")]
    DuplicateHeadquarters {
        /// Shared cell.
        cell: CellCoord,
    },
    /// More obstacles were requested than free cells exist.
    #[error("{requested} obstacles requested but only {capacity} free cells exist")]
    Unsatisfiable {
        /// Requested obstacle count.
        requested: u32,
        /// Number of cells available for obstacles.
        capacity: u32,
    },
    /// The sampler spent its attempt budget before placing every obstacle.
    #[error("placed {placed} of {requested} obstacles after {attempts} attempts")]
    AttemptsExhausted {
        /// Obstacles placed before giving up.
        placed: u32,
        /// Requested obstacle count.
        requested: u32,
        /// Samples drawn.
        attempts: u64,
    },
}

/// Reasons a supplied route is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum RouteError {
    /// No battlefield is configured yet.
    #[error("no battlefield is configured")]
    BattlefieldMissing,
    /// A waypoint lies outside the grid.
    #[error("waypoint {cell} lies outside the grid")]
    OutOfBounds {
        /// Offending waypoint.
        cell: CellCoord,
    },
    /// A waypoint is covered by a tree.
    #[error("waypoint {cell} is blocked by a tree")]
    Blocked {
        /// Offending waypoint.
        cell: CellCoord,
    },
    /// Two consecutive waypoints do not share an edge.
    #[error("waypoints {from} and {to} are not adjacent")]
    Disjoint {
        /// Waypoint before the gap.
        from: CellCoord,
        /// Waypoint after the gap.
        to: CellCoord,
    },
    /// The route does not start at the team's headquarters.
    #[error("route starts at {found} instead of {expected}")]
    WrongOrigin {
        /// Headquarters of the team.
        expected: CellCoord,
        /// First waypoint of the route.
        found: CellCoord,
    },
    /// The route does not end at the opposing headquarters.
    #[error("route ends at {found} instead of {expected}")]
    WrongDestination {
        /// Headquarters of the opponent.
        expected: CellCoord,
        /// Last waypoint of the route.
        found: CellCoord,
    },
}

/// Reasons a spawn request is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum SpawnError {
    /// The team has no walkable route.
    #[error("team has no route to walk")]
    NoRoute,
    /// The requested starting health was zero.
    #[error("soldiers cannot spawn without health")]
    NoHealth,
}
