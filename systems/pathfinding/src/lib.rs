#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* route planning between headquarters.
//!
//! [`find_path`] computes a shortest 4-connected path on a grid using a
//! Manhattan heuristic. The [`Pathfinding`] system reacts to freshly
//! configured battlefields by planning one route per team and submitting it
//! to the world.

use std::{cmp::Reverse, collections::BinaryHeap};

use log::debug;
use skirmish_core::{
    BattlefieldView, CellCoord, Command, Direction, Event, GridSize, ObstacleSet, Path, Team,
};

/// Computes a shortest path from `start` to `goal` avoiding blocked cells.
///
/// Returns the empty [`Path`] when the goal cannot be reached, and a single
/// waypoint when `start == goal`.
pub fn find_path<F>(grid: GridSize, start: CellCoord, goal: CellCoord, is_blocked: F) -> Path
where
    F: Fn(CellCoord) -> bool,
{
    SearchWorkspace::default().search(grid, start, goal, is_blocked)
}

/// Convenience wrapper around [`find_path`] treating `obstacles` as walls.
pub fn find_path_avoiding(
    grid: GridSize,
    start: CellCoord,
    goal: CellCoord,
    obstacles: &ObstacleSet,
) -> Path {
    find_path(grid, start, goal, |cell| obstacles.contains(cell))
}

/// Reusable buffers for A* searches over a dense grid.
///
/// Scores, predecessors and set membership live in vectors indexed by the
/// row-major cell index, so no per-node allocation happens during a search.
#[derive(Debug, Default)]
pub struct SearchWorkspace {
    g_score: Vec<u32>,
    f_score: Vec<u32>,
    came_from: Vec<Option<usize>>,
    closed: Vec<bool>,
    discovered: Vec<Option<u64>>,
    open: BinaryHeap<Reverse<(u32, u64, usize)>>,
    next_sequence: u64,
    expanded: usize,
}

impl SearchWorkspace {
    /// Runs an A* search, reusing the workspace buffers.
    ///
    /// The open set pops the node with the lowest `f = g + h`; equal scores
    /// resolve in discovery order, and neighbours are discovered east, west,
    /// south, north.
    pub fn search<F>(
        &mut self,
        grid: GridSize,
        start: CellCoord,
        goal: CellCoord,
        is_blocked: F,
    ) -> Path
    where
        F: Fn(CellCoord) -> bool,
    {
        self.reset(grid.cell_count());

        let (Some(start_index), Some(goal_index)) = (grid.index_of(start), grid.index_of(goal))
        else {
            return Path::unreachable();
        };
        if is_blocked(start) || is_blocked(goal) {
            return Path::unreachable();
        }

        self.g_score[start_index] = 0;
        self.discover(start_index, start.manhattan_distance(goal));

        while let Some(Reverse((f_score, _, index))) = self.open.pop() {
            if self.closed[index] || self.f_score[index] != f_score {
                continue;
            }

            if index == goal_index {
                return self.reconstruct(grid, goal_index);
            }

            self.closed[index] = true;
            self.expanded += 1;

            let Some(current) = grid.cell_at(index) else {
                continue;
            };
            let tentative = self.g_score[index].saturating_add(1);

            for direction in Direction::PRIORITY {
                let Some(neighbor) = current.step(direction, grid) else {
                    continue;
                };
                if is_blocked(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = grid.index_of(neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] {
                    continue;
                }
                if self.discovered[neighbor_index].is_some()
                    && tentative >= self.g_score[neighbor_index]
                {
                    continue;
                }

                self.came_from[neighbor_index] = Some(index);
                self.g_score[neighbor_index] = tentative;
                self.discover(
                    neighbor_index,
                    tentative.saturating_add(neighbor.manhattan_distance(goal)),
                );
            }
        }

        Path::unreachable()
    }

    /// Number of nodes closed by the most recent search.
    #[must_use]
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    fn reset(&mut self, cell_count: usize) {
        self.g_score.clear();
        self.g_score.resize(cell_count, u32::MAX);
        self.f_score.clear();
        self.f_score.resize(cell_count, u32::MAX);
        self.came_from.clear();
        self.came_from.resize(cell_count, None);
        self.closed.clear();
        self.closed.resize(cell_count, false);
        self.discovered.clear();
        self.discovered.resize(cell_count, None);
        self.open.clear();
        self.next_sequence = 0;
        self.expanded = 0;
    }

    /// Records a (possibly improved) score for a node and queues it.
    ///
    /// A node keeps the sequence number of its first discovery, so improving
    /// its score never moves it behind nodes discovered later.
    fn discover(&mut self, index: usize, f_score: u32) {
        let sequence = match self.discovered[index] {
            Some(sequence) => sequence,
            None => {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                self.discovered[index] = Some(sequence);
                sequence
            }
        };
        self.f_score[index] = f_score;
        self.open.push(Reverse((f_score, sequence, index)));
    }

    fn reconstruct(&self, grid: GridSize, goal_index: usize) -> Path {
        let mut waypoints = Vec::new();
        let mut cursor = Some(goal_index);
        while let Some(index) = cursor {
            if let Some(cell) = grid.cell_at(index) {
                waypoints.push(cell);
            }
            cursor = self.came_from[index];
        }
        waypoints.reverse();
        Path::new(waypoints)
    }
}

/// Pure system that plans team routes whenever the battlefield changes.
#[derive(Debug, Default)]
pub struct Pathfinding {
    workspace: SearchWorkspace,
}

impl Pathfinding {
    /// Consumes world events and the battlefield view to emit route commands.
    ///
    /// Each team marches from its own headquarters to the opposing one. An
    /// unreachable target yields an empty route, which the world records as
    /// "no route".
    pub fn handle(
        &mut self,
        events: &[Event],
        battlefield: Option<BattlefieldView<'_>>,
        out: &mut Vec<Command>,
    ) {
        let configured = events
            .iter()
            .any(|event| matches!(event, Event::BattlefieldConfigured { .. }));
        if !configured {
            return;
        }
        let Some(battlefield) = battlefield else {
            return;
        };

        let obstacles = battlefield.obstacles();
        for team in Team::ALL {
            let start = battlefield.headquarters(team);
            let goal = battlefield.headquarters(team.opponent());
            let path = self
                .workspace
                .search(battlefield.grid(), start, goal, |cell| obstacles.contains(cell));
            debug!(
                "{team} route {start} -> {goal}: {} waypoints, {} nodes expanded",
                path.len(),
                self.workspace.expanded()
            );
            out.push(Command::AssignRoute { team, path });
        }
    }
}
