//! Text and JSON summaries of a finished session.

use std::fmt::Write as _;

use serde::Serialize;
use skirmish_core::{CellCoord, GridSize, Health, Position, SoldierId, Team};
use skirmish_world::query;

use crate::{
    config::Scenario,
    session::{Session, TeamTally},
};

/// Live soldiers at one sampled instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Frame {
    pub(crate) elapsed_ms: u64,
    pub(crate) soldiers: Vec<SoldierFrame>,
}

/// One soldier inside a [`Frame`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct SoldierFrame {
    pub(crate) id: SoldierId,
    pub(crate) team: Team,
    pub(crate) position: Position,
    pub(crate) health: Health,
}

/// Layout, routes and outcome for a single team.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct TeamReport {
    team: Team,
    headquarters: CellCoord,
    barracks: Option<CellCoord>,
    route: Vec<CellCoord>,
    tally: TeamTally,
}

/// Everything the CLI prints after a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Report {
    grid: GridSize,
    seed: u64,
    elapsed_ms: u64,
    trees: Vec<CellCoord>,
    teams: Vec<TeamReport>,
    timeline: Vec<Frame>,
}

impl Report {
    /// Collects the battlefield layout and counters from a session.
    pub(crate) fn capture(scenario: &Scenario, session: &Session, timeline: Vec<Frame>) -> Self {
        let world = session.world();
        let trees = query::obstacles(world)
            .map(|trees| {
                let mut cells: Vec<_> = trees.iter().collect();
                cells.sort_by_key(|cell| (cell.row(), cell.column()));
                cells
            })
            .unwrap_or_default();

        let teams = Team::ALL
            .into_iter()
            .map(|team| TeamReport {
                team,
                headquarters: scenario.headquarters(team),
                barracks: query::barracks(world, team),
                route: query::route(world, team)
                    .map(|path| path.waypoints().to_vec())
                    .unwrap_or_default(),
                tally: session.tally(team),
            })
            .collect();

        Self {
            grid: scenario.grid,
            seed: scenario.seed,
            elapsed_ms: u64::try_from(session.elapsed().as_millis()).unwrap_or(u64::MAX),
            trees,
            teams,
            timeline,
        }
    }

    /// Pretty-printed JSON document.
    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// ASCII rendering of the battlefield, one line per row.
    ///
    /// Headquarters are drawn as `R`/`B`, barracks as `r`/`b`, trees as `T`
    /// and route cells as `*` (red), `o` (blue) or `#` (shared).
    pub(crate) fn render_map(&self) -> String {
        let columns = self.grid.columns() as usize;
        let mut glyphs = vec!['.'; self.grid.cell_count()];
        let mut paint = |cell: CellCoord, glyph: char| {
            if let Some(index) = self.grid.index_of(cell) {
                glyphs[index] = glyph;
            }
        };

        for team in &self.teams {
            let own = match team.team {
                Team::Red => '*',
                Team::Blue => 'o',
            };
            for &cell in &team.route {
                let shared = self
                    .teams
                    .iter()
                    .any(|other| other.team != team.team && other.route.contains(&cell));
                paint(cell, if shared { '#' } else { own });
            }
        }
        for &cell in &self.trees {
            paint(cell, 'T');
        }
        for team in &self.teams {
            let (headquarters, barracks) = match team.team {
                Team::Red => ('R', 'r'),
                Team::Blue => ('B', 'b'),
            };
            if let Some(cell) = team.barracks {
                paint(cell, barracks);
            }
            paint(team.headquarters, headquarters);
        }

        let mut map = String::with_capacity(glyphs.len() + self.grid.rows() as usize);
        if columns > 0 {
            for row in glyphs.chunks(columns) {
                map.extend(row);
                map.push('\n');
            }
        }
        map
    }

    /// Human readable summary: map, per-team outcome and the timeline.
    pub(crate) fn render_text(&self) -> String {
        let mut text = format!(
            "battlefield {}x{} seed {:#x}, {} trees\n\n",
            self.grid.columns(),
            self.grid.rows(),
            self.seed,
            self.trees.len()
        );
        text.push_str(&self.render_map());
        text.push('\n');

        for team in &self.teams {
            let route = if team.route.is_empty() {
                "no route".to_owned()
            } else {
                format!("route of {} hops", team.route.len() - 1)
            };
            let barracks = team
                .barracks
                .map_or_else(|| "none".to_owned(), |cell| cell.to_string());
            let _ = writeln!(
                text,
                "{:<4} hq {} barracks {} {}: spawned {}, arrived {}, defeated {}",
                team.team,
                team.headquarters,
                barracks,
                route,
                team.tally.spawned,
                team.tally.arrived,
                team.tally.defeated
            );
        }

        let _ = writeln!(text, "\ntimeline ({:.1}s)", self.elapsed_ms as f64 / 1_000.0);
        for frame in &self.timeline {
            let _ = write!(text, "{:>7.1}s", frame.elapsed_ms as f64 / 1_000.0);
            if frame.soldiers.is_empty() {
                text.push_str("  -");
            }
            for soldier in &frame.soldiers {
                let _ = write!(
                    text,
                    "  {}#{} ({:.1}, {:.1})",
                    soldier.team,
                    soldier.id.get(),
                    soldier.position.x(),
                    soldier.position.y()
                );
            }
            text.push('\n');
        }
        text
    }
}
