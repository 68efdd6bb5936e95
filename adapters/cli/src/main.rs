#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Skirmish scenario.

mod config;
mod report;
mod session;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::info;
use skirmish_core::CellCoord;

use crate::{config::ScenarioConfig, report::Report, session::Session};

/// Headless grid skirmish simulator.
#[derive(Parser, Debug)]
#[command(name = "skirmish", version, about = "Headless grid skirmish simulator")]
struct Args {
    /// TOML scenario file; flags override its values.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,

    /// Number of grid columns.
    #[arg(long)]
    columns: Option<u32>,

    /// Number of grid rows.
    #[arg(long)]
    rows: Option<u32>,

    /// Number of trees scattered over the grid.
    #[arg(long)]
    trees: Option<u32>,

    /// Seed for the tree layout; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Red headquarters as `column,row`.
    #[arg(long, value_name = "COLUMN,ROW", value_parser = parse_cell)]
    red_hq: Option<CellCoord>,

    /// Blue headquarters as `column,row`.
    #[arg(long, value_name = "COLUMN,ROW", value_parser = parse_cell)]
    blue_hq: Option<CellCoord>,

    /// Milliseconds between spawn waves.
    #[arg(long)]
    spawn_interval_ms: Option<u64>,

    /// Health of freshly spawned soldiers.
    #[arg(long)]
    health: Option<u32>,

    /// Milliseconds between movement ticks.
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Route progress gained per movement tick.
    #[arg(long)]
    progress_per_tick: Option<f32>,

    /// Simulated time to run, in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    duration_ms: u64,

    /// Interval between timeline samples, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    sample_ms: u64,

    /// Print the report as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply_overrides(&self, config: &mut ScenarioConfig) {
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(trees) = self.trees {
            config.trees = trees;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.red_hq.is_some() {
            config.red_headquarters = self.red_hq;
        }
        if self.blue_hq.is_some() {
            config.blue_headquarters = self.blue_hq;
        }
        if let Some(interval) = self.spawn_interval_ms {
            config.spawn_interval_ms = interval;
        }
        if let Some(health) = self.health {
            config.soldier_health = health;
        }
        if let Some(interval) = self.tick_interval_ms {
            config.tick_interval_ms = interval;
        }
        if let Some(progress) = self.progress_per_tick {
            config.progress_per_tick = progress;
        }
    }
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW, got {value:?}"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|error| format!("invalid column {column:?}: {error}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|error| format!("invalid row {row:?}: {error}"))?;
    Ok(CellCoord::new(column, row))
}

fn init_logging(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.scenario {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario {}", path.display()))?;
            ScenarioConfig::from_toml_str(&contents)
                .with_context(|| format!("failed to load scenario {}", path.display()))?
        }
        None => ScenarioConfig::default(),
    };
    args.apply_overrides(&mut config);

    let scenario = config
        .validate(rand::random())
        .context("invalid scenario")?;
    info!(
        "running {}x{} scenario with seed {:#x}",
        scenario.grid.columns(),
        scenario.grid.rows(),
        scenario.seed
    );

    let mut session = Session::start(&scenario).context("failed to generate battlefield")?;
    let timeline = session.run(
        Duration::from_millis(args.duration_ms),
        Duration::from_millis(args.sample_ms),
    );
    let report = Report::capture(&scenario, &session, timeline);

    if args.json {
        println!("{}", report.to_json().context("failed to encode report")?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
