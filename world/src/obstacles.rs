//! Random tree placement for freshly configured battlefields.

use rand::Rng;
use skirmish_core::{CellCoord, GenerationError, GridSize, ObstacleSet};

/// Samples drawn per grid cell before the generator gives up.
const ATTEMPTS_PER_CELL: u64 = 64;
/// Minimum sampling budget, so tiny grids still get a fair number of draws.
const MIN_ATTEMPTS: u64 = 1_024;

/// Scatters `count` obstacles uniformly across the grid.
///
/// Samples are drawn until exactly `count` distinct cells have been accepted.
/// Cells listed in `reserved` and cells that already hold an obstacle are
/// rejected. Requests that cannot fit are refused up front, and a generous
/// sampling budget bounds the run time for requests close to capacity.
pub fn generate_obstacles<R>(
    count: u32,
    grid: GridSize,
    reserved: &[CellCoord],
    rng: &mut R,
) -> Result<ObstacleSet, GenerationError>
where
    R: Rng + ?Sized,
{
    let cells = u64::try_from(grid.cell_count()).unwrap_or(u64::MAX);
    let budget = cells.saturating_mul(ATTEMPTS_PER_CELL).max(MIN_ATTEMPTS);
    generate_obstacles_with_budget(count, grid, reserved, rng, budget)
}

/// Variant of [`generate_obstacles`] with an explicit sampling budget.
pub fn generate_obstacles_with_budget<R>(
    count: u32,
    grid: GridSize,
    reserved: &[CellCoord],
    rng: &mut R,
    max_attempts: u64,
) -> Result<ObstacleSet, GenerationError>
where
    R: Rng + ?Sized,
{
    if grid.is_empty() {
        return Err(GenerationError::InvalidGrid {
            columns: grid.columns(),
            rows: grid.rows(),
        });
    }

    if let Some(&cell) = reserved.iter().find(|cell| !grid.contains(**cell)) {
        return Err(GenerationError::ReservedOutOfBounds { cell });
    }

    let reserved_mask = ObstacleSet::from_cells(grid, reserved.iter().copied());
    let capacity = grid.cell_count().saturating_sub(reserved_mask.len());
    let capacity = u32::try_from(capacity).unwrap_or(u32::MAX);
    if count > capacity {
        return Err(GenerationError::Unsatisfiable {
            requested: count,
            capacity,
        });
    }

    let mut obstacles = ObstacleSet::empty(grid);
    let mut attempts: u64 = 0;
    while obstacles.len() < count as usize {
        if attempts >= max_attempts {
            return Err(GenerationError::AttemptsExhausted {
                placed: u32::try_from(obstacles.len()).unwrap_or(u32::MAX),
                requested: count,
                attempts,
            });
        }
        attempts += 1;

        let candidate = CellCoord::new(
            rng.gen_range(0..grid.columns()),
            rng.gen_range(0..grid.rows()),
        );
        if reserved_mask.contains(candidate) {
            continue;
        }
        let _ = obstacles.insert(candidate);
    }

    Ok(obstacles)
}
