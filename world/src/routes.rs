//! Validation of routes handed to the world.

use skirmish_core::{CellCoord, GridSize, ObstacleSet, Path, RouteError};

/// Checks that a non-empty path is walkable between two headquarters.
///
/// Every waypoint must lie inside the grid and off the trees, consecutive
/// waypoints must share an edge, and the endpoints must match `origin` and
/// `destination`. The empty path is always accepted because it encodes the
/// absence of a route.
pub fn validate_route(
    path: &Path,
    grid: GridSize,
    obstacles: &ObstacleSet,
    origin: CellCoord,
    destination: CellCoord,
) -> Result<(), RouteError> {
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return Ok(());
    };

    if first != origin {
        return Err(RouteError::WrongOrigin {
            expected: origin,
            found: first,
        });
    }
    if last != destination {
        return Err(RouteError::WrongDestination {
            expected: destination,
            found: last,
        });
    }

    for &cell in path.waypoints() {
        if !grid.contains(cell) {
            return Err(RouteError::OutOfBounds { cell });
        }
        if obstacles.contains(cell) {
            return Err(RouteError::Blocked { cell });
        }
    }

    for pair in path.waypoints().windows(2) {
        if !pair[0].is_adjacent_to(pair[1]) {
            return Err(RouteError::Disjoint {
                from: pair[0],
                to: pair[1],
            });
        }
    }

    Ok(())
}
