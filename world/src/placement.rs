//! Structure placement next to reserved cells.

use skirmish_core::{CellCoord, Direction, GridSize};

/// First in-bounds neighbour of `origin` that `is_occupied` reports as free.
///
/// Neighbours are checked east, west, south, north; the first free one wins
/// even when several qualify.
pub fn find_free_adjacent_cell<F>(
    origin: CellCoord,
    grid: GridSize,
    mut is_occupied: F,
) -> Option<CellCoord>
where
    F: FnMut(CellCoord) -> bool,
{
    Direction::PRIORITY
        .into_iter()
        .filter_map(|direction| origin.step(direction, grid))
        .find(|cell| !is_occupied(*cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_east_when_everything_is_free() {
        let grid = GridSize::new(5, 5);
        let cell = find_free_adjacent_cell(CellCoord::new(2, 2), grid, |_| false);
        assert_eq!(cell, Some(CellCoord::new(3, 2)));
    }

    #[test]
    fn falls_through_priority_order() {
        let grid = GridSize::new(5, 5);
        let origin = CellCoord::new(2, 2);
        let east = CellCoord::new(3, 2);
        let west = CellCoord::new(1, 2);

        let cell = find_free_adjacent_cell(origin, grid, |cell| cell == east);
        assert_eq!(cell, Some(west));

        let cell = find_free_adjacent_cell(origin, grid, |cell| cell == east || cell == west);
        assert_eq!(cell, Some(CellCoord::new(2, 3)));

        let cell = find_free_adjacent_cell(origin, grid, |cell| cell.row() >= 2);
        assert_eq!(cell, Some(CellCoord::new(2, 1)));
    }

    #[test]
    fn skips_neighbours_outside_grid() {
        let grid = GridSize::new(3, 3);
        let cell = find_free_adjacent_cell(CellCoord::new(2, 2), grid, |_| false);
        assert_eq!(cell, Some(CellCoord::new(1, 2)));
    }

    #[test]
    fn reports_absence_when_enclosed() {
        let grid = GridSize::new(3, 3);
        let origin = CellCoord::new(1, 1);
        assert_eq!(
            find_free_adjacent_cell(origin, grid, |cell| cell != origin),
            None
        );
        assert_eq!(
            find_free_adjacent_cell(CellCoord::new(0, 0), GridSize::new(1, 1), |_| false),
            None
        );
    }
}
