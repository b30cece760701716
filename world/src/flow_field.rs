//! Breadth-first flow fields that steer enemies toward the base.

use std::collections::VecDeque;

use grid_defence_core::{CellCoord, Direction, Distance, Traversal};

use crate::grid::Grid;

/// Dense distance and direction field seeded from the base.
///
/// Both variants run the same search and differ only in which cells the
/// search may enter: ground fields respect occupancy while flying fields are
/// limited by the grid bounds alone. A field is computed once from a grid
/// snapshot and never patched; callers build a fresh field after every grid
/// mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    traversal: Traversal,
    size: u32,
    base: CellCoord,
    distances: Vec<Distance>,
    directions: Vec<Option<Direction>>,
}

impl FlowField {
    /// Builds the field followed by ground units.
    #[must_use]
    pub fn ground(grid: &Grid) -> Self {
        Self::build(grid, Traversal::Ground)
    }

    /// Builds the field followed by flying units.
    #[must_use]
    pub fn flying(grid: &Grid) -> Self {
        Self::build(grid, Traversal::Flying)
    }

    /// Builds the field matching the provided traversal.
    #[must_use]
    pub fn build(grid: &Grid, traversal: Traversal) -> Self {
        match traversal {
            Traversal::Ground => Self::build_with(grid, traversal, |cell| grid.is_walkable(cell)),
            Traversal::Flying => Self::build_with(grid, traversal, |cell| grid.is_valid(cell)),
        }
    }

    fn build_with<F>(grid: &Grid, traversal: Traversal, is_passable: F) -> Self
    where
        F: Fn(CellCoord) -> bool,
    {
        let cell_count = grid.cell_count();
        let base = grid.base();
        let mut distances = vec![Distance::UNREACHABLE; cell_count];
        let mut queue = VecDeque::new();

        if let Some(index) = grid.index(base) {
            distances[index] = Distance::ZERO;
            queue.push_back(base);
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = grid.index(cell) else {
                continue;
            };
            let next_distance = distances[current_index].successor();

            for neighbor in grid.neighbors(cell) {
                if !is_passable(neighbor.cell) {
                    continue;
                }

                let Some(neighbor_index) = grid.index(neighbor.cell) else {
                    continue;
                };

                if distances[neighbor_index] <= next_distance {
                    continue;
                }

                distances[neighbor_index] = next_distance;
                queue.push_back(neighbor.cell);
            }
        }

        let mut directions = vec![None; cell_count];
        for cell in grid.cells() {
            if cell == base || !is_passable(cell) {
                continue;
            }

            let Some(index) = grid.index(cell) else {
                continue;
            };

            let mut best: Option<(Distance, Direction)> = None;
            for neighbor in grid.neighbors(cell) {
                let Some(neighbor_index) = grid.index(neighbor.cell) else {
                    continue;
                };
                let distance = distances[neighbor_index];
                let best_distance = best.map_or(Distance::UNREACHABLE, |(value, _)| value);
                if distance < best_distance {
                    best = Some((distance, neighbor.direction));
                }
            }

            directions[index] = best.map(|(_, direction)| direction);
        }

        Self {
            traversal,
            size: grid.size(),
            base,
            distances,
            directions,
        }
    }

    /// Traversal the field was computed for.
    #[must_use]
    pub const fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Number of cells along each edge of the underlying grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Cell the field converges on.
    #[must_use]
    pub const fn base(&self) -> CellCoord {
        self.base
    }

    /// Step to take from the cell, or `None` on the base, outside the grid, or
    /// when no path exists.
    #[must_use]
    pub fn direction(&self, cell: CellCoord) -> Option<Direction> {
        self.index(cell)
            .and_then(|index| self.directions.get(index).copied().flatten())
    }

    /// Hop count from the cell to the base.
    ///
    /// Cells outside the grid report [`Distance::UNREACHABLE`].
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Distance {
        self.index(cell)
            .and_then(|index| self.distances.get(index).copied())
            .unwrap_or(Distance::UNREACHABLE)
    }

    /// Reports whether the base can be reached from the cell.
    #[must_use]
    pub fn is_reachable(&self, cell: CellCoord) -> bool {
        self.distance(cell).is_reachable()
    }

    /// Dense distances stored in row-major order.
    #[must_use]
    pub fn distances(&self) -> &[Distance] {
        &self.distances
    }

    /// Cells visited when following the field from `start`, ending on the base.
    ///
    /// Returns `None` when the walk leaves the grid or stalls before arriving.
    #[must_use]
    pub fn path_from(&self, start: CellCoord) -> Option<Vec<CellCoord>> {
        let mut path = vec![start];
        let mut cell = start;

        while cell != self.base {
            if path.len() > self.distances.len() {
                return None;
            }

            cell = cell.step(self.direction(cell)?)?;
            path.push(cell);
        }

        Some(path)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.size || cell.row() >= self.size {
            return None;
        }

        let width = usize::try_from(self.size).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Borrowed pair of flow fields together with the grid they describe.
#[derive(Clone, Copy, Debug)]
pub struct NavigationView<'a> {
    grid: &'a Grid,
    ground: &'a FlowField,
    flying: &'a FlowField,
}

impl<'a> NavigationView<'a> {
    /// Captures a view over a grid and the fields computed from it.
    #[must_use]
    pub fn new(grid: &'a Grid, ground: &'a FlowField, flying: &'a FlowField) -> Self {
        Self {
            grid,
            ground,
            flying,
        }
    }

    /// Grid the fields were computed from.
    #[must_use]
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Field that units with the provided traversal follow.
    #[must_use]
    pub fn field(&self, traversal: Traversal) -> &'a FlowField {
        match traversal {
            Traversal::Ground => self.ground,
            Traversal::Flying => self.flying,
        }
    }
}

/// Reports whether a ground unit standing on `cell` can reach the base.
#[must_use]
pub fn is_path_available(grid: &Grid, cell: CellCoord) -> bool {
    FlowField::ground(grid).is_reachable(cell)
}

/// Reports whether ground units can reach the base from every spawn point.
#[must_use]
pub fn are_all_spawns_reachable(grid: &Grid) -> bool {
    spawns_reachable(grid, &FlowField::ground(grid))
}

pub(crate) fn spawns_reachable(grid: &Grid, field: &FlowField) -> bool {
    grid.spawn_points()
        .iter()
        .all(|&spawn| field.is_reachable(spawn))
}
