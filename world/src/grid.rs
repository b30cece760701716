//! Square occupancy grid with a central base and fixed edge spawn points.

use glam::Vec2;
use grid_defence_core::{CellCoord, CellState, Direction};

use crate::config::{DEFAULT_CELL_SIZE, MAX_GRID_SIZE, MIN_GRID_SIZE};

/// Distance between neighbouring spawn points along an edge.
pub const SPAWN_SPACING: u32 = 4;

/// Adjacent cell reported by [`Grid::neighbors`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbor {
    /// Coordinate of the adjacent cell.
    pub cell: CellCoord,
    /// Direction of the step leading to the adjacent cell.
    pub direction: Direction,
}

/// Authoritative cell occupancy for the map.
///
/// The base sits at the centre and is the only [`CellState::Base`] cell for
/// the lifetime of the grid. Spawn points are derived once from the size.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    size: u32,
    cell_size: f32,
    cells: Vec<CellState>,
    base: CellCoord,
    spawn_points: Vec<CellCoord>,
}

impl Grid {
    /// Creates an empty grid using the default cell size.
    ///
    /// Sizes outside `MIN_GRID_SIZE..=MAX_GRID_SIZE` are clamped into that range.
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self::with_cell_size(size, DEFAULT_CELL_SIZE)
    }

    /// Creates an empty grid whose cells span `cell_size` screen units.
    ///
    /// The size is clamped like [`Grid::new`]. A cell size that is not
    /// positive and finite falls back to `DEFAULT_CELL_SIZE`.
    #[must_use]
    pub fn with_cell_size(size: u32, cell_size: f32) -> Self {
        let size = size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        let width = size as usize;
        let cell_count = width * width;
        let base = CellCoord::new(size / 2, size / 2);

        let mut grid = Self {
            size,
            cell_size,
            cells: vec![CellState::Empty; cell_count],
            base,
            spawn_points: generate_spawn_points(size),
        };
        if let Some(index) = grid.index(base) {
            grid.cells[index] = CellState::Base;
        }
        grid
    }

    /// Number of cells along each edge.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Side length of a cell in screen units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell enemies are trying to reach.
    #[must_use]
    pub const fn base(&self) -> CellCoord {
        self.base
    }

    /// Edge cells where enemies enter, ordered top, bottom, left, right.
    #[must_use]
    pub fn spawn_points(&self) -> &[CellCoord] {
        &self.spawn_points
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn is_valid(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    /// State of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Overwrites the state of a cell.
    ///
    /// Returns `false` without touching the grid when the cell is out of
    /// bounds, when the write targets the base, or when it would introduce a
    /// second base.
    pub fn set_state(&mut self, cell: CellCoord, state: CellState) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };

        if cell == self.base || state == CellState::Base {
            return false;
        }

        self.cells[index] = state;
        true
    }

    /// Reports whether ground units may stand on the cell.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        matches!(
            self.state(cell),
            Some(CellState::Empty) | Some(CellState::Base)
        )
    }

    /// In-bounds neighbours in up, right, down, left order.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = Neighbor> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            let neighbor = cell.step(direction)?;
            self.is_valid(neighbor).then_some(Neighbor {
                cell: neighbor,
                direction,
            })
        })
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.size)
            .flat_map(move |row| (0..self.size).map(move |column| CellCoord::new(column, row)))
    }

    /// Number of cells stored in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Screen position of the centre of a cell.
    #[must_use]
    pub fn grid_to_screen(&self, cell: CellCoord) -> Vec2 {
        let half = self.cell_size / 2.0;
        Vec2::new(
            cell.column() as f32 * self.cell_size + half,
            cell.row() as f32 * self.cell_size + half,
        )
    }

    /// Cell containing the screen position.
    ///
    /// The result is not bounds checked; `None` is returned only for negative
    /// or non-finite input.
    #[must_use]
    pub fn screen_to_grid(&self, position: Vec2) -> Option<CellCoord> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / self.cell_size).floor();
        let row = (position.y / self.cell_size).floor();
        Some(CellCoord::new(column as u32, row as u32))
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.is_valid(cell) {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

fn generate_spawn_points(size: u32) -> Vec<CellCoord> {
    let spacing = SPAWN_SPACING as usize;
    let last = size - 1;
    let mut points = Vec::new();

    for column in (0..size).step_by(spacing) {
        points.push(CellCoord::new(column, 0));
    }

    for column in (0..size).step_by(spacing) {
        points.push(CellCoord::new(column, last));
    }

    let side_end = size.saturating_sub(SPAWN_SPACING);
    for row in (SPAWN_SPACING..side_end).step_by(spacing) {
        points.push(CellCoord::new(0, row));
    }

    for row in (SPAWN_SPACING..side_end).step_by(spacing) {
        points.push(CellCoord::new(last, row));
    }

    points
}
