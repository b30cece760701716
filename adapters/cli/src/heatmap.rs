use std::fmt::Write as _;

use grid_defence_core::CellState;
use grid_defence_world::{FlowField, Grid};

const CELL_WIDTH: usize = 3;

/// Renders the distances of a flow field as a fixed-width text grid.
///
/// Occupied cells print `#`, the base prints `B` and cells without a path
/// print `·`. Every other cell prints its hop count to the base.
pub(crate) fn render(grid: &Grid, field: &FlowField) -> String {
    let size = grid.size() as usize;
    let mut output = String::with_capacity((size * CELL_WIDTH + 1) * size);

    for (index, (cell, distance)) in grid.cells().zip(field.distances()).enumerate() {
        let symbol = if cell == field.base() {
            "B".to_owned()
        } else if grid.state(cell) == Some(CellState::Occupied) {
            "#".to_owned()
        } else {
            distance
                .get()
                .map_or_else(|| "·".to_owned(), |steps| steps.to_string())
        };
        let _ = write!(output, "{symbol:>CELL_WIDTH$}");
        if (index + 1) % size == 0 {
            output.push('\n');
        }
    }

    output
}
