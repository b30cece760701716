//! Placement gate that keeps every spawn point and enemy connected to the base.

use grid_defence_core::{
    ActiveEnemy, CellCoord, CellState, PlacementError, PlacementFeedback, Traversal,
};

use crate::{
    flow_field::{spawns_reachable, FlowField},
    grid::Grid,
};

/// Read-only validator for prospective tower placements.
///
/// Validation never mutates the borrowed grid. Each check runs against a
/// private clone with the candidate cell occupied, so the validator can be
/// queried every frame for placement previews.
#[derive(Clone, Copy, Debug)]
pub struct BuildValidator<'grid> {
    grid: &'grid Grid,
}

impl<'grid> BuildValidator<'grid> {
    /// Creates a validator over the live grid.
    #[must_use]
    pub const fn new(grid: &'grid Grid) -> Self {
        Self { grid }
    }

    /// Decides whether a tower may occupy `cell`.
    ///
    /// Checks run in order and stop at the first failure: bounds, emptiness,
    /// spawn connectivity, then connectivity of every active enemy. Enemies
    /// are tested against the hypothetical field matching their traversal; an
    /// enemy whose position maps outside the grid counts as trapped.
    pub fn can_place_tower(
        &self,
        cell: CellCoord,
        active_enemies: &[ActiveEnemy],
    ) -> Result<(), PlacementError> {
        if !self.grid.is_valid(cell) {
            return Err(PlacementError::OutOfBounds);
        }

        if self.grid.state(cell) != Some(CellState::Empty) {
            return Err(PlacementError::Occupied);
        }

        let mut hypothetical = self.grid.clone();
        // In bounds, empty and not the base, so the write always lands.
        let _ = hypothetical.set_state(cell, CellState::Occupied);

        let ground = FlowField::ground(&hypothetical);
        if !spawns_reachable(&hypothetical, &ground) {
            return Err(PlacementError::WouldBlockPath);
        }

        let mut flying: Option<FlowField> = None;
        for enemy in active_enemies {
            let Some(enemy_cell) = hypothetical.screen_to_grid(enemy.position) else {
                return Err(PlacementError::WouldTrapEnemy);
            };

            let field: &FlowField = match enemy.traversal {
                Traversal::Ground => &ground,
                Traversal::Flying => {
                    flying.get_or_insert_with(|| FlowField::flying(&hypothetical))
                }
            };

            if !field.is_reachable(enemy_cell) {
                return Err(PlacementError::WouldTrapEnemy);
            }
        }

        Ok(())
    }

    /// Classifies a prospective placement for preview purposes.
    #[must_use]
    pub fn placement_feedback(
        &self,
        cell: CellCoord,
        active_enemies: &[ActiveEnemy],
    ) -> PlacementFeedback {
        match self.grid.state(cell) {
            None => PlacementFeedback::Invalid,
            Some(CellState::Occupied) | Some(CellState::Base) => PlacementFeedback::Occupied,
            Some(CellState::Empty) => match self.can_place_tower(cell, active_enemies) {
                Ok(()) => PlacementFeedback::Valid,
                Err(_) => PlacementFeedback::Invalid,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn ground_enemy_at(grid: &Grid, cell: CellCoord) -> ActiveEnemy {
        ActiveEnemy {
            position: grid.grid_to_screen(cell),
            traversal: Traversal::Ground,
        }
    }

    fn flying_enemy_at(grid: &Grid, cell: CellCoord) -> ActiveEnemy {
        ActiveEnemy {
            position: grid.grid_to_screen(cell),
            traversal: Traversal::Flying,
        }
    }

    #[test]
    fn open_cell_is_accepted() {
        let grid = Grid::new(20);
        let validator = BuildValidator::new(&grid);
        assert_eq!(validator.can_place_tower(CellCoord::new(5, 5), &[]), Ok(()));
    }

    #[test]
    fn out_of_bounds_is_rejected_first() {
        let grid = Grid::new(20);
        let validator = BuildValidator::new(&grid);
        assert_eq!(
            validator.can_place_tower(CellCoord::new(20, 3), &[]),
            Err(PlacementError::OutOfBounds)
        );
    }

    #[test]
    fn occupied_cells_and_base_are_rejected() {
        let mut grid = Grid::new(20);
        assert!(grid.set_state(CellCoord::new(2, 2), CellState::Occupied));
        let validator = BuildValidator::new(&grid);

        assert_eq!(
            validator.can_place_tower(CellCoord::new(2, 2), &[]),
            Err(PlacementError::Occupied)
        );
        assert_eq!(
            validator.can_place_tower(grid.base(), &[]),
            Err(PlacementError::Occupied)
        );
    }

    #[test]
    fn sealing_the_last_base_entrance_blocks_path() {
        let mut grid = Grid::new(20);
        for cell in [(10, 9), (11, 10), (10, 11)] {
            assert!(grid.set_state(CellCoord::new(cell.0, cell.1), CellState::Occupied));
        }
        let validator = BuildValidator::new(&grid);

        assert_eq!(
            validator.can_place_tower(CellCoord::new(9, 10), &[]),
            Err(PlacementError::WouldBlockPath)
        );
    }

    #[test]
    fn enclosing_a_single_spawn_blocks_path() {
        let mut grid = Grid::new(20);
        // Spawn (0, 0) keeps only its southern exit open.
        assert!(grid.set_state(CellCoord::new(1, 0), CellState::Occupied));
        let validator = BuildValidator::new(&grid);

        assert_eq!(
            validator.can_place_tower(CellCoord::new(0, 1), &[]),
            Err(PlacementError::WouldBlockPath)
        );
    }

    #[test]
    fn ground_enemy_standing_on_cell_is_trapped() {
        let grid = Grid::new(20);
        let validator = BuildValidator::new(&grid);
        let cell = CellCoord::new(5, 5);

        assert_eq!(
            validator.can_place_tower(cell, &[ground_enemy_at(&grid, cell)]),
            Err(PlacementError::WouldTrapEnemy)
        );
    }

    #[test]
    fn ground_enemy_in_closing_pocket_is_trapped() {
        let mut grid = Grid::new(20);
        // Pocket at (5, 5) whose only exit is (5, 6).
        for cell in [(5, 4), (6, 5), (4, 5)] {
            assert!(grid.set_state(CellCoord::new(cell.0, cell.1), CellState::Occupied));
        }
        let validator = BuildValidator::new(&grid);
        let enemy = ground_enemy_at(&grid, CellCoord::new(5, 5));

        assert_eq!(
            validator.can_place_tower(CellCoord::new(5, 6), &[enemy]),
            Err(PlacementError::WouldTrapEnemy)
        );
        assert_eq!(validator.can_place_tower(CellCoord::new(5, 6), &[]), Ok(()));
    }

    #[test]
    fn flying_enemies_are_tested_against_the_flying_field() {
        let grid = Grid::new(20);
        let validator = BuildValidator::new(&grid);
        let cell = CellCoord::new(5, 5);

        assert_eq!(
            validator.can_place_tower(cell, &[flying_enemy_at(&grid, cell)]),
            Ok(())
        );
    }

    #[test]
    fn enemy_outside_the_grid_counts_as_trapped() {
        let grid = Grid::new(20);
        let validator = BuildValidator::new(&grid);
        let stray = ActiveEnemy {
            position: Vec2::new(-10.0, 5.0),
            traversal: Traversal::Flying,
        };

        assert_eq!(
            validator.can_place_tower(CellCoord::new(5, 5), &[stray]),
            Err(PlacementError::WouldTrapEnemy)
        );
    }

    #[test]
    fn validation_leaves_the_live_grid_untouched() {
        let grid = Grid::new(20);
        let before = grid.clone();
        let validator = BuildValidator::new(&grid);
        let enemies = [ground_enemy_at(&grid, CellCoord::new(0, 0))];

        let first = validator.can_place_tower(CellCoord::new(7, 3), &enemies);
        let second = validator.can_place_tower(CellCoord::new(7, 3), &enemies);

        assert_eq!(first, second);
        assert_eq!(grid, before);
    }

    #[test]
    fn feedback_distinguishes_occupied_from_invalid() {
        let mut grid = Grid::new(20);
        for cell in [(10, 9), (11, 10), (10, 11), (3, 3)] {
            assert!(grid.set_state(CellCoord::new(cell.0, cell.1), CellState::Occupied));
        }
        let validator = BuildValidator::new(&grid);

        assert_eq!(
            validator.placement_feedback(CellCoord::new(20, 20), &[]),
            PlacementFeedback::Invalid
        );
        assert_eq!(
            validator.placement_feedback(CellCoord::new(3, 3), &[]),
            PlacementFeedback::Occupied
        );
        assert_eq!(
            validator.placement_feedback(grid.base(), &[]),
            PlacementFeedback::Occupied
        );
        assert_eq!(
            validator.placement_feedback(CellCoord::new(9, 10), &[]),
            PlacementFeedback::Invalid
        );
        assert_eq!(
            validator.placement_feedback(CellCoord::new(0, 10), &[]),
            PlacementFeedback::Valid
        );
    }
}
