//! Tunable parameters used to construct a world.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of the square grid used when no configuration is supplied.
pub const DEFAULT_GRID_SIZE: u32 = 20;
/// Side length of a single cell in screen units used when no configuration is supplied.
pub const DEFAULT_CELL_SIZE: f32 = 40.0;
/// Smallest grid that keeps the base and every spawn point on distinct cells.
pub const MIN_GRID_SIZE: u32 = 2;
/// Largest grid a world can be built on.
pub const MAX_GRID_SIZE: u32 = 1024;

/// World configuration loaded by adapters.
///
/// Missing fields fall back to their defaults so partial configuration files
/// remain valid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    grid_size: u32,
    cell_size: f32,
}

impl Config {
    /// Creates a configuration with explicit values.
    #[must_use]
    pub const fn new(grid_size: u32, cell_size: f32) -> Self {
        Self {
            grid_size,
            cell_size,
        }
    }

    /// Side length of the square grid in cells.
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Side length of a single cell in screen units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Returns a copy with the provided grid size.
    #[must_use]
    pub const fn with_grid_size(self, grid_size: u32) -> Self {
        Self { grid_size, ..self }
    }

    /// Returns a copy with the provided cell size.
    #[must_use]
    pub const fn with_cell_size(self, cell_size: f32) -> Self {
        Self { cell_size, ..self }
    }

    /// Checks that the configuration describes a usable grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall {
                grid_size: self.grid_size,
            });
        }

        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                grid_size: self.grid_size,
            });
        }

        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize {
                cell_size: self.cell_size,
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, DEFAULT_CELL_SIZE)
    }
}

/// Reasons a configuration is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid cannot hold a base and distinct spawn points.
    #[error("grid size {grid_size} is below the minimum of {MIN_GRID_SIZE}")]
    GridTooSmall {
        /// Rejected grid size.
        grid_size: u32,
    },
    /// The grid exceeds the supported side length.
    #[error("grid size {grid_size} is above the maximum of {MAX_GRID_SIZE}")]
    GridTooLarge {
        /// Rejected grid size.
        grid_size: u32,
    },
    /// Cell size must be a positive, finite number of screen units.
    #[error("cell size {cell_size} must be positive and finite")]
    InvalidCellSize {
        /// Rejected cell size.
        cell_size: f32,
    },
}
