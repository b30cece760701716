#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a tower on a single cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower should occupy.
        cell: CellCoord,
    },
    /// Requests removal of an existing tower from the world.
    RemoveTower {
        /// Identifier of the tower targeted for removal.
        tower: TowerId,
    },
    /// Requests that a new enemy enter the grid at a spawn point.
    SpawnEnemy {
        /// Spawn point the enemy enters from.
        spawn: CellCoord,
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Requests that an enemy be relocated to a new continuous position.
    MoveEnemy {
        /// Identifier of the enemy being moved.
        enemy: EnemyId,
        /// Destination expressed in screen units.
        position: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// Confirms that a tower was removed from the world.
    TowerRemoved {
        /// Identifier of the tower that was removed.
        tower: TowerId,
        /// Cell previously occupied by the tower.
        cell: CellCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a tower removal request was rejected.
    TowerRemovalRejected {
        /// Identifier of the tower targeted for removal.
        tower: TowerId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Announces that both flow fields were recomputed after a grid mutation.
    NavigationRebuilt,
    /// Confirms that an enemy entered the grid.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
        /// Spawn point the enemy entered from.
        spawn: CellCoord,
    },
    /// Reports that a spawn request named a cell that is not a spawn point.
    EnemySpawnRejected {
        /// Cell provided in the spawn request.
        spawn: CellCoord,
        /// Kind of enemy requested.
        kind: EnemyKind,
    },
    /// Confirms that an enemy moved to a new position.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Position the enemy occupied before moving.
        from: Vec2,
        /// Position the enemy occupies after moving.
        to: Vec2,
    },
    /// Announces that an enemy entered the base cell and left the grid.
    EnemyReachedBase {
        /// Identifier of the enemy that reached the base.
        enemy: EnemyId,
    },
}

/// Occupancy state of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Free cell that enemies may traverse and towers may occupy.
    Empty,
    /// Cell blocked by a tower.
    Occupied,
    /// The single destination cell enemies try to reach.
    Base,
}

/// Cardinal movement directions available to enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Neighbor enumeration order: up, right, down, left.
    ///
    /// Flow direction selection keeps the first of several equally short
    /// neighbors, so this order is observable in every flow field.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row offsets of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell one step away in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(Self::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Hop count from a cell to the base, or unreachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Distance(u32);

impl Distance {
    /// Distance recorded on the base itself.
    pub const ZERO: Distance = Distance(0);
    /// Sentinel for cells with no path to the base. Orders after every finite distance.
    pub const UNREACHABLE: Distance = Distance(u32::MAX);

    /// Creates a finite distance measured in steps.
    #[must_use]
    pub const fn steps(value: u32) -> Self {
        Self(value)
    }

    /// Reports whether the distance is finite.
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        self.0 != u32::MAX
    }

    /// Number of steps to the base, or `None` when unreachable.
    #[must_use]
    pub const fn get(self) -> Option<u32> {
        if self.is_reachable() {
            Some(self.0)
        } else {
            None
        }
    }

    /// Distance one step further from the base, saturating at unreachable.
    #[must_use]
    pub const fn successor(self) -> Self {
        if self.0 >= u32::MAX - 1 {
            Self::UNREACHABLE
        } else {
            Self(self.0 + 1)
        }
    }
}

/// How an entity moves across the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Traversal {
    /// Walks through empty cells and the base only.
    Ground,
    /// Ignores occupancy and is limited by the grid bounds alone.
    Flying,
}

/// Types of enemies that can enter the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Standard enemy unit.
    Grunt,
    /// Fast but fragile unit.
    Runner,
    /// Slow, heavily armoured unit.
    Siege,
    /// Flying unit that ignores towers.
    Flyer,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 4] = [Self::Grunt, Self::Runner, Self::Siege, Self::Flyer];

    /// Movement speed measured in cells per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Grunt => 1.5,
            Self::Runner => 3.0,
            Self::Siege => 0.75,
            Self::Flyer => 2.25,
        }
    }

    /// Which flow field the enemy follows.
    #[must_use]
    pub const fn traversal(self) -> Traversal {
        match self {
            Self::Flyer => Traversal::Flying,
            Self::Grunt | Self::Runner | Self::Siege => Traversal::Ground,
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Grunt => "Grunt",
            Self::Runner => "Runner",
            Self::Siege => "Siege Unit",
            Self::Flyer => "Flyer",
        }
    }
}

/// Types of towers that can be constructed on the grid.
///
/// Every kind occupies exactly one cell and blocks ground traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap blocking wall without an attack.
    Wall,
    /// Fast-firing tower.
    MachineGun,
    /// Tower that slows enemies.
    Slow,
    /// Cannon that shoots through several enemies.
    Pierce,
    /// Mortar dealing area damage.
    Splash,
}

impl TowerKind {
    /// Human readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Wall => "Wall",
            Self::MachineGun => "Machine Gun",
            Self::Slow => "Slow Tower",
            Self::Pierce => "Pierce Cannon",
            Self::Splash => "Splash Mortar",
        }
    }
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    #[error("Position out of bounds")]
    OutOfBounds,
    /// The requested cell is not empty.
    #[error("Position is occupied")]
    Occupied,
    /// The tower would cut at least one spawn point off from the base.
    #[error("Would block path to base")]
    WouldBlockPath,
    /// The tower would leave an enemy already on the grid without a path.
    #[error("Would trap active enemies")]
    WouldTrapEnemy,
}

/// Reasons a tower removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// No tower with the provided identifier exists.
    #[error("No tower here")]
    MissingTower,
}

/// Presentation-level classification of a prospective placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementFeedback {
    /// A tower may be placed.
    Valid,
    /// The cell is outside the grid or the tower would block a path.
    Invalid,
    /// The cell already holds a tower or the base.
    Occupied,
}

/// Enemy position and traversal as seen by placement validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveEnemy {
    /// Continuous position in screen units.
    pub position: Vec2,
    /// Which field the enemy navigates by.
    pub traversal: Traversal,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of enemy.
    pub kind: EnemyKind,
    /// Continuous position in screen units.
    pub position: Vec2,
}

impl EnemySnapshot {
    /// Placement-validation view of the enemy.
    #[must_use]
    pub fn as_active(&self) -> ActiveEnemy {
        ActiveEnemy {
            position: self.position,
            traversal: self.kind.traversal(),
        }
    }
}

/// Read-only snapshot describing all enemies on the grid.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
}

/// Read-only snapshot describing all towers placed on the grid.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, Direction, Distance, EnemyKind, PlacementError, TowerId, TowerKind, Traversal,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn direction_order_is_up_right_down_left() {
        let deltas: Vec<_> = Direction::ALL.iter().map(|d| d.delta()).collect();
        assert_eq!(deltas, vec![(0, -1), (1, 0), (0, 1), (-1, 0)]);
    }

    #[test]
    fn step_refuses_negative_coordinates() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(corner.step(Direction::East), Some(CellCoord::new(1, 0)));
        assert_eq!(corner.step(Direction::South), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn unreachable_distance_orders_after_finite_values() {
        assert!(Distance::steps(1_000_000) < Distance::UNREACHABLE);
        assert!(!Distance::UNREACHABLE.is_reachable());
        assert_eq!(Distance::UNREACHABLE.get(), None);
        assert_eq!(Distance::steps(7).get(), Some(7));
        assert_eq!(Distance::ZERO.successor(), Distance::steps(1));
        assert_eq!(Distance::UNREACHABLE.successor(), Distance::UNREACHABLE);
    }

    #[test]
    fn only_flyers_fly() {
        for kind in EnemyKind::ALL {
            let expected = if kind == EnemyKind::Flyer {
                Traversal::Flying
            } else {
                Traversal::Ground
            };
            assert_eq!(kind.traversal(), expected, "{}", kind.label());
        }
    }

    #[test]
    fn placement_errors_render_player_facing_reasons() {
        assert_eq!(
            PlacementError::OutOfBounds.to_string(),
            "Position out of bounds"
        );
        assert_eq!(PlacementError::Occupied.to_string(), "Position is occupied");
        assert_eq!(
            PlacementError::WouldBlockPath.to_string(),
            "Would block path to base"
        );
        assert_eq!(
            PlacementError::WouldTrapEnemy.to_string(),
            "Would trap active enemies"
        );
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_layout_values_round_trip_through_bincode() {
        assert_round_trip(&TowerId::new(42));
        assert_round_trip(&TowerKind::Splash);
        assert_round_trip(&CellCoord::new(5, 7));
        assert_round_trip(&PlacementError::WouldTrapEnemy);
    }
}
