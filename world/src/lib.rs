#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Defence.
//!
//! The world owns the occupancy [`Grid`], the ground and flying
//! [`FlowField`]s derived from it, the tower registry, and every enemy on the
//! map. All mutations flow through [`apply`]; both flow fields are rebuilt
//! from scratch whenever a tower is placed or removed.

mod config;
mod flow_field;
mod grid;
mod towers;
mod validation;

use glam::Vec2;
use grid_defence_core::{
    ActiveEnemy, CellCoord, CellState, Command, EnemyId, EnemyKind, EnemySnapshot, Event,
    RemovalError, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

pub use config::{
    Config, ConfigError, DEFAULT_CELL_SIZE, DEFAULT_GRID_SIZE, MAX_GRID_SIZE, MIN_GRID_SIZE,
};
pub use flow_field::{are_all_spawns_reachable, is_path_available, FlowField, NavigationView};
pub use grid::{Grid, Neighbor, SPAWN_SPACING};
pub use validation::BuildValidator;

use towers::TowerRegistry;

/// Represents the authoritative Grid Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: Config,
    grid: Grid,
    ground: FlowField,
    flying: FlowField,
    towers: TowerRegistry,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    tick_index: u64,
}

impl World {
    /// Creates a new world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(Config::default())
    }

    /// Creates a new world from an adapter-supplied configuration.
    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: Config) -> Self {
        let grid = Grid::with_cell_size(config.grid_size(), config.cell_size());
        let ground = FlowField::ground(&grid);
        let flying = FlowField::flying(&grid);
        Self {
            banner: WELCOME_BANNER,
            config,
            grid,
            ground,
            flying,
            towers: TowerRegistry::new(),
            enemies: Vec::new(),
            next_enemy_id: 0,
            tick_index: 0,
        }
    }

    fn rebuild_navigation(&mut self, out_events: &mut Vec<Event>) {
        self.ground = FlowField::ground(&self.grid);
        self.flying = FlowField::flying(&self.grid);
        debug!(
            tick = self.tick_index,
            spawns_reachable = flow_field::spawns_reachable(&self.grid, &self.ground),
            "navigation rebuilt"
        );
        out_events.push(Event::NavigationRebuilt);
    }

    fn active_enemies(&self) -> Vec<ActiveEnemy> {
        self.enemies.iter().map(|enemy| enemy.snapshot().as_active()).collect()
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|candidate| candidate.id == enemy)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::PlaceTower { kind, cell } => {
            let active = world.active_enemies();
            let verdict = BuildValidator::new(&world.grid).can_place_tower(cell, &active);
            match verdict {
                Ok(()) => {
                    let _ = world.grid.set_state(cell, CellState::Occupied);
                    let tower = world.towers.insert(kind, cell);
                    debug!(tower = tower.get(), %cell, kind = kind.label(), "tower placed");
                    out_events.push(Event::TowerPlaced { tower, kind, cell });
                    world.rebuild_navigation(out_events);
                }
                Err(reason) => {
                    info!(%cell, kind = kind.label(), %reason, "tower placement rejected");
                    out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
                }
            }
        }
        Command::RemoveTower { tower } => match world.towers.remove(tower) {
            Some(state) => {
                let _ = world.grid.set_state(state.cell, CellState::Empty);
                debug!(tower = tower.get(), cell = %state.cell, "tower removed");
                out_events.push(Event::TowerRemoved {
                    tower,
                    cell: state.cell,
                });
                world.rebuild_navigation(out_events);
            }
            None => {
                info!(tower = tower.get(), "tower removal rejected");
                out_events.push(Event::TowerRemovalRejected {
                    tower,
                    reason: RemovalError::MissingTower,
                });
            }
        },
        Command::SpawnEnemy { spawn, kind } => {
            if !world.grid.spawn_points().contains(&spawn) {
                warn!(%spawn, kind = kind.label(), "spawn requested away from a spawn point");
                out_events.push(Event::EnemySpawnRejected { spawn, kind });
                return;
            }

            let enemy = EnemyId::new(world.next_enemy_id);
            world.next_enemy_id = world.next_enemy_id.wrapping_add(1);
            world.enemies.push(Enemy {
                id: enemy,
                kind,
                position: world.grid.grid_to_screen(spawn),
            });
            out_events.push(Event::EnemySpawned { enemy, kind, spawn });
        }
        Command::MoveEnemy { enemy, position } => {
            if !position.is_finite() {
                warn!(enemy = enemy.get(), "ignoring non-finite enemy position");
                return;
            }

            let Some(index) = world.enemy_index(enemy) else {
                debug!(enemy = enemy.get(), "ignoring move for unknown enemy");
                return;
            };

            let from = world.enemies[index].position;
            world.enemies[index].position = position;
            out_events.push(Event::EnemyMoved {
                enemy,
                from,
                to: position,
            });

            if world.grid.screen_to_grid(position) == Some(world.grid.base()) {
                let _ = world.enemies.remove(index);
                debug!(enemy = enemy.get(), "enemy reached base");
                out_events.push(Event::EnemyReachedBase { enemy });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use grid_defence_core::{
        ActiveEnemy, CellCoord, EnemyView, PlacementError, PlacementFeedback, TowerId, TowerView,
    };

    use super::{BuildValidator, Config, FlowField, Grid, NavigationView, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Provides read-only access to the live occupancy grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Field followed by ground enemies.
    #[must_use]
    pub fn ground_field(world: &World) -> &FlowField {
        &world.ground
    }

    /// Field followed by flying enemies.
    #[must_use]
    pub fn flying_field(world: &World) -> &FlowField {
        &world.flying
    }

    /// Bundles the grid with both current flow fields.
    #[must_use]
    pub fn navigation(world: &World) -> NavigationView<'_> {
        NavigationView::new(&world.grid, &world.ground, &world.flying)
    }

    /// Captures a read-only view of the enemies on the grid.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Positions and traversals of every enemy, as consumed by placement validation.
    #[must_use]
    pub fn active_enemies(world: &World) -> Vec<ActiveEnemy> {
        world.active_enemies()
    }

    /// Captures a read-only view of the towers on the grid.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.snapshots())
    }

    /// Identifier of the tower standing on `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.tower_at(cell)
    }

    /// Runs placement validation against the live grid and enemies.
    pub fn can_place_tower(world: &World, cell: CellCoord) -> Result<(), PlacementError> {
        BuildValidator::new(&world.grid).can_place_tower(cell, &world.active_enemies())
    }

    /// Classifies a prospective placement for previews.
    #[must_use]
    pub fn placement_feedback(world: &World, cell: CellCoord) -> PlacementFeedback {
        BuildValidator::new(&world.grid).placement_feedback(cell, &world.active_enemies())
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: Vec2,
}

impl Enemy {
    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
        }
    }
}

/// Cell containing a continuous position on the world's grid, if any.
#[must_use]
pub fn cell_at(world: &World, position: Vec2) -> Option<CellCoord> {
    world
        .grid
        .screen_to_grid(position)
        .filter(|cell| world.grid.is_valid(*cell))
}
