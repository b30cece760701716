#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that steers enemies along the flow fields.

use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use grid_defence_core::{Command, EnemyId, EnemySnapshot, EnemyView, Event};
use grid_defence_world::NavigationView;
use tracing::trace;

/// Pure system that reacts to world events and emits movement commands.
///
/// Each tick every enemy samples the field matching its traversal at the cell
/// it currently stands in. Enemies without a flow direction hold position for
/// the tick and produce no command.
#[derive(Debug, Default)]
pub struct Movement {
    held: BTreeSet<EnemyId>,
}

impl Movement {
    /// Creates a new movement system with no held enemies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enemies that could not move during the most recent tick.
    pub fn held(&self) -> impl Iterator<Item = EnemyId> + '_ {
        self.held.iter().copied()
    }

    /// Consumes world events and immutable views to emit movement commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        navigation: NavigationView<'_>,
        out: &mut Vec<Command>,
    ) {
        let mut advanced = false;
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                advanced = true;
                elapsed = elapsed.saturating_add(*dt);
            }
        }

        if !advanced {
            return;
        }

        let dt = elapsed.as_secs_f32();
        let mut still_held = BTreeSet::new();

        for enemy in enemies.iter() {
            match next_position(enemy, &navigation, dt) {
                Some(position) => out.push(Command::MoveEnemy {
                    enemy: enemy.id,
                    position,
                }),
                None => {
                    if !self.held.contains(&enemy.id) {
                        trace!(enemy = enemy.id.get(), "enemy holding position");
                    }
                    let _ = still_held.insert(enemy.id);
                }
            }
        }

        self.held = still_held;
    }
}

fn next_position(enemy: &EnemySnapshot, navigation: &NavigationView<'_>, dt: f32) -> Option<Vec2> {
    let grid = navigation.grid();
    let cell = grid
        .screen_to_grid(enemy.position)
        .filter(|cell| grid.is_valid(*cell))?;

    if cell == grid.base() {
        return None;
    }

    let direction = navigation
        .field(enemy.kind.traversal())
        .direction(cell)?;
    let target = grid.grid_to_screen(cell.step(direction)?);

    let offset = target - enemy.position;
    let remaining = offset.length();
    let travel = enemy.kind.speed() * grid.cell_size() * dt;
    if travel <= 0.0 || remaining <= 0.0 {
        return None;
    }

    if travel >= remaining {
        Some(target)
    } else {
        Some(enemy.position + offset / remaining * travel)
    }
}
