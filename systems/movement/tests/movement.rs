use std::time::Duration;

use glam::Vec2;
use grid_defence_core::{
    CellCoord, CellState, Command, EnemyId, EnemyKind, EnemySnapshot, EnemyView, Event,
};
use grid_defence_system_movement::Movement;
use grid_defence_world::{self as world, query, FlowField, Grid, NavigationView, World};

fn tick(ms: u64) -> Vec<Event> {
    vec![Event::TimeAdvanced {
        dt: Duration::from_millis(ms),
    }]
}

fn snapshot(id: u32, kind: EnemyKind, position: Vec2) -> EnemySnapshot {
    EnemySnapshot {
        id: EnemyId::new(id),
        kind,
        position,
    }
}

#[test]
fn emits_step_toward_base_along_flow_direction() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            spawn: CellCoord::new(0, 0),
            kind: EnemyKind::Grunt,
        },
        &mut events,
    );

    let mut movement = Movement::new();
    let mut commands = Vec::new();
    movement.handle(
        &tick(100),
        &query::enemy_view(&world),
        query::navigation(&world),
        &mut commands,
    );

    assert_eq!(commands.len(), 1);
    let Command::MoveEnemy { enemy, position } = commands[0] else {
        panic!("unexpected command: {:?}", commands[0]);
    };
    assert_eq!(enemy, EnemyId::new(0));
    // Up and left leave the grid, right and down tie: right wins.
    assert!((position - Vec2::new(26.0, 20.0)).length() < 1e-3, "{position:?}");
}

#[test]
fn no_commands_without_time_advancing() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            spawn: CellCoord::new(0, 0),
            kind: EnemyKind::Runner,
        },
        &mut events,
    );

    let mut movement = Movement::new();
    let mut commands = Vec::new();
    movement.handle(
        &events,
        &query::enemy_view(&world),
        query::navigation(&world),
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn long_ticks_stop_on_the_next_cell_centre() {
    let grid = Grid::new(20);
    let ground = FlowField::ground(&grid);
    let flying = FlowField::flying(&grid);
    let start = grid.grid_to_screen(CellCoord::new(9, 10));
    let enemies = EnemyView::from_snapshots(vec![snapshot(3, EnemyKind::Runner, start)]);

    let mut movement = Movement::new();
    let mut commands = Vec::new();
    movement.handle(
        &tick(5_000),
        &enemies,
        NavigationView::new(&grid, &ground, &flying),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::MoveEnemy {
            enemy: EnemyId::new(3),
            position: grid.grid_to_screen(grid.base()),
        }]
    );
}

#[test]
fn ground_enemies_hold_where_only_flyers_can_pass() {
    let mut grid = Grid::new(9);
    for x in 2..=6 {
        assert!(grid.set_state(CellCoord::new(x, 2), CellState::Occupied));
        assert!(grid.set_state(CellCoord::new(x, 6), CellState::Occupied));
    }
    for y in 3..=5 {
        assert!(grid.set_state(CellCoord::new(2, y), CellState::Occupied));
        assert!(grid.set_state(CellCoord::new(6, y), CellState::Occupied));
    }
    let ground = FlowField::ground(&grid);
    let flying = FlowField::flying(&grid);
    let outside = grid.grid_to_screen(CellCoord::new(0, 0));
    let enemies = EnemyView::from_snapshots(vec![
        snapshot(0, EnemyKind::Siege, outside),
        snapshot(1, EnemyKind::Flyer, outside),
    ]);

    let mut movement = Movement::new();
    let mut commands = Vec::new();
    movement.handle(
        &tick(100),
        &enemies,
        NavigationView::new(&grid, &ground, &flying),
        &mut commands,
    );

    assert_eq!(commands.len(), 1);
    assert!(matches!(
        commands[0],
        Command::MoveEnemy { enemy, .. } if enemy == EnemyId::new(1)
    ));
    assert_eq!(movement.held().collect::<Vec<_>>(), vec![EnemyId::new(0)]);
}

#[test]
fn every_spawned_enemy_eventually_reaches_the_base() {
    let mut world = World::new();
    let mut events = Vec::new();
    for cell in [CellCoord::new(9, 9), CellCoord::new(10, 9), CellCoord::new(11, 9)] {
        world::apply(
            &mut world,
            Command::PlaceTower {
                kind: grid_defence_core::TowerKind::Wall,
                cell,
            },
            &mut events,
        );
    }
    let spawns = query::grid(&world).spawn_points().to_vec();
    for (index, spawn) in spawns.iter().enumerate() {
        let kind = EnemyKind::ALL[index % EnemyKind::ALL.len()];
        world::apply(
            &mut world,
            Command::SpawnEnemy { spawn: *spawn, kind },
            &mut events,
        );
    }

    let mut movement = Movement::new();
    let mut arrivals = 0;
    for _ in 0..2_000 {
        let mut tick_events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut tick_events,
        );

        let mut commands = Vec::new();
        movement.handle(
            &tick_events,
            &query::enemy_view(&world),
            query::navigation(&world),
            &mut commands,
        );
        for command in commands {
            let mut generated = Vec::new();
            world::apply(&mut world, command, &mut generated);
            arrivals += generated
                .iter()
                .filter(|event| matches!(event, Event::EnemyReachedBase { .. }))
                .count();
        }

        if query::enemy_view(&world).is_empty() {
            break;
        }
    }

    assert_eq!(arrivals, spawns.len());
    assert!(query::enemy_view(&world).is_empty());
    assert_eq!(movement.held().count(), 0);
}
