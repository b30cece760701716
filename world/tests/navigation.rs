use grid_defence_core::{
    CellCoord, CellState, Command, Direction, Distance, EnemyKind, PlacementError, TowerKind,
};
use grid_defence_world::{
    self as world, are_all_spawns_reachable, query, BuildValidator, FlowField, Grid, World,
};

#[test]
fn every_spawn_walks_to_base_in_exactly_its_distance() {
    for size in 2..=32 {
        let grid = Grid::new(size);
        let field = FlowField::ground(&grid);

        for &spawn in grid.spawn_points() {
            let distance = field
                .distance(spawn)
                .get()
                .unwrap_or_else(|| panic!("size {size}: spawn {spawn} unreachable"));
            let path = field
                .path_from(spawn)
                .unwrap_or_else(|| panic!("size {size}: spawn {spawn} has no path"));

            assert_eq!(path.len() as u32, distance + 1, "size {size}: spawn {spawn}");
            assert_eq!(path.last().copied(), Some(grid.base()));
            for pair in path.windows(2) {
                assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
                assert_eq!(
                    field.distance(pair[1]).get(),
                    field.distance(pair[0]).get().map(|d| d - 1)
                );
            }
        }
    }
}

#[test]
fn twenty_by_twenty_reference_scenario() {
    let world = World::new();
    let field = query::ground_field(&world);

    assert_eq!(query::grid(&world).base(), CellCoord::new(10, 10));
    assert_eq!(field.distance(CellCoord::new(10, 10)), Distance::ZERO);
    assert_eq!(field.distance(CellCoord::new(9, 10)), Distance::steps(1));
    assert_eq!(field.direction(CellCoord::new(9, 10)), Some(Direction::East));
    assert_eq!(Direction::East.delta(), (1, 0));
}

#[test]
fn sealing_the_base_fails_reachability_before_further_placement() {
    let mut grid = Grid::new(20);
    for (column, row) in [(10, 9), (11, 10), (10, 11), (9, 10)] {
        assert!(grid.set_state(CellCoord::new(column, row), CellState::Occupied));
    }

    assert!(!are_all_spawns_reachable(&grid));
    assert_eq!(
        BuildValidator::new(&grid).can_place_tower(CellCoord::new(2, 2), &[]),
        Err(PlacementError::WouldBlockPath)
    );
}

#[test]
fn validation_is_repeatable_and_side_effect_free() {
    let mut live = World::new();
    let mut events = Vec::new();
    for cell in [CellCoord::new(5, 5), CellCoord::new(6, 5), CellCoord::new(7, 5)] {
        world::apply(
            &mut live,
            Command::PlaceTower {
                kind: TowerKind::MachineGun,
                cell,
            },
            &mut events,
        );
    }
    world::apply(
        &mut live,
        Command::SpawnEnemy {
            spawn: CellCoord::new(4, 0),
            kind: EnemyKind::Siege,
        },
        &mut events,
    );

    let grid_before = query::grid(&live).clone();
    let field_before = query::ground_field(&live).clone();
    let enemies = query::active_enemies(&live);
    assert_eq!(enemies.len(), 1);
    let validator = BuildValidator::new(query::grid(&live));

    for column in 0..20 {
        for row in 0..20 {
            let cell = CellCoord::new(column, row);
            let first = query::can_place_tower(&live, cell);
            let second = validator.can_place_tower(cell, &enemies);
            assert_eq!(first, second, "{cell}");
        }
    }
    assert_eq!(
        query::can_place_tower(&live, CellCoord::new(4, 0)),
        Err(PlacementError::WouldBlockPath)
    );

    assert_eq!(query::grid(&live), &grid_before);
    assert_eq!(query::ground_field(&live), &field_before);
}

#[test]
fn accepted_placements_never_disconnect_spawns() {
    let mut live = World::new();
    let mut events = Vec::new();

    // Sweep the whole map trying to wall everything off.
    for row in 0..20 {
        for column in 0..20 {
            world::apply(
                &mut live,
                Command::PlaceTower {
                    kind: TowerKind::Wall,
                    cell: CellCoord::new(column, row),
                },
                &mut events,
            );
            assert!(are_all_spawns_reachable(query::grid(&live)));
        }
    }

    let field = query::ground_field(&live);
    for &spawn in query::grid(&live).spawn_points() {
        assert!(field.path_from(spawn).is_some(), "{spawn}");
    }
}
