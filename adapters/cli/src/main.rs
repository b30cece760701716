#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless Grid Defence session.

mod heatmap;
mod layout_transfer;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use grid_defence_core::{CellCoord, Command, EnemyKind, Event, TowerKind};
use grid_defence_system_builder::{Builder, BuilderInput};
use grid_defence_system_movement::Movement;
use grid_defence_world::{self as world, query, Config, World};
use layout_transfer::{TowerLayoutSnapshot, TowerLayoutTower};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for a Grid Defence session.
#[derive(Debug, Parser)]
#[command(name = "grid-defence", about = "Runs a headless Grid Defence session")]
struct CliArgs {
    /// TOML file providing the grid configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of cells along each edge, overriding the configuration.
    #[arg(long, value_name = "CELLS")]
    size: Option<u32>,
    /// Screen units spanned by a cell, overriding the configuration.
    #[arg(long, value_name = "UNITS")]
    cell_size: Option<f32>,
    /// Tower kind placed through `--tower`.
    #[arg(long, value_enum, default_value_t = TowerChoice::Wall)]
    kind: TowerChoice,
    /// Cell to build a tower on, formatted as `column,row`. May be repeated.
    #[arg(long = "tower", value_name = "COLUMN,ROW", value_parser = parse_cell)]
    towers: Vec<CellCoord>,
    /// Layout string produced by `--export` to preload towers from.
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<String>,
    /// Spawns one enemy of this kind on every spawn point.
    #[arg(long, value_enum)]
    spawn: Option<EnemyChoice>,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 0)]
    ticks: u32,
    /// Duration of a simulation tick in milliseconds.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Prints the ground distance heatmap after the session.
    #[arg(long)]
    heatmap: bool,
    /// Prints the final tower layout as a transferable string.
    #[arg(long)]
    export: bool,
}

/// Tower kinds selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TowerChoice {
    /// Blocking wall.
    Wall,
    /// Machine gun tower.
    MachineGun,
    /// Slowing tower.
    Slow,
    /// Pierce cannon.
    Pierce,
    /// Splash mortar.
    Splash,
}

impl From<TowerChoice> for TowerKind {
    fn from(choice: TowerChoice) -> Self {
        match choice {
            TowerChoice::Wall => Self::Wall,
            TowerChoice::MachineGun => Self::MachineGun,
            TowerChoice::Slow => Self::Slow,
            TowerChoice::Pierce => Self::Pierce,
            TowerChoice::Splash => Self::Splash,
        }
    }
}

/// Enemy kinds selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EnemyChoice {
    /// Standard unit.
    Grunt,
    /// Fast unit.
    Runner,
    /// Slow armoured unit.
    Siege,
    /// Flying unit.
    Flyer,
}

impl From<EnemyChoice> for EnemyKind {
    fn from(choice: EnemyChoice) -> Self {
        match choice {
            EnemyChoice::Grunt => Self::Grunt,
            EnemyChoice::Runner => Self::Runner,
            EnemyChoice::Siege => Self::Siege,
            EnemyChoice::Flyer => Self::Flyer,
        }
    }
}

/// Entry point for the Grid Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = load_config(&args)?;
    let mut world = World::with_config(config).context("invalid grid configuration")?;
    println!("{}", query::welcome_banner(&world));

    if let Some(layout) = args.layout.as_deref() {
        import_layout(&mut world, layout)?;
    }

    build_towers(&mut world, args.kind.into(), &args.towers);

    if let Some(kind) = args.spawn {
        spawn_wave(&mut world, kind.into());
    }

    if args.ticks > 0 {
        simulate(&mut world, args.ticks, Duration::from_millis(args.tick_ms));
    }

    if args.heatmap {
        print!("{}", heatmap::render(query::grid(&world), query::ground_field(&world)));
    }

    if args.export {
        println!("{}", export_layout(&world)?);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(size) = args.size {
        config = config.with_grid_size(size);
    }
    if let Some(cell_size) = args.cell_size {
        config = config.with_cell_size(cell_size);
    }

    debug!(
        grid_size = config.grid_size(),
        cell_size = config.cell_size(),
        "configuration loaded"
    );
    Ok(config)
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW but found '{value}'"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column '{column}': {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row '{row}': {error}"))?;
    Ok(CellCoord::new(column, row))
}

fn import_layout(world: &mut World, layout: &str) -> Result<()> {
    let snapshot = TowerLayoutSnapshot::decode(layout).context("failed to import layout")?;
    let size = query::grid(world).size();
    if snapshot.size != size {
        bail!(
            "layout was captured on a {} cell grid but the session uses {size}",
            snapshot.size
        );
    }

    let mut events = Vec::new();
    for tower in &snapshot.towers {
        world::apply(
            world,
            Command::PlaceTower {
                kind: tower.kind,
                cell: tower.cell,
            },
            &mut events,
        );
    }

    let placed = events
        .iter()
        .filter(|event| matches!(event, Event::TowerPlaced { .. }))
        .count();
    if placed != snapshot.towers.len() {
        warn!(
            placed,
            requested = snapshot.towers.len(),
            "layout towers were rejected on import"
        );
    }
    info!(placed, "layout imported");
    Ok(())
}

fn build_towers(world: &mut World, kind: TowerKind, cells: &[CellCoord]) {
    let mut builder = Builder::new();
    let mut commands = Vec::new();
    builder.handle(
        None,
        BuilderInput {
            select: Some(kind),
            ..BuilderInput::default()
        },
        |_| None,
        &mut commands,
    );

    for &cell in cells {
        let preview = builder.preview(Some(cell), |cell| query::placement_feedback(world, cell));
        builder.handle(
            preview,
            BuilderInput {
                confirm_action: true,
                cursor_cell: Some(cell),
                ..BuilderInput::default()
            },
            |cell| query::tower_at(world, cell),
            &mut commands,
        );

        if commands.is_empty() {
            let reason = match query::can_place_tower(world, cell) {
                Err(error) => error.to_string(),
                Ok(()) => "Preview rejected".to_owned(),
            };
            println!("{} at {cell}: rejected ({reason})", kind.label());
            continue;
        }

        let mut events = Vec::new();
        for command in commands.drain(..) {
            world::apply(world, command, &mut events);
        }
        for event in &events {
            match event {
                Event::TowerPlaced { tower, kind, cell } => {
                    println!("{} #{} placed at {cell}", kind.label(), tower.get());
                }
                Event::TowerPlacementRejected { kind, cell, reason } => {
                    println!("{} at {cell}: rejected ({reason})", kind.label());
                }
                _ => {}
            }
        }
    }
}

fn spawn_wave(world: &mut World, kind: EnemyKind) {
    let spawns = query::grid(world).spawn_points().to_vec();
    let mut events = Vec::new();
    for spawn in spawns {
        world::apply(world, Command::SpawnEnemy { spawn, kind }, &mut events);
    }

    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    println!("Spawned {spawned} {}", kind.label());
}

fn simulate(world: &mut World, ticks: u32, dt: Duration) {
    let mut movement = Movement::new();
    let mut arrivals = 0usize;

    for _ in 0..ticks {
        let mut events = Vec::new();
        world::apply(world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        movement.handle(
            &events,
            &query::enemy_view(world),
            query::navigation(world),
            &mut commands,
        );

        let mut generated = Vec::new();
        for command in commands {
            world::apply(world, command, &mut generated);
        }
        arrivals += generated
            .iter()
            .filter(|event| matches!(event, Event::EnemyReachedBase { .. }))
            .count();

        if query::enemy_view(world).is_empty() {
            break;
        }
    }

    println!(
        "After {} ticks: {arrivals} reached the base, {} still on the grid, {} held",
        query::tick_index(world),
        query::enemy_view(world).len(),
        movement.held().count()
    );
}

fn export_layout(world: &World) -> Result<String> {
    let snapshot = TowerLayoutSnapshot {
        size: query::grid(world).size(),
        towers: query::tower_view(world)
            .into_vec()
            .into_iter()
            .map(|tower| TowerLayoutTower {
                kind: tower.kind,
                cell: tower.cell,
            })
            .collect(),
    };
    snapshot.encode().context("failed to export layout")
}
