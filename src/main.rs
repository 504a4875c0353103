//! # Item Groups Entry Point
//!
//! Loads an item-type catalog and group definitions, then spawns from a group,
//! lists what it can spawn, or validates every definition.

use clap::Parser;
use item_groups::{GroupRegistry, Item, ItemTypeCatalog, LoadError, LoadResult, TimePoint};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Command line arguments for the item group spawner.
#[derive(Parser, Debug)]
#[command(name = "item-groups")]
#[command(about = "Spawn items from weighted, recursive item group definitions")]
#[command(version)]
struct Args {
    /// JSON array of item types
    #[arg(long)]
    items: PathBuf,

    /// JSON array of item group definitions
    #[arg(long)]
    groups: PathBuf,

    /// Group to spawn from or inspect
    #[arg(short, long)]
    group: Option<String>,

    /// Random seed for spawning
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of times to spawn from the group
    #[arg(short, long, default_value_t = 1)]
    count: u32,

    /// Birthday given to spawned items, in turns
    #[arg(long, default_value_t = 0)]
    turn: u64,

    /// Spawn a single item per repetition instead of the whole group
    #[arg(long)]
    single: bool,

    /// Check every group for unknown references and bad chances
    #[arg(long)]
    check: bool,

    /// List every item type the group can spawn
    #[arg(long)]
    every: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> LoadResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting item-groups v{}", item_groups::VERSION);

    let catalog = ItemTypeCatalog::load_file(&args.items)?;
    let mut registry = GroupRegistry::new();
    registry.load_file(&args.groups)?;
    info!("Loaded {} item types and {} groups", catalog.len(), registry.len());

    if args.check {
        let errors = registry.check_consistency(&catalog);
        if errors.is_empty() {
            println!("All {} groups are consistent", registry.len());
        } else {
            for problem in &errors {
                println!("{}", problem);
            }
            println!("{} problems found", errors.len());
        }
        return Ok(());
    }

    let Some(group_id) = args.group.as_deref() else {
        error!("No group given; pass --group or --check");
        return Err(LoadError::InvalidDefinition("no group selected".to_string()));
    };
    if !registry.group_is_defined(group_id) {
        error!("Unknown item group {}", group_id);
        return Err(LoadError::InvalidDefinition(format!("unknown item group {}", group_id)));
    }

    if args.every {
        for type_id in registry.every_possible_item_from(group_id) {
            println!("{}", type_id);
        }
        return Ok(());
    }

    let seed = args.seed.unwrap_or(12345);
    info!("Spawning from {} with seed: {}", group_id, seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let birthday = TimePoint(args.turn);

    for _ in 0..args.count {
        let spawned: Vec<Item> = if args.single {
            registry
                .item_from_at(&catalog, group_id, birthday, &mut rng)
                .into_iter()
                .collect()
        } else {
            registry.items_from_at(&catalog, group_id, birthday, &mut rng)
        };
        println!("{}", serde_json::to_string_pretty(&spawned)?);
    }

    Ok(())
}

/// Initializes env_logger at the given level.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}
