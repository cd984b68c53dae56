//! Headless floor runner: generate or load a floor, let both sides play
//! greedily, and print the event log as it grows.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use delve_lib::{
    Ai, Biome, Effect, EventCursor, Floor, FloorConfig, Outcome, Peep, Team, UnitId,
    default_roster, generate_floor,
};
use tactica_core::Point;

#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Play a tactical floor headlessly", long_about = None)]
#[command(version)]
struct Cli {
    /// Seed string for generation and in-floor randomness
    #[arg(short, long, default_value = "delve")]
    seed: String,

    /// Biome: cave, crypt or grove
    #[arg(short, long, default_value = "cave", value_parser = parse_biome)]
    biome: Biome,

    /// JSON file holding the player roster (an array of peeps)
    #[arg(short, long, value_name = "FILE")]
    roster: Option<PathBuf>,

    /// JSON file with floor configuration overrides
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Resume from a saved floor instead of generating one
    #[arg(long, value_name = "FILE", conflicts_with_all = ["roster", "biome"])]
    load: Option<PathBuf>,

    /// Write the final floor state here
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Stop after this many rounds
    #[arg(long, default_value = "50")]
    max_rounds: u32,
}

fn parse_biome(s: &str) -> std::result::Result<Biome, String> {
    Biome::ALL
        .into_iter()
        .find(|b| b.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown biome {s:?}, expected cave, crypt or grove"))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config: FloorConfig = match &cli.config {
        Some(path) => read_json(path)?,
        None => FloorConfig::default(),
    };
    let mut floor = match &cli.load {
        Some(path) => Floor::load_with_config(read_json(path)?, config),
        None => {
            let roster: Vec<Peep> = match &cli.roster {
                Some(path) => read_json(path)?,
                None => default_roster(),
            };
            generate_floor(cli.biome, &roster, &cli.seed, config)
        }
    };

    print_map(&floor);
    let mut cursor = EventCursor::new();
    let players = Ai::new(Team::Player);
    let mut round = 0;
    while floor.outcome().is_none() && round < cli.max_rounds {
        round += 1;
        println!("-- round {round}");
        if floor.phase() != Team::Player {
            match floor.ai() {
                Some(ai) => ai.take_turn(&mut floor),
                None => floor.end_turn(),
            }
        }
        play_players(&mut floor, players)?;
        while let Some(event) = cursor.next(floor.events()) {
            println!("  {event}");
        }
    }

    print_map(&floor);
    match floor.outcome() {
        Some(Outcome::Cleared) => println!("floor cleared in {round} rounds"),
        Some(Outcome::Failed) => println!("party lost in {round} rounds"),
        None => println!("no outcome after {round} rounds"),
    }

    if let Some(path) = &cli.save {
        fs::write(path, floor.to_json()?).with_context(|| format!("writing {}", path.display()))?;
        println!("saved to {}", path.display());
    }
    Ok(())
}

/// One player phase: loot, heal when low, snipe when possible, otherwise
/// play the same greedy policy as the enemies.
fn play_players(floor: &mut Floor, policy: Ai) -> Result<()> {
    let pending: Vec<UnitId> = floor
        .team_units(Team::Player)
        .filter(|u| !u.moved())
        .map(|u| u.id())
        .collect();
    for id in pending {
        if floor.phase() != Team::Player || floor.unit(id).is_none() {
            continue;
        }
        floor.pickup_below(id)?;
        floor.open_nearby(id)?;

        let potion = floor.unit(id).and_then(|u| {
            let hurt = u.health() * 2 <= u.max_health();
            u.inventory()
                .iter()
                .position(|i| i.effect_id == Some(Effect::Healing))
                .filter(|_| hurt)
        });
        if let Some(slot) = potion {
            floor.use_item(id, slot)?;
        }

        let shot = floor.view(id).and_then(|v| {
            v.actions().into_iter().find_map(|action| {
                let target = action.target_cells(floor, id).into_iter().next()?;
                Some((action, target))
            })
        });
        match shot {
            Some((action, target)) => action.execute(floor, id, target)?,
            None => policy.act(floor, id),
        }
    }
    Ok(())
}

fn print_map(floor: &Floor) {
    let bounds = floor.bounds();
    for y in bounds.min.y..bounds.max.y {
        let row: String = (bounds.min.x..bounds.max.x)
            .map(|x| {
                let p = Point::new(x, y);
                if let Some(u) = floor.unit_at(p) {
                    return match u.team() {
                        Team::Player => '@',
                        Team::Enemy => u.peep().kind_id.chars().next().unwrap_or('e'),
                    };
                }
                match floor.cell(p) {
                    Some(c) if !c.contents().is_empty() => '$',
                    Some(c) => c.rune(),
                    None => ' ',
                }
            })
            .collect();
        println!("{row}");
    }
}
