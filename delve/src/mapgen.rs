//! Floor generation.
//!
//! A floor is a full `width × height` rectangle. Stairs and spawn cells are
//! decided first, then every remaining cell becomes floor or, with the
//! biome's wall chance, wall:
//!
//! - the up-stair goes on a random cell;
//! - the down-stair on the cell farthest from it (Manhattan);
//! - enemy spawns on the cells nearest the down-stair;
//! - one player spawn per roster member on the cells nearest the up-stair.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, RngExt};
use tactica_core::{Point, Range};

use crate::cell::Cell;
use crate::config::FloorConfig;
use crate::floor::{Floor, seed_rng};
use crate::item::Item;
use crate::peep::Peep;
use crate::terrain::{Biome, Block};
use crate::unit::Team;

/// Floor generator.
pub struct MapGen<R: Rng> {
    pub rng: R,
    pub config: FloorConfig,
}

impl MapGen<StdRng> {
    /// A generator whose output depends only on `seed` and `config`.
    pub fn seeded(seed: &str, config: FloorConfig) -> Self {
        Self::new(seed_rng(seed), config)
    }
}

impl<R: Rng> MapGen<R> {
    pub fn new(rng: R, config: FloorConfig) -> Self {
        Self { rng, config }
    }

    /// Decide the terrain of every cell for a floor hosting `players`
    /// roster members.
    pub fn layout(&mut self, biome: Biome, players: usize) -> Vec<Cell> {
        let area = Range::new(0, 0, self.config.width.max(0), self.config.height.max(0));
        let points: Vec<Point> = area.iter().collect();
        if points.is_empty() {
            return Vec::new();
        }

        let mut decided: BTreeMap<Point, Block> = BTreeMap::new();
        let up = points[self.rng.random_range(0..points.len())];
        decided.insert(up, Block::UpStair);
        let down = points
            .iter()
            .copied()
            .filter(|&p| p != up)
            .max_by_key(|&p| (p.manhattan(up), std::cmp::Reverse(p)));
        if let Some(down) = down {
            decided.insert(down, Block::DownStair);
            for p in nearest_undecided(&points, down, &decided, self.config.enemy_spawns) {
                decided.insert(p, Block::EnemySpawn);
            }
        }
        for p in nearest_undecided(&points, up, &decided, players) {
            decided.insert(p, Block::PlayerSpawn);
        }

        let wall_chance = biome.wall_chance();
        points
            .into_iter()
            .map(|p| {
                let random: f64 = self.rng.random();
                let blocks = match decided.get(&p) {
                    Some(&flag) => vec![Block::Floor, flag],
                    None if self.rng.random_bool(wall_chance) => vec![Block::Wall],
                    None => vec![Block::Floor],
                };
                Cell::new(p, blocks, random)
            })
            .collect()
    }

    /// Lay out a floor, populate both teams and hide a chest.
    pub fn generate(&mut self, biome: Biome, roster: &[Peep], seed: &str) -> Floor {
        let cells = self.layout(biome, roster.len());
        let mut floor = Floor::new(biome, cells, seed, self.config.clone());

        let enemy_spawns = spawn_cells(&floor, Block::EnemySpawn);
        let monsters = biome.monsters();
        for (n, pos) in enemy_spawns.into_iter().enumerate() {
            let kind = monsters[self.rng.random_range(0..monsters.len())];
            if let Err(e) = floor.place_unit(Peep::monster(kind, n + 1), Team::Enemy, Some(pos)) {
                log::warn!("could not place {kind}: {e}");
            }
        }
        let player_spawns = spawn_cells(&floor, Block::PlayerSpawn);
        for (peep, pos) in roster.iter().zip(player_spawns) {
            if let Err(e) = floor.place_unit(peep.clone(), Team::Player, Some(pos)) {
                log::warn!("could not place {}: {e}", peep.name);
            }
        }

        let open: Vec<Point> = floor
            .cells()
            .filter(|c| c.blocks().iter().all(|&b| b == Block::Floor))
            .map(Cell::pos)
            .filter(|&p| floor.unit_at(p).is_none())
            .collect();
        if !open.is_empty() {
            let pos = open[self.rng.random_range(0..open.len())];
            let chest = floor.new_chest(vec![Item::healing_potion()]);
            if let Err(e) = floor.place_fixture(pos, chest) {
                log::warn!("could not place chest: {e}");
            }
        }

        floor.reset_watch();
        log::info!(
            "generated {} floor {}x{} from seed {seed:?}: {} units",
            biome.name(),
            self.config.width,
            self.config.height,
            floor.units().len()
        );
        floor
    }
}

/// Generate a floor deterministically from a seed string.
pub fn generate_floor(biome: Biome, roster: &[Peep], seed: &str, config: FloorConfig) -> Floor {
    MapGen::seeded(seed, config).generate(biome, roster, seed)
}

/// Up to `n` undecided cells closest to `anchor`, ties in row-major order.
fn nearest_undecided(
    points: &[Point],
    anchor: Point,
    decided: &BTreeMap<Point, Block>,
    n: usize,
) -> Vec<Point> {
    let mut eligible: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| !decided.contains_key(p))
        .collect();
    eligible.sort_by_key(|&p| (p.manhattan(anchor), p));
    eligible.truncate(n);
    eligible
}

fn spawn_cells(floor: &Floor, flag: Block) -> Vec<Point> {
    floor.cells().filter(|c| c.has(flag)).map(Cell::pos).collect()
}
