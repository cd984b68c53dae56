//! Grid cells and their placed contents.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tactica_core::Point;

use crate::item::Item;
use crate::terrain::Block;

/// Identity of a placed fixture, unique within a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureId(pub u32);

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixture#{}", self.0)
    }
}

/// Something placed in a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Fixture {
    /// A closed chest, opened from an adjacent cell.
    Chest { id: FixtureId, items: Vec<Item> },
    /// An item lying on the ground, picked up from the same cell.
    Loot { id: FixtureId, item: Item },
}

impl Fixture {
    pub fn id(&self) -> FixtureId {
        match self {
            Fixture::Chest { id, .. } | Fixture::Loot { id, .. } => *id,
        }
    }

    pub fn is_chest(&self) -> bool {
        matches!(self, Fixture::Chest { .. })
    }
}

/// One grid tile: terrain flags plus placed contents.
///
/// Occupancy is not stored here; the floor derives it from unit positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pos: Point,
    blocks: BTreeSet<Block>,
    random: f64,
    contents: Vec<Fixture>,
}

impl Cell {
    pub fn new(pos: Point, blocks: impl IntoIterator<Item = Block>, random: f64) -> Self {
        Self {
            pos,
            blocks: blocks.into_iter().collect(),
            random,
            contents: Vec::new(),
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn blocks(&self) -> &BTreeSet<Block> {
        &self.blocks
    }

    /// Per-cell random value in `[0, 1)`, used for cosmetic tile variation.
    pub fn random(&self) -> f64 {
        self.random
    }

    pub fn has(&self, block: Block) -> bool {
        self.blocks.contains(&block)
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.has(Block::Wall)
    }

    /// Whether units may stand on or walk through this cell.
    #[inline]
    pub fn pathable(&self) -> bool {
        !self.is_wall()
    }

    pub fn is_adjacent_to(&self, other: &Cell) -> bool {
        self.pos.is_adjacent(other.pos)
    }

    pub fn contents(&self) -> &[Fixture] {
        &self.contents
    }

    /// Character representation: the most specific flag wins.
    pub fn rune(&self) -> char {
        [
            Block::Wall,
            Block::UpStair,
            Block::DownStair,
            Block::EnemySpawn,
            Block::PlayerSpawn,
        ]
        .into_iter()
        .find(|&b| self.has(b))
        .map_or('.', Block::rune)
    }

    /// Callers go through `Floor::place_fixture`, which first removes the
    /// fixture from any other cell.
    pub(crate) fn add(&mut self, fixture: Fixture) {
        debug_assert!(self.contents.iter().all(|f| f.id() != fixture.id()));
        self.contents.push(fixture);
    }

    pub(crate) fn remove(&mut self, id: FixtureId) -> Option<Fixture> {
        let i = self.contents.iter().position(|f| f.id() == id)?;
        Some(self.contents.remove(i))
    }

    /// Remove every fixture matching `pred`, in placement order.
    pub(crate) fn take_where(&mut self, pred: impl Fn(&Fixture) -> bool) -> Vec<Fixture> {
        let (taken, kept): (Vec<Fixture>, Vec<Fixture>) = std::mem::take(&mut self.contents)
            .into_iter()
            .partition(|f| pred(f));
        self.contents = kept;
        taken
    }
}
