//! Serialized floor state.
//!
//! `Floor::save` is a pure snapshot; persisting it is up to the host. Loading
//! tolerates missing fields by substituting defaults (unit stats come from
//! the [`FloorConfig`] in use), and drops units that cannot stand where the
//! save puts them. The event log is never saved: a
//! loaded floor starts with an empty log.

use serde::{Deserialize, Serialize};
use tactica_core::Point;

use crate::cell::{Cell, Fixture};
use crate::config::FloorConfig;
use crate::error::SaveError;
use crate::floor::Floor;
use crate::item::Item;
use crate::peep::Peep;
use crate::terrain::{Biome, Block};
use crate::unit::{Team, Unit, UnitId};

pub type PeepSave = Peep;
pub type ItemSave = Item;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FloorSave {
    pub biome: Biome,
    pub cells: Vec<CellSave>,
    pub units: Vec<UnitSave>,
    pub phase: Team,
    pub seed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CellSave {
    pub x: i32,
    pub y: i32,
    pub blocks: Vec<Block>,
    pub random: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Fixture>,
}

/// Stats left out of a save are filled in from the loading floor's config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnitSave {
    pub x: i32,
    pub y: i32,
    pub peep: PeepSave,
    pub team: Team,
    pub moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_range: Option<i32>,
    pub inventory: Vec<ItemSave>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_health: Option<i32>,
}

impl Floor {
    /// Snapshot of everything needed to rebuild this floor, minus events.
    pub fn save(&self) -> FloorSave {
        FloorSave {
            biome: self.biome,
            cells: self
                .cells()
                .map(|c| CellSave {
                    x: c.pos().x,
                    y: c.pos().y,
                    blocks: c.blocks().iter().copied().collect(),
                    random: c.random(),
                    contents: c.contents().to_vec(),
                })
                .collect(),
            units: self
                .units()
                .iter()
                .map(|u| UnitSave {
                    x: u.pos.x,
                    y: u.pos.y,
                    peep: u.peep.clone(),
                    team: u.team,
                    moved: u.moved,
                    move_range: Some(u.move_range),
                    inventory: u.inventory.clone(),
                    health: Some(u.health),
                    max_health: Some(u.max_health),
                })
                .collect(),
            phase: self.phase,
            seed: self.seed.clone(),
        }
    }

    /// Rebuild a floor with the default configuration.
    pub fn load(save: FloorSave) -> Floor {
        Self::load_with_config(save, FloorConfig::default())
    }

    pub fn load_with_config(save: FloorSave, config: FloorConfig) -> Floor {
        let mut cells = Vec::with_capacity(save.cells.len());
        let mut fixtures = Vec::new();
        for c in save.cells {
            let pos = Point::new(c.x, c.y);
            if cells.iter().any(|other: &Cell| other.pos() == pos) {
                log::warn!("dropping duplicate cell at {pos}");
                continue;
            }
            fixtures.extend(c.contents.into_iter().map(|f| (pos, f)));
            cells.push(Cell::new(pos, c.blocks, c.random));
        }
        let mut floor = Floor::new(save.biome, cells, &save.seed, config);
        floor.phase = save.phase;

        for (pos, fixture) in fixtures {
            if floor.find_fixture(fixture.id()).is_some() {
                log::warn!("dropping duplicate {} at {pos}", fixture.id());
                continue;
            }
            if let Err(e) = floor.place_fixture(pos, fixture) {
                log::warn!("dropping fixture: {e}");
            }
        }

        for u in save.units {
            let pos = Point::new(u.x, u.y);
            let standable = floor.cell(pos).is_some_and(Cell::pathable);
            if !standable || floor.unit_at(pos).is_some() {
                log::warn!("dropping {} saved at unusable cell {pos}", u.peep.name);
                continue;
            }
            let max_health = u.max_health.unwrap_or(floor.config.default_health);
            floor.insert_unit(Unit {
                id: UnitId(0),
                pos,
                peep: u.peep,
                team: u.team,
                moved: u.moved,
                move_range: u.move_range.unwrap_or(floor.config.default_move_range),
                health: u.health.unwrap_or(max_health).min(max_health),
                max_health,
                inventory: u.inventory,
            });
        }

        floor.reset_watch();
        log::info!(
            "loaded {} floor with {} units, {} phase",
            floor.biome.name(),
            floor.units().len(),
            floor.phase
        );
        floor
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(&self.save())?)
    }

    pub fn from_json(json: &str) -> Result<Floor, SaveError> {
        let save: FloorSave = serde_json::from_str(json)?;
        Ok(Floor::load(save))
    }
}
