//! Delve: the turn-based tactical core of a grid dungeon crawler.
//!
//! A [`Floor`] owns cells, live units, the acting phase and an append-only
//! event log. Callers drive it through mutation methods; presentation reads
//! the log through its own [`EventCursor`].

pub mod action;
pub mod ai;
pub mod cell;
pub mod config;
pub mod error;
pub mod event;
pub mod floor;
pub mod item;
pub mod mapgen;
pub mod peep;
pub mod save;
pub mod terrain;
pub mod unit;

#[cfg(test)]
mod test_util;

pub use action::{SNIPE_ACTION, SnipeAction, UnitAction};
pub use ai::Ai;
pub use cell::{Cell, Fixture, FixtureId};
pub use config::{CombatConfig, FloorConfig};
pub use error::{ActionError, SaveError};
pub use event::{EventCursor, EventLog, FloorEvent};
pub use floor::{Floor, Outcome};
pub use item::{Effect, Item, ItemType};
pub use mapgen::{MapGen, generate_floor};
pub use peep::{Peep, default_roster};
pub use save::{CellSave, FloorSave, ItemSave, PeepSave, UnitSave};
pub use terrain::{Biome, Block};
pub use unit::{Team, Unit, UnitId, UnitView};
