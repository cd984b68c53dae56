//! Small floors for unit tests.

use tactica_core::Point;

use crate::cell::Cell;
use crate::config::FloorConfig;
use crate::floor::Floor;
use crate::peep::Peep;
use crate::terrain::{Biome, Block};
use crate::unit::{Team, UnitId};

/// A floor from ASCII rows: `#` is a wall, anything else is floor.
pub fn floor_from(rows: &[&str]) -> Floor {
    let cells = rows.iter().enumerate().flat_map(|(y, row)| {
        row.chars().enumerate().map(move |(x, ch)| {
            let block = if ch == '#' { Block::Wall } else { Block::Floor };
            Cell::new(Point::new(x as i32, y as i32), [block], 0.0)
        })
    });
    Floor::new(Biome::Cave, cells, "test", FloorConfig::default())
}

/// Place a default-stat unit without appending events.
pub fn spawn(floor: &mut Floor, team: Team, (x, y): (i32, i32)) -> UnitId {
    let n = floor.units().len();
    let peep = Peep::new(&format!("t{n}"), &format!("T{n}"), "test");
    let id = floor
        .place_unit(peep, team, Some(Point::new(x, y)))
        .expect("test cell is free");
    floor.reset_watch();
    id
}

pub fn spawn_with(floor: &mut Floor, team: Team, at: (i32, i32), move_range: i32) -> UnitId {
    let id = spawn(floor, team, at);
    if let Some(u) = floor.units.iter_mut().find(|u| u.id == id) {
        u.move_range = move_range;
    }
    id
}
