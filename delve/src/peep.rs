//! Persistent character identities and the kind table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ability key granting the snipe action.
pub const SNIPE: &str = "snipe";

/// A character identity that outlives any single floor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Peep {
    pub id: String,
    pub name: String,
    pub kind_id: String,
    pub level: u32,
    pub ability_levels: BTreeMap<String, u32>,
}

impl Peep {
    pub fn new(id: &str, name: &str, kind_id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind_id: kind_id.to_string(),
            level: 1,
            ability_levels: BTreeMap::new(),
        }
    }

    /// Builder-style ability grant.
    pub fn with_ability(mut self, ability: &str, level: u32) -> Self {
        self.ability_levels.insert(ability.to_string(), level);
        self
    }

    /// Tile reference used by presentation.
    pub fn tile(&self) -> &str {
        &self.kind_id
    }

    pub fn ability_level(&self, ability: &str) -> u32 {
        self.ability_levels.get(ability).copied().unwrap_or(0)
    }

    /// A numbered monster identity of the given kind.
    pub fn monster(kind_id: &str, n: usize) -> Self {
        let name = kind_data(kind_id).map_or(kind_id, |d| d.name);
        Self::new(&format!("{kind_id}-{n}"), name, kind_id)
    }
}

/// Base stats for a character or monster kind.
pub struct KindData {
    pub kind_id: &'static str,
    pub name: &'static str,
    pub health: i32,
    pub move_range: i32,
}

/// Static table of kind definitions.
pub const KIND_DATA: &[KindData] = &[
    KindData {
        kind_id: "knight",
        name: "knight",
        health: 12,
        move_range: 3,
    },
    KindData {
        kind_id: "rogue",
        name: "rogue",
        health: 8,
        move_range: 5,
    },
    KindData {
        kind_id: "archer",
        name: "archer",
        health: 9,
        move_range: 4,
    },
    KindData {
        kind_id: "slime",
        name: "slime",
        health: 6,
        move_range: 2,
    },
    KindData {
        kind_id: "bat",
        name: "cave bat",
        health: 3,
        move_range: 5,
    },
    KindData {
        kind_id: "goblin",
        name: "goblin",
        health: 7,
        move_range: 3,
    },
    KindData {
        kind_id: "skeleton",
        name: "skeleton",
        health: 8,
        move_range: 3,
    },
    KindData {
        kind_id: "wraith",
        name: "wraith",
        health: 5,
        move_range: 4,
    },
    KindData {
        kind_id: "wolf",
        name: "grey wolf",
        health: 6,
        move_range: 5,
    },
];

/// Look up the table entry for a kind.
pub fn kind_data(kind_id: &str) -> Option<&'static KindData> {
    KIND_DATA.iter().find(|d| d.kind_id == kind_id)
}

/// The default adventuring party.
pub fn default_roster() -> Vec<Peep> {
    vec![
        Peep::new("ayla", "Ayla", "knight"),
        Peep::new("bram", "Bram", "rogue"),
        Peep::new("cass", "Cass", "archer").with_ability(SNIPE, 1),
    ]
}
