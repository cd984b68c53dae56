//! Item values carried in inventories and placed in cells.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Potion,
    Scroll,
    Weapon,
    Consumable,
}

/// What a consumable does when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    Healing,
    Teleport,
}

/// An item. Only identity and the effect matter to the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_id: Option<Effect>,
}

impl Item {
    pub fn new(id: &str, name: &str, item_type: ItemType, effect_id: Option<Effect>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            item_type,
            effect_id,
        }
    }

    pub fn healing_potion() -> Self {
        Self::new("healing-potion", "healing potion", ItemType::Potion, Some(Effect::Healing))
    }

    pub fn teleport_scroll() -> Self {
        Self::new("teleport-scroll", "teleport scroll", ItemType::Scroll, Some(Effect::Teleport))
    }

    pub fn sword() -> Self {
        Self::new("sword", "sword", ItemType::Weapon, None)
    }

    pub fn bow() -> Self {
        Self::new("bow", "bow", ItemType::Weapon, None)
    }

    /// Attack reach granted by a weapon, `None` for non-weapons.
    pub fn weapon_range(&self) -> Option<i32> {
        match (self.item_type, self.id.as_str()) {
            (ItemType::Weapon, "bow") => Some(3),
            (ItemType::Weapon, _) => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
