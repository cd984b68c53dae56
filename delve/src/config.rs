//! Balance and layout constants.
//!
//! [`FloorConfig`] carries every tunable number the simulation reads. Its
//! `Default` is the shipped balance; hosts may deserialize overrides from
//! JSON (missing fields keep their defaults).

use serde::{Deserialize, Serialize};

/// Damage dealt by a basic attack.
pub const ATTACK_DAMAGE: i32 = 4;
/// Damage dealt by the snipe ability.
pub const SNIPE_DAMAGE: i32 = 2;
/// Maximum Manhattan distance for the snipe ability.
pub const SNIPE_RANGE: i32 = 4;
/// Health restored by a healing consumable.
pub const HEAL_AMOUNT: i32 = 5;
/// Enemy spawn cells placed by map generation.
pub const ENEMY_SPAWN_COUNT: usize = 4;
/// Move range used when nothing else specifies one.
pub const DEFAULT_MOVE_RANGE: i32 = 4;
/// Health used when nothing else specifies one.
pub const DEFAULT_HEALTH: i32 = 10;

pub const DEFAULT_WIDTH: i32 = 10;
pub const DEFAULT_HEIGHT: i32 = 8;

/// Combat balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CombatConfig {
    pub attack_damage: i32,
    pub snipe_damage: i32,
    pub snipe_range: i32,
    pub heal_amount: i32,
    /// When set, attacks reach up to the attacker's weapon range along a
    /// clear line of sight instead of adjacent cells only.
    pub ranged_attacks: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_damage: ATTACK_DAMAGE,
            snipe_damage: SNIPE_DAMAGE,
            snipe_range: SNIPE_RANGE,
            heal_amount: HEAL_AMOUNT,
            ranged_attacks: false,
        }
    }
}

/// Floor layout and unit defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FloorConfig {
    pub width: i32,
    pub height: i32,
    pub enemy_spawns: usize,
    pub default_move_range: i32,
    pub default_health: i32,
    pub combat: CombatConfig,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            enemy_spawns: ENEMY_SPAWN_COUNT,
            default_move_range: DEFAULT_MOVE_RANGE,
            default_health: DEFAULT_HEALTH,
            combat: CombatConfig::default(),
        }
    }
}
