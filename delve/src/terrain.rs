//! Terrain flags and biomes.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// A terrain flag carried by a cell. A cell may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Block {
    Floor,
    Wall,
    UpStair,
    DownStair,
    PlayerSpawn,
    EnemySpawn,
}

impl Block {
    /// Character representation of the flag.
    pub fn rune(self) -> char {
        match self {
            Block::Floor => '.',
            Block::Wall => '#',
            Block::UpStair => '<',
            Block::DownStair => '>',
            Block::PlayerSpawn => 'p',
            Block::EnemySpawn => 'e',
        }
    }
}

/// The visual and generation theme of a floor. Serialized as an integer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum Biome {
    #[default]
    Cave = 0,
    Crypt = 1,
    Grove = 2,
}

impl Biome {
    pub const ALL: [Biome; 3] = [Biome::Cave, Biome::Crypt, Biome::Grove];

    /// Probability that an undecided cell becomes a wall.
    pub fn wall_chance(self) -> f64 {
        match self {
            Biome::Cave => 0.15,
            Biome::Crypt => 0.10,
            Biome::Grove => 0.05,
        }
    }

    /// Enemy kinds that live in this biome.
    pub fn monsters(self) -> &'static [&'static str] {
        match self {
            Biome::Cave => &["slime", "bat", "goblin"],
            Biome::Crypt => &["skeleton", "bat", "wraith"],
            Biome::Grove => &["wolf", "goblin", "slime"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Cave => "cave",
            Biome::Crypt => "crypt",
            Biome::Grove => "grove",
        }
    }
}
