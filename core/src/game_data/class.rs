//! EverQuest player classes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    Bard,
    Beastlord,
    Berserker,
    Cleric,
    Druid,
    Enchanter,
    Magician,
    Monk,
    Necromancer,
    Paladin,
    Ranger,
    Rogue,
    ShadowKnight,
    Shaman,
    Warrior,
    Wizard,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 16] = [
        PlayerClass::Bard,
        PlayerClass::Beastlord,
        PlayerClass::Berserker,
        PlayerClass::Cleric,
        PlayerClass::Druid,
        PlayerClass::Enchanter,
        PlayerClass::Magician,
        PlayerClass::Monk,
        PlayerClass::Necromancer,
        PlayerClass::Paladin,
        PlayerClass::Ranger,
        PlayerClass::Rogue,
        PlayerClass::ShadowKnight,
        PlayerClass::Shaman,
        PlayerClass::Warrior,
        PlayerClass::Wizard,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            PlayerClass::Bard => "Bard",
            PlayerClass::Beastlord => "Beastlord",
            PlayerClass::Berserker => "Berserker",
            PlayerClass::Cleric => "Cleric",
            PlayerClass::Druid => "Druid",
            PlayerClass::Enchanter => "Enchanter",
            PlayerClass::Magician => "Magician",
            PlayerClass::Monk => "Monk",
            PlayerClass::Necromancer => "Necromancer",
            PlayerClass::Paladin => "Paladin",
            PlayerClass::Ranger => "Ranger",
            PlayerClass::Rogue => "Rogue",
            PlayerClass::ShadowKnight => "Shadow Knight",
            PlayerClass::Shaman => "Shaman",
            PlayerClass::Warrior => "Warrior",
            PlayerClass::Wizard => "Wizard",
        }
    }

    /// Parse a class name as printed by `/who` ("Shadow Knight", "Magician").
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(name.trim()))
    }
}
