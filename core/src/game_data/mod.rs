mod class;
mod tables;

pub use class::PlayerClass;
pub use tables::*;

/// Sentinel names used where the log omits a participant.
pub mod labels {
    /// Local player when no name has been configured.
    pub const YOU: &str = "You";
    /// Attacker of a damage shield hit whose owner the log doesn't name.
    pub const RS: &str = "Rs";
    /// Attacker of non-melee damage with no source at all.
    pub const UNK: &str = "Unk";
    /// Item name used for currency loot (quantity is in copper).
    pub const CURRENCY: &str = "Currency";
}

/// Spells at or above this level are NPC-only.
pub const NPC_SPELL_LEVEL: u16 = 255;
