use crate::context::IStr;
use crate::game_data::ResistType;
use crate::registry::SpellResolution;
use std::ops::{BitOr, BitOrAssign};

/// One classified line. `timestamp` is seconds since the epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub line_number: u64,
    pub timestamp: f64,
    pub record: ClassifiedRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedRecord {
    Damage(DamageRecord),
    Heal(HealRecord),
    SpellCast(SpellCastRecord),
    ReceivedSpell(ReceivedSpellRecord),
    Death(DeathRecord),
    Loot(LootRecord),
    Taunt(TauntRecord),
    Resist(ResistRecord),
    MezBreak(MezBreakRecord),
    Zone(ZoneRecord),
    Rolled(RollRecord),
    Chat(ChatRecord),
    Special(SpecialRecord),
}

impl ClassifiedRecord {
    /// Short variant name, used for tallies and debug output.
    pub const fn kind(&self) -> &'static str {
        match self {
            ClassifiedRecord::Damage(_) => "Damage",
            ClassifiedRecord::Heal(_) => "Heal",
            ClassifiedRecord::SpellCast(_) => "SpellCast",
            ClassifiedRecord::ReceivedSpell(_) => "ReceivedSpell",
            ClassifiedRecord::Death(_) => "Death",
            ClassifiedRecord::Loot(_) => "Loot",
            ClassifiedRecord::Taunt(_) => "Taunt",
            ClassifiedRecord::Resist(_) => "Resist",
            ClassifiedRecord::MezBreak(_) => "MezBreak",
            ClassifiedRecord::Zone(_) => "Zone",
            ClassifiedRecord::Rolled(_) => "Rolled",
            ClassifiedRecord::Chat(_) => "Chat",
            ClassifiedRecord::Special(_) => "Special",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Damage
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageType {
    Melee,
    /// Damage shield
    Ds,
    Bane,
    /// Direct damage spell
    Dd,
    Dot,
    Proc,
    OtherDmg,
    Miss,
    Block,
    Dodge,
    Parry,
    Invulnerable,
    Riposte,
    Absorb,
}

impl DamageType {
    /// True for the avoided-hit types (always zero damage).
    pub const fn is_miss(&self) -> bool {
        matches!(
            self,
            DamageType::Miss
                | DamageType::Block
                | DamageType::Dodge
                | DamageType::Parry
                | DamageType::Invulnerable
                | DamageType::Riposte
                | DamageType::Absorb
        )
    }
}

/// Attacker and defender are uppercased name keys; sentinel labels
/// (`Rs`, `Unk`, a spell name standing in for an absent attacker) are kept
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageRecord {
    pub attacker: IStr,
    pub attacker_owner: Option<IStr>,
    pub defender: IStr,
    pub defender_owner: Option<IStr>,
    pub total: u64,
    pub damage_type: DamageType,
    /// Uppercased verb for melee and misses, spell name for spell damage.
    pub sub_type: IStr,
    pub resist: Option<ResistType>,
    pub modifiers: ModifierMask,
    pub spell: Option<SpellResolution>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Modifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Bit set of the trailing "(Critical Strikethrough)" annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierMask(u16);

impl ModifierMask {
    pub const NONE: ModifierMask = ModifierMask(0);
    pub const CRIT: ModifierMask = ModifierMask(1);
    pub const TWINCAST: ModifierMask = ModifierMask(1 << 1);
    pub const LUCKY: ModifierMask = ModifierMask(1 << 2);
    pub const RAMPAGE: ModifierMask = ModifierMask(1 << 3);
    pub const STRIKETHROUGH: ModifierMask = ModifierMask(1 << 4);
    pub const RIPOSTE: ModifierMask = ModifierMask(1 << 5);
    pub const ASSASSINATE: ModifierMask = ModifierMask(1 << 6);
    pub const HEADSHOT: ModifierMask = ModifierMask(1 << 7);
    pub const SLAY_UNDEAD: ModifierMask = ModifierMask(1 << 8);
    pub const DOUBLE_BOW_SHOT: ModifierMask = ModifierMask(1 << 9);
    pub const FLURRY: ModifierMask = ModifierMask(1 << 10);
    pub const FINISHING_BLOW: ModifierMask = ModifierMask(1 << 11);

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn from_bits(bits: u16) -> Self {
        ModifierMask(bits)
    }

    pub const fn contains(self, other: ModifierMask) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_crit(self) -> bool {
        self.contains(Self::CRIT)
    }

    pub const fn is_twincast(self) -> bool {
        self.contains(Self::TWINCAST)
    }

    pub const fn is_lucky(self) -> bool {
        self.contains(Self::LUCKY)
    }

    pub const fn is_rampage(self) -> bool {
        self.contains(Self::RAMPAGE)
    }

    pub const fn is_strikethrough(self) -> bool {
        self.contains(Self::STRIKETHROUGH)
    }

    /// A riposte that was struck through doesn't count as a riposte.
    pub const fn is_riposte(self) -> bool {
        self.contains(Self::RIPOSTE) && !self.contains(Self::STRIKETHROUGH)
    }

    pub const fn is_assassinate(self) -> bool {
        self.contains(Self::ASSASSINATE)
    }

    pub const fn is_headshot(self) -> bool {
        self.contains(Self::HEADSHOT)
    }

    pub const fn is_slay_undead(self) -> bool {
        self.contains(Self::SLAY_UNDEAD)
    }

    pub const fn is_double_bow_shot(self) -> bool {
        self.contains(Self::DOUBLE_BOW_SHOT)
    }

    pub const fn is_flurry(self) -> bool {
        self.contains(Self::FLURRY)
    }

    pub const fn is_finishing_blow(self) -> bool {
        self.contains(Self::FINISHING_BLOW)
    }
}

impl BitOr for ModifierMask {
    type Output = ModifierMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        ModifierMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Healing and Spells
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealType {
    Heal,
    Hot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealRecord {
    pub healer: IStr,
    pub healed: IStr,
    pub total: u64,
    /// Full heal amount including overheal; equals `total` when not logged.
    pub over_total: u64,
    pub heal_type: HealType,
    /// Spell name when the line names one.
    pub sub_type: Option<IStr>,
    pub modifiers: ModifierMask,
    pub spell: Option<SpellResolution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    Cast,
    Sing,
    Activate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpellCastRecord {
    pub caster: IStr,
    pub spell: IStr,
    pub kind: CastKind,
    pub interrupted: bool,
    pub resolution: Option<SpellResolution>,
}

/// A spell landing on (or wearing off) someone. Lines matched through their
/// landing text carry no name, only the candidate set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedSpellRecord {
    pub receiver: IStr,
    pub spell: Option<IStr>,
    pub resolution: Option<SpellResolution>,
    pub wore_off: bool,
}

/// Self-only ability keyed by a one-character code.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialRecord {
    pub player: IStr,
    pub code: char,
    pub spell: IStr,
}

// ─────────────────────────────────────────────────────────────────────────────
// Encounter Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DeathRecord {
    pub slain: IStr,
    pub slain_owner: Option<IStr>,
    pub killer: IStr,
    pub killer_owner: Option<IStr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TauntRecord {
    pub taunter: IStr,
    pub npc: IStr,
    pub success: bool,
    pub improved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResistKind {
    Resisted,
    Reflected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResistRecord {
    pub attacker: IStr,
    pub defender: IStr,
    pub spell: IStr,
    pub kind: ResistKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MezBreakRecord {
    pub breaker: IStr,
    pub awakened: IStr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRecord {
    pub zone: IStr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollRecord {
    pub player: IStr,
    pub max: u32,
    pub rolled: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Loot
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LootSource {
    Corpse(IStr),
    Split,
    WonRoll { roll: u32 },
    Given,
    Unknown,
}

/// Currency loot uses the `Currency` item with the quantity in copper.
#[derive(Debug, Clone, PartialEq)]
pub struct LootRecord {
    pub looter: IStr,
    pub item: IStr,
    pub quantity: u64,
    pub source: LootSource,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatChannel {
    Say,
    Tell,
    Shout,
    Ooc,
    Auction,
    Guild,
    Group,
    Raid,
    Fellowship,
    /// Named custom channel ("general:1" is stored as "general").
    Custom(IStr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRecord {
    pub channel: ChatChannel,
    pub sender: IStr,
    pub receiver: Option<IStr>,
    pub text: String,
}
