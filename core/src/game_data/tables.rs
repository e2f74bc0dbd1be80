//! Fixed vocabularies used by the line classifiers.

use phf::{phf_map, phf_set};

// ─────────────────────────────────────────────────────────────────────────────
// Melee Verbs
// ─────────────────────────────────────────────────────────────────────────────

/// Base verb form ("You crush") to third person ("Kazint crushes").
pub static HIT_VERBS: phf::Map<&'static str, &'static str> = phf_map! {
    "backstab" => "backstabs",
    "bash" => "bashes",
    "bite" => "bites",
    "bludgeon" => "bludgeons",
    "claw" => "claws",
    "crush" => "crushes",
    "frenzy" => "frenzies",
    "gore" => "gores",
    "hit" => "hits",
    "kick" => "kicks",
    "maul" => "mauls",
    "pierce" => "pierces",
    "punch" => "punches",
    "rend" => "rends",
    "shoot" => "shoots",
    "slam" => "slams",
    "slash" => "slashes",
    "slice" => "slices",
    "smash" => "smashes",
    "sting" => "stings",
    "strike" => "strikes",
    "sweep" => "sweeps",
};

/// Third person verb back to its base form.
pub static HIT_VERBS_THIRD: phf::Map<&'static str, &'static str> = phf_map! {
    "backstabs" => "backstab",
    "bashes" => "bash",
    "bites" => "bite",
    "bludgeons" => "bludgeon",
    "claws" => "claw",
    "crushes" => "crush",
    "frenzies" => "frenzy",
    "gores" => "gore",
    "hits" => "hit",
    "kicks" => "kick",
    "mauls" => "maul",
    "pierces" => "pierce",
    "punches" => "punch",
    "rends" => "rend",
    "shoots" => "shoot",
    "slams" => "slam",
    "slashes" => "slash",
    "slices" => "slice",
    "smashes" => "smash",
    "stings" => "sting",
    "strikes" => "strike",
    "sweeps" => "sweep",
};

/// Third person form of a melee verb in either form, if it is one.
pub fn hit_verb_third_person(token: &str) -> Option<&'static str> {
    HIT_VERBS
        .get(token)
        .copied()
        .or_else(|| HIT_VERBS_THIRD.get_key(token).copied())
}

// ─────────────────────────────────────────────────────────────────────────────
// Resists
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ResistType {
    Chromatic,
    Cold,
    Corruption,
    Disease,
    Fire,
    Magic,
    Physical,
    Poison,
    Prismatic,
    Unresistable,
}

pub static RESIST_WORDS: phf::Map<&'static str, ResistType> = phf_map! {
    "chromatic" => ResistType::Chromatic,
    "cold" => ResistType::Cold,
    "corruption" => ResistType::Corruption,
    "disease" => ResistType::Disease,
    "fire" => ResistType::Fire,
    "magic" => ResistType::Magic,
    "physical" => ResistType::Physical,
    "poison" => ResistType::Poison,
    "prismatic" => ResistType::Prismatic,
    "unresistable" => ResistType::Unresistable,
};

// ─────────────────────────────────────────────────────────────────────────────
// Currency
// ─────────────────────────────────────────────────────────────────────────────

/// Denomination value in copper.
pub static CURRENCY_RATES: phf::Map<&'static str, u64> = phf_map! {
    "platinum" => 1000,
    "gold" => 100,
    "silver" => 10,
    "copper" => 1,
};

// ─────────────────────────────────────────────────────────────────────────────
// Names
// ─────────────────────────────────────────────────────────────────────────────

/// Possessive suffixes that name an owned entity ("Kazint`s pet").
pub const OWNER_SUFFIXES: [&str; 6] = [
    "`s pet",
    "`s warder",
    "`s Mount",
    "`s mount",
    "`s ward",
    "`s familiar",
];

/// Corpse suffixes stripped from participant names.
pub const CORPSE_SUFFIXES: [&str; 3] = ["'s corpse", "`s corpse", "'s Corpse"];

/// Defenders whose hits never feed class hints. Records are still emitted.
pub static HINTLESS_DEFENDERS: phf::Set<&'static str> = phf_set! {
    "combat dummy",
    "sparring dummy",
    "a practice dummy",
    "a training dummy",
};

/// World-event containers. Damage against these is not combat and is dropped.
pub const EXCLUDED_DEFENDER_SUFFIXES: [&str; 2] = [" chest", " cache"];

/// Self-only abilities that the log never shows for other casters.
pub static SPECIAL_CODES: phf::Map<&'static str, char> = phf_map! {
    "Glyph of Destruction" => 'G',
    "Glyph of Dragon Scales" => 'D',
    "Glyph of Arcane Secrets" => 'A',
    "Intensity of the Resolute" => '7',
    "Staunch Recovery" => '6',
    "Fundament: Second Spire of Arcanum" => 'S',
};
