use crate::context::SpellBookError;
use crate::game_data::{NPC_SPELL_LEVEL, PlayerClass, ResistType};
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// One catalog entry. Only the fields the classifiers consult are modeled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellDefinition {
    pub name: String,
    pub level: u16,
    pub resist: Option<ResistType>,
    /// Direct damage that can also tick (reported as bane damage).
    pub is_bane: bool,
    pub is_proc: bool,
    pub is_beneficial: bool,
    /// Only lands on pets; seeing it land proves the target is a pet.
    pub pet_only: bool,
    /// Classes able to cast it. A single entry is a class hint for the caster.
    pub classes: Vec<PlayerClass>,
    /// Message when the spell lands on the local player.
    pub lands_on_you: Option<String>,
    /// Message following the target's name when it lands on someone else.
    pub lands_on_other: Option<String>,
    pub wear_off: Option<String>,
    /// Name only used by older emulated servers.
    pub legacy: bool,
}

impl SpellDefinition {
    pub fn new(name: impl Into<String>, level: u16) -> Self {
        Self {
            name: name.into(),
            level,
            ..Default::default()
        }
    }

    pub fn is_npc_only(&self) -> bool {
        self.level >= NPC_SPELL_LEVEL
    }

    /// Class hint carried by a spell castable by exactly one class.
    pub fn single_class(&self) -> Option<PlayerClass> {
        match self.classes.as_slice() {
            [class] => Some(*class),
            _ => None,
        }
    }
}

/// Outcome of a catalog lookup. Identical log text can belong to several
/// spells; the candidates travel with the record until a consumer has enough
/// context to pick one.
#[derive(Debug, Clone, PartialEq)]
pub enum SpellResolution {
    Unique(Arc<SpellDefinition>),
    Ambiguous(Vec<Arc<SpellDefinition>>),
}

impl SpellResolution {
    pub fn from_candidates(mut candidates: Vec<Arc<SpellDefinition>>) -> Option<Self> {
        match candidates.len() {
            0 => None,
            1 => candidates.pop().map(SpellResolution::Unique),
            _ => Some(SpellResolution::Ambiguous(candidates)),
        }
    }

    pub fn unique(&self) -> Option<&SpellDefinition> {
        match self {
            SpellResolution::Unique(spell) => Some(spell),
            SpellResolution::Ambiguous(_) => None,
        }
    }

    pub fn candidates(&self) -> &[Arc<SpellDefinition>] {
        match self {
            SpellResolution::Unique(spell) => std::slice::from_ref(spell),
            SpellResolution::Ambiguous(spells) => spells,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, SpellResolution::Ambiguous(_))
    }
}

/// Spell lookups used during classification.
pub trait SpellCatalog: Send + Sync {
    fn by_name(&self, name: &str) -> Option<Arc<SpellDefinition>>;
    /// Lookup by name with the rank suffix removed ("Claw of Frost Rk. II").
    fn by_abbreviation(&self, name: &str) -> Option<Arc<SpellDefinition>>;
    fn lands_on_you(&self, text: &str) -> Option<SpellResolution>;
    fn lands_on_other(&self, text: &str) -> Option<SpellResolution>;
    fn wear_off(&self, text: &str) -> Option<SpellResolution>;
    fn is_legacy_spell(&self, name: &str) -> bool;

    fn resolve(&self, name: &str) -> Option<SpellResolution> {
        self.by_name(name)
            .or_else(|| self.by_abbreviation(&abbreviate(name)))
            .map(SpellResolution::Unique)
    }
}

const ROMAN_NUMERALS: [&str; 20] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
    "XVI", "XVII", "XVIII", "XIX", "XX",
];

/// Strip rank and roman-numeral suffixes from a spell name.
pub fn abbreviate(name: &str) -> String {
    let mut name = name.trim_end_matches('.').trim();
    if let Some(pos) = name.find(" Rk.") {
        name = &name[..pos];
    }
    if let Some((head, last)) = name.rsplit_once(' ')
        && ROMAN_NUMERALS.contains(&last)
    {
        name = head;
    }
    name.to_string()
}

#[derive(Debug, Default, Deserialize)]
struct SpellBookFile {
    #[serde(default)]
    spells: Vec<SpellDefinition>,
}

/// In-memory [`SpellCatalog`] with exact-text indexes.
#[derive(Debug, Default)]
pub struct SpellBook {
    by_name: HashMap<String, Arc<SpellDefinition>>,
    by_abbreviation: HashMap<String, Arc<SpellDefinition>>,
    lands_on_you: HashMap<String, Vec<Arc<SpellDefinition>>>,
    lands_on_other: HashMap<String, Vec<Arc<SpellDefinition>>>,
    wear_off: HashMap<String, Vec<Arc<SpellDefinition>>>,
    legacy: HashSet<String>,
}

impl SpellBook {
    pub fn new(spells: impl IntoIterator<Item = SpellDefinition>) -> Self {
        let mut book = Self::default();
        for spell in spells {
            book.insert(spell);
        }
        book
    }

    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        let file: SpellBookFile = toml::from_str(source)?;
        Ok(Self::new(file.spells))
    }

    pub fn load(path: &Path) -> Result<Self, SpellBookError> {
        let source = std::fs::read_to_string(path).map_err(|source| SpellBookError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let book = Self::from_toml_str(&source).map_err(|source| SpellBookError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), spells = book.len(), "spell book loaded");
        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn insert(&mut self, spell: SpellDefinition) {
        let spell = Arc::new(spell);

        if spell.legacy {
            self.legacy.insert(spell.name.clone());
        }
        if let Some(text) = &spell.lands_on_you {
            self.lands_on_you
                .entry(text.clone())
                .or_default()
                .push(Arc::clone(&spell));
        }
        if let Some(text) = &spell.lands_on_other {
            self.lands_on_other
                .entry(text.clone())
                .or_default()
                .push(Arc::clone(&spell));
        }
        if let Some(text) = &spell.wear_off {
            self.wear_off
                .entry(text.clone())
                .or_default()
                .push(Arc::clone(&spell));
        }

        // highest level rank wins the abbreviation
        let abbrv = abbreviate(&spell.name);
        match self.by_abbreviation.get(&abbrv) {
            Some(existing) if existing.level > spell.level => {}
            _ => {
                self.by_abbreviation.insert(abbrv, Arc::clone(&spell));
            }
        }
        self.by_name.insert(spell.name.clone(), spell);
    }

    fn lookup_text(
        index: &HashMap<String, Vec<Arc<SpellDefinition>>>,
        text: &str,
    ) -> Option<SpellResolution> {
        index
            .get(text)
            .and_then(|spells| SpellResolution::from_candidates(spells.clone()))
    }
}

impl SpellCatalog for SpellBook {
    fn by_name(&self, name: &str) -> Option<Arc<SpellDefinition>> {
        self.by_name.get(name).cloned()
    }

    fn by_abbreviation(&self, name: &str) -> Option<Arc<SpellDefinition>> {
        self.by_abbreviation.get(name).cloned()
    }

    fn lands_on_you(&self, text: &str) -> Option<SpellResolution> {
        Self::lookup_text(&self.lands_on_you, text)
    }

    fn lands_on_other(&self, text: &str) -> Option<SpellResolution> {
        Self::lookup_text(&self.lands_on_other, text)
    }

    fn wear_off(&self, text: &str) -> Option<SpellResolution> {
        Self::lookup_text(&self.wear_off, text)
    }

    fn is_legacy_spell(&self, name: &str) -> bool {
        self.legacy.contains(name)
    }
}
