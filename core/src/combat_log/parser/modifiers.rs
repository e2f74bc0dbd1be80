use crate::combat_log::record::ModifierMask;
use crate::game_data::PlayerClass;
use crate::registry::IdentityRegistry;
use hashbrown::HashMap;
use phf::phf_map;
use std::sync::RwLock;

/// Longest modifier name in words ("Double Bow Shot").
const MAX_PHRASE_WORDS: usize = 3;

struct ModifierName {
    mask: ModifierMask,
    /// Implies a critical hit on top of its own bit.
    grants_crit: bool,
    /// Only one class can produce this modifier.
    class_hint: Option<PlayerClass>,
}

const fn plain(mask: ModifierMask) -> ModifierName {
    ModifierName {
        mask,
        grants_crit: false,
        class_hint: None,
    }
}

const fn crit(mask: ModifierMask) -> ModifierName {
    ModifierName {
        mask,
        grants_crit: true,
        class_hint: None,
    }
}

const fn hint(mask: ModifierMask, class: PlayerClass) -> ModifierName {
    ModifierName {
        mask,
        grants_crit: false,
        class_hint: Some(class),
    }
}

static MODIFIER_NAMES: phf::Map<&'static str, ModifierName> = phf_map! {
    "Assassinate" => hint(ModifierMask::ASSASSINATE, PlayerClass::Rogue),
    "Crippling Blow" => crit(ModifierMask::CRIT),
    "Critical" => crit(ModifierMask::CRIT),
    "Deadly Strike" => crit(ModifierMask::CRIT),
    "Double Bow Shot" => hint(ModifierMask::DOUBLE_BOW_SHOT, PlayerClass::Ranger),
    "Finishing Blow" => crit(ModifierMask::FINISHING_BLOW),
    "Flurry" => plain(ModifierMask::FLURRY),
    "Headshot" => hint(ModifierMask::HEADSHOT, PlayerClass::Ranger),
    "Lucky" => plain(ModifierMask::LUCKY),
    "Rampage" => plain(ModifierMask::RAMPAGE),
    "Riposte" => plain(ModifierMask::RIPOSTE),
    "Slay Undead" => hint(ModifierMask::SLAY_UNDEAD, PlayerClass::Paladin),
    "Strikethrough" => plain(ModifierMask::STRIKETHROUGH),
    "Twincast" => plain(ModifierMask::TWINCAST),
    "Wild Rampage" => plain(ModifierMask::RAMPAGE),
};

/// Parses "(Lucky Critical Headshot)" style annotations into a
/// [`ModifierMask`], memoized by the exact annotation text.
///
/// Class hints are applied only when a text is parsed for the first time;
/// later hits on the cache return the mask without touching the registry.
#[derive(Debug, Default)]
pub struct ModifierParser {
    cache: RwLock<HashMap<String, ModifierMask>>,
}

impl ModifierParser {
    /// `text` is the inside of the parentheses. `player` is the acting name
    /// eligible for a class hint, or None when hints are suppressed.
    pub fn parse(
        &self,
        text: &str,
        player: Option<&str>,
        identity: &dyn IdentityRegistry,
    ) -> ModifierMask {
        if let Ok(cache) = self.cache.read()
            && let Some(mask) = cache.get(text)
        {
            return *mask;
        }

        let mask = Self::build(text, player, identity);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(text.to_string(), mask);
        }
        mask
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    fn build(text: &str, player: Option<&str>, identity: &dyn IdentityRegistry) -> ModifierMask {
        let mut mask = ModifierMask::NONE;
        let mut phrase: Vec<&str> = Vec::with_capacity(MAX_PHRASE_WORDS);

        for word in text.split(' ').filter(|w| !w.is_empty()) {
            phrase.push(word);

            // longest ending first so "Wild Rampage" beats "Rampage"
            let matched = (0..phrase.len()).find_map(|skip| {
                MODIFIER_NAMES
                    .get(phrase[skip..].join(" ").as_str())
                    .map(|name| (skip, name))
            });

            if let Some((skip, name)) = matched {
                if skip > 0 {
                    tracing::debug!(modifier = %phrase[..skip].join(" "), text, "unknown damage modifier");
                }
                mask |= name.mask;
                if name.grants_crit {
                    mask |= ModifierMask::CRIT;
                }
                if let (Some(class), Some(player)) = (name.class_hint, player)
                    && identity.is_possible_player_name(player)
                {
                    identity.add_verified_player(player);
                    identity.set_player_class(player, class);
                }
                phrase.clear();
            } else if phrase.len() == MAX_PHRASE_WORDS {
                tracing::debug!(modifier = %phrase[0], text, "unknown damage modifier");
                phrase.remove(0);
            }
        }

        if !phrase.is_empty() {
            tracing::debug!(modifier = %phrase.join(" "), text, "unknown damage modifier");
        }
        mask
    }
}
