use crate::game_data::PlayerClass;
use hashbrown::{HashMap, HashSet};
use std::sync::RwLock;

/// Longest name the game allows for a player character.
const MAX_PLAYER_NAME: usize = 15;
const MIN_PLAYER_NAME: usize = 3;

/// Heuristic for names that could belong to a player: a single capitalized
/// word of letters within the game's length limits.
pub fn is_possible_player_name(name: &str) -> bool {
    let len = name.len();
    if !(MIN_PLAYER_NAME..=MAX_PLAYER_NAME).contains(&len) {
        return false;
    }
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphabetic())
}

/// Player and pet identity store.
///
/// Classifiers call the predicates on every line and the upserts whenever a
/// line proves something about a name, so implementations must tolerate
/// concurrent reads with occasional inserts. Names compare case-insensitively.
pub trait IdentityRegistry: Send + Sync {
    fn is_verified_player(&self, name: &str) -> bool;
    fn is_verified_pet(&self, name: &str) -> bool;
    fn pet_owner(&self, pet: &str) -> Option<String>;
    fn player_class(&self, name: &str) -> Option<PlayerClass>;

    fn add_verified_player(&self, name: &str);
    fn add_verified_pet(&self, name: &str);
    fn set_pet_owner(&self, pet: &str, owner: &str);
    fn set_player_class(&self, name: &str, class: PlayerClass);
    fn set_player_level(&self, _name: &str, _level: u16) {}

    fn is_possible_player_name(&self, name: &str) -> bool {
        is_possible_player_name(name)
    }
}

#[derive(Debug, Default)]
struct Identities {
    players: HashSet<String>,
    pets: HashSet<String>,
    owners: HashMap<String, String>,
    classes: HashMap<String, PlayerClass>,
    levels: HashMap<String, u16>,
}

/// In-memory [`IdentityRegistry`].
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    inner: RwLock<Identities>,
}

fn key(name: &str) -> String {
    name.to_uppercase()
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_level(&self, name: &str) -> Option<u16> {
        self.inner
            .read()
            .ok()
            .and_then(|ids| ids.levels.get(&key(name)).copied())
    }

    pub fn player_count(&self) -> usize {
        self.inner.read().map(|ids| ids.players.len()).unwrap_or(0)
    }

    pub fn pet_count(&self) -> usize {
        self.inner.read().map(|ids| ids.pets.len()).unwrap_or(0)
    }

    fn read<T>(&self, f: impl FnOnce(&Identities) -> T) -> Option<T> {
        self.inner.read().ok().map(|ids| f(&ids))
    }

    fn write(&self, f: impl FnOnce(&mut Identities)) {
        if let Ok(mut ids) = self.inner.write() {
            f(&mut ids);
        }
    }
}

impl IdentityRegistry for PlayerRegistry {
    fn is_verified_player(&self, name: &str) -> bool {
        let k = key(name);
        self.read(|ids| ids.players.contains(&k)).unwrap_or(false)
    }

    fn is_verified_pet(&self, name: &str) -> bool {
        let k = key(name);
        self.read(|ids| ids.pets.contains(&k)).unwrap_or(false)
    }

    fn pet_owner(&self, pet: &str) -> Option<String> {
        let k = key(pet);
        self.read(|ids| ids.owners.get(&k).cloned()).flatten()
    }

    fn player_class(&self, name: &str) -> Option<PlayerClass> {
        let k = key(name);
        self.read(|ids| ids.classes.get(&k).copied()).flatten()
    }

    fn add_verified_player(&self, name: &str) {
        let k = key(name);
        if self.is_verified_player(&k) {
            return;
        }
        self.write(|ids| {
            // a name proven to be a player can't also be a pet
            ids.pets.remove(&k);
            ids.players.insert(k);
        });
    }

    fn add_verified_pet(&self, name: &str) {
        let k = key(name);
        if self.is_verified_pet(&k) {
            return;
        }
        self.write(|ids| {
            if !ids.players.contains(&k) {
                ids.pets.insert(k);
            }
        });
    }

    fn set_pet_owner(&self, pet: &str, owner: &str) {
        let (pet, owner) = (key(pet), owner.to_string());
        self.write(|ids| {
            ids.owners.insert(pet, owner);
        });
    }

    fn set_player_class(&self, name: &str, class: PlayerClass) {
        let k = key(name);
        self.write(|ids| {
            ids.classes.insert(k, class);
        });
    }

    fn set_player_level(&self, name: &str, level: u16) {
        let k = key(name);
        self.write(|ids| {
            ids.levels.insert(k, level);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_possible_player_name() {
        assert!(is_possible_player_name("Kazint"));
        assert!(!is_possible_player_name("kazint"));
        assert!(!is_possible_player_name("a goblin"));
        assert!(!is_possible_player_name("Kazint`s pet"));
        assert!(!is_possible_player_name("Xi"));
        assert!(!is_possible_player_name("Abcdefghijklmnop"));
    }

    #[test]
    fn test_registry_is_case_insensitive() {
        let registry = PlayerRegistry::new();
        registry.add_verified_player("Kazint");
        assert!(registry.is_verified_player("KAZINT"));
        assert!(registry.is_verified_player("kazint"));
        assert_eq!(registry.player_count(), 1);
    }

    #[test]
    fn test_player_wins_over_pet() {
        let registry = PlayerRegistry::new();
        registry.add_verified_pet("Gobarn");
        registry.add_verified_player("Gobarn");
        assert!(!registry.is_verified_pet("Gobarn"));

        registry.add_verified_pet("Gobarn");
        assert!(!registry.is_verified_pet("Gobarn"));
    }

    #[test]
    fn test_pet_owner_and_class() {
        let registry = PlayerRegistry::new();
        registry.set_pet_owner("Gobarn", "Kazint");
        registry.set_player_class("Kazint", PlayerClass::Magician);
        registry.set_player_level("Kazint", 120);
        assert_eq!(registry.pet_owner("gobarn").as_deref(), Some("Kazint"));
        assert_eq!(registry.player_class("Kazint"), Some(PlayerClass::Magician));
        assert_eq!(registry.player_level("Kazint"), Some(120));
    }
}
