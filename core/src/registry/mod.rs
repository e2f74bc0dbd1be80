//! Collaborators the classifiers query and update.
//!
//! Both are traits so the engine can run against fakes in tests and against
//! application-owned stores in production.

mod identity;
mod spells;

pub use identity::{IdentityRegistry, PlayerRegistry, is_possible_player_name};
pub use spells::{SpellBook, SpellCatalog, SpellDefinition, SpellResolution, abbreviate};
