pub mod combat_log;
pub mod context;
pub mod game_data;
pub mod registry;
pub mod state;
pub mod summary;

// Re-exports for convenience
pub use combat_log::*;
pub use context::{IStr, ParserConfig, ParserConfigExt, intern, resolve};
pub use game_data::{PlayerClass, ResistType};
pub use registry::{
    IdentityRegistry, PlayerRegistry, SpellBook, SpellCatalog, SpellDefinition, SpellResolution,
};
pub use state::CrossLineState;
pub use summary::{LogSummary, NameTotal, SummaryReport};
