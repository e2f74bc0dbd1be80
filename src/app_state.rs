use eqlog_core::combat_log::LogEvent;
use eqlog_core::context::ParserConfigExt;
use eqlog_core::registry::{PlayerRegistry, SpellBook};
use eqlog_core::summary::SummaryReport;
use eqlog_types::ParserConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the REPL keeps between commands. The identity registry lives
/// for the whole session so names proven in one file help classify the next.
pub struct AppState {
    pub config: ParserConfig,
    pub identity: Arc<PlayerRegistry>,
    pub spells: Arc<SpellBook>,
    pub active_file: Option<PathBuf>,
    pub end_pos: Option<u64>,
    pub events: Vec<LogEvent>,
    pub report: Option<SummaryReport>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(ParserConfig::default())
    }
}

impl AppState {
    /// State from the persisted config, loading its spell book if one is set.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::load())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let spells = match config.spell_book.as_deref() {
            Some(path) => SpellBook::load(Path::new(path)).unwrap_or_else(|err| {
                tracing::warn!(error = %err, path, "spell book unavailable, continuing without it");
                SpellBook::default()
            }),
            None => SpellBook::default(),
        };
        Self {
            config,
            identity: Arc::new(PlayerRegistry::new()),
            spells: Arc::new(spells),
            active_file: None,
            end_pos: None,
            events: Vec::new(),
            report: None,
        }
    }
}
