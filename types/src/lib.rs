//! Shared configuration types for eqlog
//!
//! This crate contains serializable configuration types that are shared between
//! the classification engine (eqlog-core) and the binaries that drive it.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Parser Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest line (timestamp included) that is worth classifying.
pub const DEFAULT_MIN_LINE_LENGTH: usize = 30;
/// Damage participant names longer than this reject the line.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 64;
/// A legacy crit announcement only applies to a damage line within this window.
pub const DEFAULT_CRIT_WINDOW_SECS: f64 = 1.0;

/// Engine settings. Every field has a default so partial config files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Local player name. Substituted for "You"/"YOU"/"YOUR" in records.
    pub player_name: Option<String>,
    /// Server the log belongs to (informational).
    pub server: Option<String>,
    pub min_line_length: usize,
    pub max_name_length: usize,
    pub crit_window_secs: f64,
    /// Slain batches flush once a line is strictly later than `queued_at + delay`.
    pub slain_flush_delay_secs: f64,
    /// Optional path to a TOML spell book.
    pub spell_book: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            player_name: None,
            server: None,
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            crit_window_secs: DEFAULT_CRIT_WINDOW_SECS,
            slain_flush_delay_secs: 0.0,
            spell_book: None,
        }
    }
}

impl ParserConfig {
    /// Config for a known local player, everything else defaulted.
    pub fn for_player(name: impl Into<String>) -> Self {
        Self {
            player_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Returns true if a local player name has been configured.
    pub fn has_player(&self) -> bool {
        self.player_name.as_deref().is_some_and(|n| !n.is_empty())
    }
}
