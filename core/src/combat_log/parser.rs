use super::handler::RecordHandler;
use super::line::{RawLine, TokenSequence};
use super::record::{ClassifiedRecord, LogEvent};
use crate::context::{IStr, ParserConfig, intern, intern_upper};
use crate::game_data::labels;
use crate::registry::{IdentityRegistry, PlayerRegistry, SpellBook, SpellCatalog};
use crate::state::{CritTracker, CrossLineState};
use std::sync::Arc;

mod cast;
mod chat;
mod damage;
mod heal;
mod misc;
mod modifiers;
mod prefilter;

#[cfg(test)]
mod tests;

pub use modifiers::ModifierParser;

/// Words the log uses for the local player.
const SELF_WORDS: [&str; 9] = [
    "You", "YOU", "you", "Your", "YOUR", "your", "yourself", "Yourself", "YOURSELF",
];

/// Everything a classifier may consult while looking at one line.
pub(crate) struct LineContext<'a> {
    pub line_number: u64,
    pub timestamp: f64,
    pub config: &'a ParserConfig,
    pub identity: &'a dyn IdentityRegistry,
    pub spells: &'a dyn SpellCatalog,
    pub modifiers: &'a ModifierParser,
    pub crit: &'a CritTracker,
}

impl<'a> LineContext<'a> {
    /// Configured player name, or the `You` label.
    pub fn player(&self) -> &'a str {
        match self.config.player_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => labels::YOU,
        }
    }

    pub fn is_self(&self, name: &str) -> bool {
        SELF_WORDS.contains(&name)
    }

    /// Map "You"-family words to the local player; other names pass through.
    pub fn actor<'b>(&self, name: &'b str) -> &'b str
    where
        'a: 'b,
    {
        if self.is_self(name) { self.player() } else { name }
    }

    /// Interned original-case name with the self mapping applied.
    pub fn name(&self, name: &str) -> IStr {
        intern(self.actor(name))
    }

    /// Interned uppercase name key with the self mapping applied.
    pub fn name_key(&self, name: &str) -> IStr {
        intern_upper(self.actor(name))
    }

    /// Record a verified player with an optional class, skipping the local
    /// player label and anything that can't be a player name.
    pub fn register_player(&self, name: &str) -> bool {
        if name == labels::YOU || !self.identity.is_possible_player_name(name) {
            return false;
        }
        self.identity.add_verified_player(name);
        true
    }

    pub fn register_pet(&self, pet: &str, owner: &str) {
        self.identity.add_verified_pet(pet);
        self.identity.set_pet_owner(pet, owner);
        self.register_player(owner);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Log Parser
// ─────────────────────────────────────────────────────────────────────────────

/// Line classifier. Holds the collaborators and the modifier cache; the
/// state that spans lines is passed in by the caller.
pub struct LogParser {
    config: ParserConfig,
    identity: Arc<dyn IdentityRegistry>,
    spells: Arc<dyn SpellCatalog>,
    modifiers: ModifierParser,
}

impl LogParser {
    pub fn new(
        config: ParserConfig,
        identity: Arc<dyn IdentityRegistry>,
        spells: Arc<dyn SpellCatalog>,
    ) -> Self {
        Self {
            config,
            identity,
            spells,
            modifiers: ModifierParser::default(),
        }
    }

    /// Parser with empty in-memory registries.
    pub fn with_defaults(config: ParserConfig) -> Self {
        Self::new(
            config,
            Arc::new(PlayerRegistry::new()),
            Arc::new(SpellBook::default()),
        )
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn identity(&self) -> &Arc<dyn IdentityRegistry> {
        &self.identity
    }

    pub fn spells(&self) -> &Arc<dyn SpellCatalog> {
        &self.spells
    }

    pub fn modifiers(&self) -> &ModifierParser {
        &self.modifiers
    }

    /// Fresh cross-line state configured for this parser.
    pub fn new_state(&self) -> CrossLineState {
        CrossLineState::new(&self.config)
    }

    /// Classify one line. Only the crit marker of `state` is touched; the
    /// slain queue is driven by [`LogParser::process_line`] and
    /// [`LogParser::dispatch`].
    pub fn parse_line(
        &self,
        line_number: u64,
        line: &str,
        state: &CrossLineState,
    ) -> Option<LogEvent> {
        let raw = RawLine::parse(line_number, line, self.config.min_line_length)?;
        self.classify(&raw, &state.crit).map(|record| LogEvent {
            line_number,
            timestamp: raw.timestamp,
            record,
        })
    }

    fn classify(&self, raw: &RawLine<'_>, crit: &CritTracker) -> Option<ClassifiedRecord> {
        let ctx = LineContext {
            line_number: raw.line_number,
            timestamp: raw.timestamp,
            config: &self.config,
            identity: self.identity.as_ref(),
            spells: self.spells.as_ref(),
            modifiers: &self.modifiers,
            crit,
        };

        if prefilter::consume(&ctx, raw.text) {
            return None;
        }
        if let Some(chat) = chat::classify(&ctx, raw.text) {
            return Some(ClassifiedRecord::Chat(chat));
        }

        let tokens = TokenSequence::new(raw.text);
        damage::classify(&ctx, raw.text, &tokens)
            .or_else(|| cast::classify(&ctx, raw.text, &tokens))
            .or_else(|| heal::classify(&ctx, &tokens))
            .or_else(|| misc::classify(&ctx, raw.text, &tokens))
    }

    /// Classify one line and hand the result to `handler`, flushing any slain
    /// batch that the line's timestamp makes due first.
    pub fn process_line(
        &self,
        line_number: u64,
        line: &str,
        state: &CrossLineState,
        handler: &mut dyn RecordHandler,
    ) {
        let Some(raw) = RawLine::parse(line_number, line, self.config.min_line_length) else {
            return;
        };
        Self::flush_slain(raw.timestamp, state, handler);

        if let Some(record) = self.classify(&raw, &state.crit) {
            let event = LogEvent {
                line_number,
                timestamp: raw.timestamp,
                record,
            };
            Self::observe(&event, state);
            handler.handle_record(&event);
        }
    }

    /// Feed already classified events (from [`LogParser::parse_line`] or the
    /// parallel reader) through the slain queue to `handler`, in order.
    pub fn dispatch(
        &self,
        events: &[LogEvent],
        state: &CrossLineState,
        handler: &mut dyn RecordHandler,
    ) {
        for event in events {
            Self::flush_slain(event.timestamp, state, handler);
            Self::observe(event, state);
            handler.handle_record(event);
        }
    }

    /// End of input: flush whatever is still queued.
    pub fn finalize(&self, state: &CrossLineState, handler: &mut dyn RecordHandler) {
        if let Some(entries) = state.slain.flush_all() {
            let timestamp = entries
                .iter()
                .map(|e| e.queued_at)
                .fold(f64::MIN, f64::max);
            let names: Vec<IStr> = entries.into_iter().map(|e| e.name).collect();
            handler.on_slain_flush(&names, timestamp);
        }
    }

    fn flush_slain(timestamp: f64, state: &CrossLineState, handler: &mut dyn RecordHandler) {
        if let Some(names) = state.slain.flush_due(timestamp) {
            handler.on_slain_flush(&names, timestamp);
        }
    }

    fn observe(event: &LogEvent, state: &CrossLineState) {
        if let ClassifiedRecord::Death(death) = &event.record {
            state.slain.enqueue(death.slain, event.timestamp);
        }
    }
}
