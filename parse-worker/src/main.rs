//! eqlog-parse-worker - Subprocess for classifying whole log files.
//!
//! Runs in a separate process so a large file's allocations don't linger in
//! the caller.
//!
//! Usage: eqlog-parse-worker <file_path> [spell_book.toml]
//!
//! Output: JSON to stdout with the tally and final byte position. Logs go to
//! stderr.

use eqlog_core::combat_log::{LogParser, read_log_file};
use eqlog_core::context::player_from_path;
use eqlog_core::registry::{PlayerRegistry, SpellBook};
use eqlog_core::summary::{LogSummary, SummaryReport};
use eqlog_types::ParserConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Largest totals reported per category.
const TOP_LIMIT: usize = 10;

/// Output sent to the caller via stdout.
#[derive(Debug, Serialize)]
struct ParseOutput {
    /// Final byte position in the file (for tailing).
    end_pos: u64,
    /// Player name taken from the filename, if it follows the standard layout.
    player: Option<String>,
    verified_players: usize,
    verified_pets: usize,
    summary: SummaryReport,
    /// Elapsed time in milliseconds.
    elapsed_ms: u128,
}

fn init_logging() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();
    let filter_directive = if debug_logging {
        "info,eqlog_core=debug,eqlog_parse_worker=debug"
    } else {
        "warn"
    };

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(EnvFilter::new(filter_directive))
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: eqlog-parse-worker <file_path> [spell_book.toml]");
        std::process::exit(1);
    }
    init_logging();

    let file_path = PathBuf::from(&args[1]);
    let spell_book = args.get(2).map(PathBuf::from);
    let timer = std::time::Instant::now();

    match parse_file(&file_path, spell_book.as_deref()) {
        Ok(mut output) => {
            output.elapsed_ms = timer.elapsed().as_millis();
            tracing::info!(
                events = output.summary.event_count,
                elapsed_ms = output.elapsed_ms as u64,
                "parse complete"
            );

            // Output JSON to stdout for the caller
            match serde_json::to_string(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Serialize error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_file(file_path: &Path, spell_book: Option<&Path>) -> Result<ParseOutput, String> {
    let player = player_from_path(file_path);
    let config = match &player {
        Some(name) => ParserConfig::for_player(name),
        None => ParserConfig::default(),
    };

    let spells = match spell_book {
        Some(path) => SpellBook::load(path).map_err(|e| e.to_string())?,
        None => SpellBook::default(),
    };
    let identity = Arc::new(PlayerRegistry::new());
    let parser = LogParser::new(config, identity.clone(), Arc::new(spells));

    let (events, end_pos) = read_log_file(file_path, &parser).map_err(|e| e.to_string())?;

    let state = parser.new_state();
    let mut summary = LogSummary::new();
    parser.dispatch(&events, &state, &mut summary);
    parser.finalize(&state, &mut summary);

    Ok(ParseOutput {
        end_pos,
        player,
        verified_players: identity.player_count(),
        verified_pets: identity.pet_count(),
        summary: summary.report(TOP_LIMIT),
        elapsed_ms: 0,
    })
}
