use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::app_state::AppState;
use eqlog_core::combat_log::{LogParser, read_log_file};
use eqlog_core::context::player_from_path;
use eqlog_core::summary::LogSummary;
use tokio::sync::RwLock;

const TOP_LIMIT: usize = 5;

pub async fn parse_file(path: &str, state: Arc<RwLock<AppState>>) -> Result<(), String> {
    let timer = Instant::now();
    let path = PathBuf::from(path);

    let parser = {
        let s = state.read().await;
        let mut config = s.config.clone();
        if let Some(player) = player_from_path(&path) {
            config.player_name = Some(player);
        }
        LogParser::new(config, s.identity.clone(), s.spells.clone())
    };

    // classification is CPU bound; keep it off the async workers
    let read_path = path.clone();
    let (events, end_pos, summary) = tokio::task::spawn_blocking(move || {
        let (events, end_pos) = read_log_file(&read_path, &parser).map_err(|e| e.to_string())?;
        let cross_line = parser.new_state();
        let mut summary = LogSummary::new();
        parser.dispatch(&events, &cross_line, &mut summary);
        parser.finalize(&cross_line, &mut summary);
        Ok::<_, String>((events, end_pos, summary))
    })
    .await
    .map_err(|e| e.to_string())??;

    println!(
        "parsed {} events from {} in {}ms",
        events.len(),
        path.display(),
        timer.elapsed().as_millis()
    );

    let mut s = state.write().await;
    s.active_file = Some(path);
    s.end_pos = Some(end_pos);
    s.events = events;
    s.report = Some(summary.report(TOP_LIMIT));
    Ok(())
}

pub async fn stats(state: Arc<RwLock<AppState>>) {
    let s = state.read().await;
    let Some(report) = &s.report else {
        println!("no file parsed");
        return;
    };

    if let Some(file) = &s.active_file {
        println!("file: {} ({} bytes)", file.display(), s.end_pos.unwrap_or(0));
    }
    println!(
        "total events: {} over {:.0}s",
        report.event_count, report.duration_seconds
    );
    for (kind, count) in &report.kinds {
        println!("  {kind:<14} {count}");
    }
    println!(
        "deaths: {}  fights ended: {}  currency: {}cp",
        report.deaths, report.slain_batches, report.currency_copper
    );
    println!("top damage:");
    for entry in &report.top_damage {
        println!("  {:<24} {}", entry.name, entry.total);
    }
    println!("top healing:");
    for entry in &report.top_healing {
        println!("  {:<24} {}", entry.name, entry.total);
    }
    println!(
        "verified players: {}  pets: {}",
        s.identity.player_count(),
        s.identity.pet_count()
    );
}
