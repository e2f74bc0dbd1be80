//! Whole-log tally
//!
//! A [`RecordHandler`] that accumulates counts and totals while records are
//! dispatched, and a serializable report built from it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::combat_log::{ClassifiedRecord, LogEvent, LootSource, RecordHandler};
use crate::context::{IStr, resolve};
use crate::game_data::labels;

/// Total attributed to one name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameTotal {
    pub name: String,
    pub total: u64,
}

/// Serializable snapshot of a [`LogSummary`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub event_count: usize,
    pub kinds: BTreeMap<String, usize>,
    pub duration_seconds: f64,
    pub top_damage: Vec<NameTotal>,
    pub top_healing: Vec<NameTotal>,
    pub deaths: usize,
    /// Number of slain batches flushed (one per fight teardown)
    pub slain_batches: usize,
    /// Currency looted by the local player, in copper
    pub currency_copper: u64,
    pub zones: Vec<String>,
}

#[derive(Debug, Default)]
pub struct LogSummary {
    events: usize,
    kinds: HashMap<&'static str, usize>,
    first_timestamp: Option<f64>,
    last_timestamp: Option<f64>,
    damage: HashMap<IStr, u64>,
    healing: HashMap<IStr, u64>,
    deaths: usize,
    slain_batches: usize,
    currency_copper: u64,
    zones: Vec<IStr>,
}

impl LogSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self) -> usize {
        self.events
    }

    pub fn kind_count(&self, kind: &str) -> usize {
        self.kinds.get(kind).copied().unwrap_or(0)
    }

    pub fn damage_by(&self, attacker: IStr) -> u64 {
        self.damage.get(&attacker).copied().unwrap_or(0)
    }

    pub fn slain_batches(&self) -> usize {
        self.slain_batches
    }

    fn top(totals: &HashMap<IStr, u64>, limit: usize) -> Vec<NameTotal> {
        let mut sorted: Vec<NameTotal> = totals
            .iter()
            .map(|(name, total)| NameTotal {
                name: resolve(*name).to_string(),
                total: *total,
            })
            .collect();
        sorted.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        sorted.truncate(limit);
        sorted
    }

    /// Report with the `limit` largest damage and healing totals.
    pub fn report(&self, limit: usize) -> SummaryReport {
        let duration_seconds = match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        SummaryReport {
            event_count: self.events,
            kinds: self
                .kinds
                .iter()
                .map(|(kind, count)| (kind.to_string(), *count))
                .collect(),
            duration_seconds,
            top_damage: Self::top(&self.damage, limit),
            top_healing: Self::top(&self.healing, limit),
            deaths: self.deaths,
            slain_batches: self.slain_batches,
            currency_copper: self.currency_copper,
            zones: self.zones.iter().map(|z| resolve(*z).to_string()).collect(),
        }
    }
}

impl RecordHandler for LogSummary {
    fn handle_record(&mut self, event: &LogEvent) {
        self.events += 1;
        *self.kinds.entry(event.record.kind()).or_insert(0) += 1;
        self.first_timestamp.get_or_insert(event.timestamp);
        self.last_timestamp = Some(event.timestamp);

        match &event.record {
            ClassifiedRecord::Damage(damage) if !damage.damage_type.is_miss() => {
                let total = self.damage.entry(damage.attacker).or_insert(0);
                *total = total.saturating_add(damage.total);
            }
            ClassifiedRecord::Heal(heal) => {
                let total = self.healing.entry(heal.healer).or_insert(0);
                *total = total.saturating_add(heal.total);
            }
            ClassifiedRecord::Death(_) => self.deaths += 1,
            ClassifiedRecord::Loot(loot)
                if resolve(loot.item) == labels::CURRENCY
                    && !matches!(loot.source, LootSource::WonRoll { .. }) =>
            {
                self.currency_copper = self.currency_copper.saturating_add(loot.quantity);
            }
            ClassifiedRecord::Zone(zone) => self.zones.push(zone.zone),
            _ => {}
        }
    }

    fn on_slain_flush(&mut self, names: &[IStr], timestamp: f64) {
        self.slain_batches += 1;
        tracing::debug!(slain = names.len(), timestamp, "slain batch flushed");
    }
}
