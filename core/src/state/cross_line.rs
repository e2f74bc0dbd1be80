//! State carried from one line to the next.
//!
//! Both pieces are explicit objects threaded through the parser rather than
//! globals, so the ordering contract is visible at the call site: crit
//! markers only correlate when lines arrive in order, and slain batches
//! flush against the timestamps of the lines fed after them.

use crate::context::{IStr, ParserConfig};
use std::sync::Mutex;

// ─────────────────────────────────────────────────────────────────────────────
// Pending Crit
// ─────────────────────────────────────────────────────────────────────────────

/// A legacy "scores a critical hit!" line waiting for the damage line that
/// follows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingCritMarker {
    pub attacker: IStr,
    pub source_line_number: u64,
    pub timestamp: f64,
}

#[derive(Debug, Default)]
pub struct CritTracker {
    pending: Mutex<Option<PendingCritMarker>>,
}

impl CritTracker {
    /// Record a crit announcement, replacing any older marker.
    pub fn mark(&self, attacker: IStr, line_number: u64, timestamp: f64) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(PendingCritMarker {
                attacker,
                source_line_number: line_number,
                timestamp,
            });
        }
    }

    /// Consume the marker. Returns true if it was left by the previous line
    /// for the same attacker within `window` seconds.
    pub fn take_for(&self, attacker: IStr, line_number: u64, timestamp: f64, window: f64) -> bool {
        let Ok(mut pending) = self.pending.lock() else {
            return false;
        };
        let Some(marker) = pending.take() else {
            return false;
        };
        marker.attacker == attacker
            && marker.source_line_number + 1 == line_number
            && (timestamp - marker.timestamp).abs() <= window
    }

    pub fn pending(&self) -> Option<PendingCritMarker> {
        self.pending.lock().ok().and_then(|p| *p)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Slain Queue
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlainQueueEntry {
    pub name: IStr,
    pub queued_at: f64,
}

/// Deaths waiting to tear down their encounter. The whole batch flushes
/// once a line arrives strictly after the oldest entry's deadline.
#[derive(Debug, Default)]
pub struct SlainQueue {
    delay: f64,
    entries: Mutex<Vec<SlainQueueEntry>>,
}

impl SlainQueue {
    pub fn new(delay: f64) -> Self {
        Self {
            delay,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Queue a name. A name already waiting is not queued twice.
    pub fn enqueue(&self, name: IStr, queued_at: f64) {
        if let Ok(mut entries) = self.entries.lock()
            && !entries.iter().any(|e| e.name == name)
        {
            entries.push(SlainQueueEntry { name, queued_at });
        }
    }

    /// Drain the batch if `now` is past its deadline. The check and the drain
    /// happen under one lock so a concurrent enqueue lands in either this
    /// batch or the next, never neither.
    pub fn flush_due(&self, now: f64) -> Option<Vec<IStr>> {
        let mut entries = self.entries.lock().ok()?;
        let deadline = entries.first()?.queued_at + self.delay;
        if now <= deadline {
            return None;
        }
        Some(entries.drain(..).map(|e| e.name).collect())
    }

    /// Drain everything regardless of deadline (end of input).
    pub fn flush_all(&self) -> Option<Vec<SlainQueueEntry>> {
        let mut entries = self.entries.lock().ok()?;
        if entries.is_empty() {
            return None;
        }
        Some(entries.drain(..).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything one stream of lines carries between calls.
#[derive(Debug, Default)]
pub struct CrossLineState {
    pub crit: CritTracker,
    pub slain: SlainQueue,
}

impl CrossLineState {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            crit: CritTracker::default(),
            slain: SlainQueue::new(config.slain_flush_delay_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::intern;

    #[test]
    fn test_crit_marker_applies_to_next_line_only() {
        let tracker = CritTracker::default();
        let kazint = intern("KAZINT");
        tracker.mark(kazint, 10, 100.0);
        assert!(tracker.take_for(kazint, 11, 100.0, 1.0));
        // consumed
        assert!(!tracker.take_for(kazint, 12, 100.0, 1.0));
    }

    #[test]
    fn test_crit_marker_rejects_other_attacker_and_stale_time() {
        let tracker = CritTracker::default();
        let kazint = intern("KAZINT");
        tracker.mark(kazint, 10, 100.0);
        assert!(!tracker.take_for(intern("FLLINT"), 11, 100.0, 1.0));
        assert!(tracker.pending().is_none());

        tracker.mark(kazint, 20, 100.0);
        assert!(!tracker.take_for(kazint, 21, 102.0, 1.0));
    }

    #[test]
    fn test_slain_queue_dedupes_and_flushes_after_deadline() {
        let queue = SlainQueue::new(0.0);
        let goblin = intern("A GOBLIN");
        queue.enqueue(goblin, 50.0);
        queue.enqueue(goblin, 50.0);
        assert_eq!(queue.len(), 1);

        assert!(queue.flush_due(50.0).is_none());
        assert_eq!(queue.flush_due(51.0), Some(vec![goblin]));
        assert!(queue.is_empty());
        assert!(queue.flush_due(52.0).is_none());
    }

    #[test]
    fn test_slain_queue_respects_delay() {
        let queue = SlainQueue::new(5.0);
        queue.enqueue(intern("A RAT"), 10.0);
        assert!(queue.flush_due(14.0).is_none());
        assert!(queue.flush_due(15.5).is_some());
    }
}
