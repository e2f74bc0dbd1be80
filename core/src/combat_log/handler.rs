use super::record::LogEvent;
use crate::context::IStr;

/// Trait for consumers of classified lines.
/// Implement this for encounter trackers, tallies, exporters, etc.
pub trait RecordHandler {
    /// Handle a single classified line.
    fn handle_record(&mut self, event: &LogEvent);

    /// Handle multiple records (default implementation calls handle_record for each)
    fn handle_records(&mut self, events: &[LogEvent]) {
        for event in events {
            self.handle_record(event);
        }
    }

    /// Called when a batch of slain names is due for encounter teardown.
    /// `timestamp` is the time of the line that triggered the flush.
    fn on_slain_flush(&mut self, _names: &[IStr], _timestamp: f64) {}
}

impl RecordHandler for Vec<LogEvent> {
    fn handle_record(&mut self, event: &LogEvent) {
        self.push(event.clone());
    }
}
