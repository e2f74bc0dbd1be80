mod cross_line;

pub use cross_line::{CritTracker, CrossLineState, PendingCritMarker, SlainQueue, SlainQueueEntry};
