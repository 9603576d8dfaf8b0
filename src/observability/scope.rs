//! ObservationScope for begin/complete logging around long operations
//!
//! - Logs the begin event on creation
//! - Logs the complete event with `elapsed_ms` when `complete()` is called
//! - Logs the failed event when `fail()` is called
//! - Warns on drop if neither was called

use std::time::Instant;

use tracing::{error, info, warn};

use super::events::Event;

/// A scope that logs begin and end events for one operation
///
/// ```ignore
/// let scope = ObservationScope::new(Event::CompactionStart);
/// // ... do work ...
/// scope.complete(Event::CompactionComplete);
/// ```
pub struct ObservationScope {
    begin: Event,
    started: Instant,
    finished: bool,
}

impl ObservationScope {
    /// Logs `begin` immediately.
    pub fn new(begin: Event) -> Self {
        info!(event = begin.as_str());
        Self {
            begin,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Milliseconds since the scope was opened.
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    /// Logs `event` at INFO with the elapsed time.
    pub fn complete(mut self, event: Event) {
        self.finished = true;
        info!(event = event.as_str(), elapsed_ms = self.elapsed_ms() as u64);
    }

    /// Logs `event` at ERROR with the reason and elapsed time.
    pub fn fail(mut self, event: Event, reason: &str) {
        self.finished = true;
        error!(
            event = event.as_str(),
            elapsed_ms = self.elapsed_ms() as u64,
            reason
        );
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                event = self.begin.as_str(),
                reason = "scope dropped without completion"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_marks_finished() {
        let scope = ObservationScope::new(Event::CompactionStart);
        assert!(!scope.is_finished());
        scope.complete(Event::CompactionComplete);
    }

    #[test]
    fn test_drop_without_completion_does_not_panic() {
        let scope = ObservationScope::new(Event::CompactionStart);
        drop(scope);
    }

    #[test]
    fn test_fail() {
        let scope = ObservationScope::new(Event::CompactionStart);
        scope.fail(Event::CompactionFailed, "disk full");
    }
}
