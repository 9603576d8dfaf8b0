//! Observability events for itemstore
//!
//! Lifecycle events are explicit and typed. They are emitted through
//! `tracing` with the event name in the `event` field.

use std::fmt;

/// Observable lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Store opened and index rebuilt
    StoreOpened,
    /// Store failed to open (FATAL)
    StoreOpenFailed,
    /// Listener bound, ready for requests
    Serving,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Data directory
    /// Data directory layout created
    InitComplete,

    // Compaction
    /// Compaction begins
    CompactionStart,
    /// Compaction complete
    CompactionComplete,
    /// Compaction failed
    CompactionFailed,

    // Dump
    /// All items written to stdout
    DumpComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "ITEMSTORE_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreOpenFailed => "STORE_OPEN_FAILED",
            Event::Serving => "ITEMSTORE_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::InitComplete => "INIT_COMPLETE",
            Event::CompactionStart => "COMPACTION_BEGIN",
            Event::CompactionComplete => "COMPACTION_COMPLETE",
            Event::CompactionFailed => "COMPACTION_FAILED",
            Event::DumpComplete => "DUMP_COMPLETE",
        }
    }

    /// Whether this event means the process cannot continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StoreOpenFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
