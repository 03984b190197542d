// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Backend
//!
//! A backend that keeps every record in memory, for tests and for examining output
//! programmatically.  Its effective levels come from a [`LevelConfig`] that can be swapped at
//! any time, which is how tests flip between "only INFO" and "everything" without rebuilding
//! the instrumented classes.

use crate::Level;
use crate::backend::LogBackend;
use crate::config::LevelConfig;
use crate::log_record::LogRecord;
use std::sync::{Mutex, PoisonError, RwLock};

/// Stores records in a `Vec<LogRecord>`.
///
/// Thread-safe; share it behind an `Arc`.
///
/// ```rust
/// use methodlog::backend::LogBackend;
/// use methodlog::{InMemoryBackend, Level};
///
/// let backend = InMemoryBackend::new();
/// backend.log("app.Jobs.run", Level::Info, ">");
/// assert_eq!(backend.messages(), [">"]);
/// assert_eq!(backend.drain_logs(), "INFO app.Jobs.run >");
/// assert!(backend.records().is_empty());
/// ```
#[derive(Debug)]
pub struct InMemoryBackend {
    logs: Mutex<Vec<LogRecord>>,
    levels: RwLock<LevelConfig>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Default: empty buffer, everything enabled
// - Clone: NOT implemented - two backends sharing one buffer is what Arc is for
// - PartialEq/Eq/Hash: NOT implemented - comparing mutex contents is not meaningful

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// An empty backend with every level enabled.
    pub fn new() -> Self {
        Self::with_levels(LevelConfig::new(Level::Trace))
    }

    pub fn with_levels(levels: LevelConfig) -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
            levels: RwLock::new(levels),
        }
    }

    pub fn set_levels(&self, levels: LevelConfig) {
        *self.levels.write().unwrap_or_else(PoisonError::into_inner) = levels;
    }

    /// Sets one effective level for every logger.
    pub fn set_level(&self, level: Level) {
        self.set_levels(LevelConfig::new(level));
    }

    /// A copy of the records so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Takes the records so far, leaving the buffer empty.
    pub fn drain(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.logs.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Just the messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| r.message().to_string())
            .collect()
    }

    /// Drains all records into a single string, one line each.
    pub fn drain_logs(&self) -> String {
        self.drain()
            .iter()
            .map(LogRecord::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Writes the buffered records to stderr (the console on wasm) and clears the buffer.
    pub fn drain_to_console(&self) {
        for record in self.drain() {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&record.to_string().into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("{}", record);
        }
    }
}

impl LogBackend for InMemoryBackend {
    fn configure_levels(&self, levels: LevelConfig) {
        self.set_levels(levels);
    }

    fn effective_level(&self, logger: &str) -> Level {
        self.levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .level_for(logger)
    }

    fn finish_log_record(&self, record: LogRecord) {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}
