// SPDX-License-Identifier: MIT OR Apache-2.0

//! The backend facade.
//!
//! A backend decides two things: which level is currently effective for a logger name, and
//! what happens to a finished [`LogRecord`].  Backends are registered with an
//! [`Instrumentor`](crate::instrumentor::Instrumentor) under a name; declarations select them
//! by that name.

use crate::Level;
use crate::config::LevelConfig;
use crate::error_class::Throwable;
use crate::log_record::LogRecord;
use std::fmt::Debug;

pub trait LogBackend: Debug + Send + Sync {
    /// The least severe level that currently logs for `logger`.  `Level::Off` silences it.
    fn effective_level(&self, logger: &str) -> Level;

    /**
        Submits the record for logging.
    */
    fn finish_log_record(&self, record: LogRecord);

    /// Flushes anything buffered.
    fn flush(&self) {}

    /// Replaces the backend's level directives.  Backends whose levels are decided elsewhere ignore it.
    fn configure_levels(&self, _levels: LevelConfig) {}

    fn log(&self, logger: &str, level: Level, message: &str) {
        self.finish_log_record(LogRecord::new(logger, level, message));
    }

    fn log_with_error(&self, logger: &str, level: Level, message: &str, error: &dyn Throwable) {
        self.finish_log_record(LogRecord::new(logger, level, message).with_error(error));
    }

    fn is_enabled(&self, logger: &str, level: Level) -> bool {
        level.is_enabled(self.effective_level(logger))
    }
}

/*
Boilerplate notes.

# LogBackend

Clone on a backend doesn't make sense, so Copy is out too.
PartialEq and Eq are possible but it's unclear whether we'd mean data or identity.  Avoid.
Default depends on how the backend is constructed.
Send/Sync are required: plans are shared across threads and log from all of them.
*/
