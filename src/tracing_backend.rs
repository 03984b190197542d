// SPDX-License-Identifier: MIT OR Apache-2.0

//! A backend that forwards to [`tracing`].
//!
//! Each record becomes one `tracing` event with `logger`, `context` and (when present) `error`
//! fields.  The effective level is whatever `tracing`'s global max level filter currently
//! allows, so the subscriber's configuration decides what gets logged.  Level directives
//! handed to [`configure_levels`](LogBackend::configure_levels) are ignored for the same reason.

use crate::Level;
use crate::backend::LogBackend;
use crate::log_record::LogRecord;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TracingBackend;

impl TracingBackend {
    pub const fn new() -> Self {
        Self
    }
}

fn from_filter(filter: LevelFilter) -> Level {
    match filter.into_level() {
        None => Level::Off,
        Some(level) if level == tracing::Level::ERROR => Level::Error,
        Some(level) if level == tracing::Level::WARN => Level::Warn,
        Some(level) if level == tracing::Level::INFO => Level::Info,
        Some(level) if level == tracing::Level::DEBUG => Level::Debug,
        Some(_) => Level::Trace,
    }
}

macro_rules! emit {
    ($level:expr, $record:expr) => {{
        let record = $record;
        let context = record.context().to_string();
        match record.error() {
            Some(error) => tracing::event!(
                $level,
                logger = record.logger(),
                context = %context,
                error = error,
                "{}",
                record.message()
            ),
            None => tracing::event!(
                $level,
                logger = record.logger(),
                context = %context,
                "{}",
                record.message()
            ),
        }
    }};
}

impl LogBackend for TracingBackend {
    fn effective_level(&self, _logger: &str) -> Level {
        from_filter(LevelFilter::current())
    }

    fn finish_log_record(&self, record: LogRecord) {
        match record.level() {
            Level::Trace => emit!(tracing::Level::TRACE, &record),
            Level::Debug => emit!(tracing::Level::DEBUG, &record),
            Level::Info => emit!(tracing::Level::INFO, &record),
            Level::Warn => emit!(tracing::Level::WARN, &record),
            Level::Error => emit!(tracing::Level::ERROR, &record),
            Level::Off => {}
        }
    }
}
