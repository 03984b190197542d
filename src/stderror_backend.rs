// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::backend::LogBackend;
use crate::config::LevelConfig;
use crate::log_record::LogRecord;
use std::sync::{PoisonError, RwLock};

/**
A reference backend that logs to stderr.

One line per record: level, logger, diagnostic context in brackets, message.  On wasm32 the
line goes to the browser console at the matching console level.
 */
#[derive(Debug)]
pub struct StdErrorBackend {
    levels: RwLock<LevelConfig>,
}

impl Default for StdErrorBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StdErrorBackend {
    /// Logs at [`Level::Info`] and above.
    pub fn new() -> Self {
        Self::with_levels(LevelConfig::default())
    }

    pub fn with_levels(levels: LevelConfig) -> Self {
        Self {
            levels: RwLock::new(levels),
        }
    }

    pub fn set_levels(&self, levels: LevelConfig) {
        *self.levels.write().unwrap_or_else(PoisonError::into_inner) = levels;
    }
}

impl LogBackend for StdErrorBackend {
    fn effective_level(&self, logger: &str) -> Level {
        self.levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .level_for(logger)
    }

    fn finish_log_record(&self, record: LogRecord) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            let mut lock = std::io::stderr().lock();
            // Nowhere left to report a failed write to stderr.
            let _ = writeln!(lock, "{}", record);
        }
        #[cfg(target_arch = "wasm32")]
        {
            let msg = record.to_string();
            match record.level() {
                Level::Trace => web_sys::console::trace_1(&msg.into()),
                Level::Debug => web_sys::console::debug_1(&msg.into()),
                Level::Info => web_sys::console::info_1(&msg.into()),
                Level::Warn => web_sys::console::warn_1(&msg.into()),
                Level::Error => web_sys::console::error_1(&msg.into()),
                Level::Off => {}
            }
        }
    }

    fn configure_levels(&self, levels: LevelConfig) {
        self.set_levels(levels);
    }

    fn flush(&self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            let _ = std::io::stderr().flush();
        }
    }
}
