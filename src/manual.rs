// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manual log calls.
//!
//! Code that wants to log something between intercepted calls uses [`manual_log!`].  The record
//! carries the manual marker `*`, goes to the [global backends](crate::global_backend), and is
//! attributed to the calling module: `module_path!()` at the call site, with `::` written as
//! `.` so names line up with the dotted logger names of intercepted methods.
//!
//! ```rust
//! use methodlog::{manual_log, Level};
//!
//! manual_log!(Level::Info, "cache warmed with {} entries", 128);
//! ```
//!
//! The message is only formatted when some backend has the level enabled.

use crate::Level;
use crate::error_class::Throwable;
use crate::global_backend::global_backends;
use crate::message::MANUAL;

/// Logs through the global backends.  See the [module documentation](crate::manual).
#[macro_export]
macro_rules! manual_log {
    ($level:expr, error: $error:expr, $($arg:tt)+) => {
        $crate::manual::log_error_at(module_path!(), $level, $error, || format!($($arg)+))
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::manual::log_at(module_path!(), $level, || format!($($arg)+))
    };
}

/// The logger name for a module path.
pub fn logger_name(module_path: &str) -> String {
    module_path.replace("::", ".")
}

#[doc(hidden)]
pub fn log_at(module_path: &str, level: Level, message: impl FnOnce() -> String) {
    let logger = logger_name(module_path);
    let backends = global_backends();
    let mut enabled = backends.iter().filter(|b| b.is_enabled(&logger, level)).peekable();
    if enabled.peek().is_none() {
        return;
    }
    let message = format!("{} {}", MANUAL, message());
    for backend in enabled {
        backend.log(&logger, level, &message);
    }
}

#[doc(hidden)]
pub fn log_error_at(module_path: &str, level: Level, error: &dyn Throwable, message: impl FnOnce() -> String) {
    let logger = logger_name(module_path);
    let backends = global_backends();
    let mut enabled = backends.iter().filter(|b| b.is_enabled(&logger, level)).peekable();
    if enabled.peek().is_none() {
        return;
    }
    let message = format!("{} {}", MANUAL, message());
    for backend in enabled {
        backend.log_with_error(&logger, level, &message, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_class::{Exception, IO_EXCEPTION};
    use crate::global_backend::set_global_backends;
    use crate::global_backend::tests::TEST_BACKEND_GUARD;
    use crate::inmemory_backend::InMemoryBackend;
    use std::sync::Arc;

    #[test]
    fn logger_name_uses_dots() {
        assert_eq!(logger_name("methodlog::manual::tests"), "methodlog.manual.tests");
    }

    #[test]
    fn manual_log_goes_to_global_backends() {
        let _guard = TEST_BACKEND_GUARD.lock().unwrap();
        let memory = Arc::new(InMemoryBackend::new());
        set_global_backends(vec![memory.clone()]);
        crate::manual_log!(Level::Info, "hello {}", "world");
        let records = memory.drain();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), "* hello world");
        assert_eq!(records[0].logger(), "methodlog.manual.tests");
    }

    #[test]
    fn disabled_level_skips_formatting() {
        let _guard = TEST_BACKEND_GUARD.lock().unwrap();
        let memory = Arc::new(InMemoryBackend::new());
        memory.set_level(Level::Error);
        set_global_backends(vec![memory.clone()]);
        let mut formatted = false;
        log_at(module_path!(), Level::Debug, || {
            formatted = true;
            String::new()
        });
        assert!(!formatted);
        assert!(memory.records().is_empty());
    }

    #[test]
    fn error_is_attached() {
        let _guard = TEST_BACKEND_GUARD.lock().unwrap();
        let memory = Arc::new(InMemoryBackend::new());
        set_global_backends(vec![memory.clone()]);
        let e = Exception::new(&IO_EXCEPTION, "disk gone");
        crate::manual_log!(Level::Error, error: &e, "flush failed");
        let records = memory.drain();
        assert_eq!(records[0].error(), Some("IOException: disk gone"));
    }
}
