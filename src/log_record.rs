// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record handed to a backend.
//!
//! A [`LogRecord`] carries everything a backend might want to write: the logger name, level,
//! message, an optional summary of an attached error, and a copy of the diagnostic context as
//! it was when the record was made.  The context is captured on the logging thread, so a
//! backend that writes elsewhere still sees the right tags.
//!
//! ```rust
//! use methodlog::{Level, LogRecord};
//!
//! let record = LogRecord::new("app.Orders.place", Level::Info, "> sku=\"A-1\"");
//! assert_eq!(record.to_string(), "INFO app.Orders.place > sku=\"A-1\"");
//! ```

use crate::Level;
use crate::context::ContextSnapshot;
use crate::error_class::Throwable;
use std::fmt::{Debug, Display};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogRecord {
    logger: String,
    level: Level,
    message: String,
    error: Option<String>,
    context: ContextSnapshot,
}

impl LogRecord {
    /// A record carrying the current thread's diagnostic context.
    pub fn new(logger: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
            level,
            message: message.into(),
            error: None,
            context: ContextSnapshot::capture(),
        }
    }

    /// Attaches an error, summarized as `Class: message`.
    pub fn with_error(mut self, error: &dyn Throwable) -> Self {
        self.error = Some(format!("{}: {}", error.error_class().name(), error));
        self
    }

    #[inline]
    pub fn logger(&self) -> &str {
        &self.logger
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[inline]
    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.level, self.logger)?;
        if !self.context.is_empty() {
            write!(f, " [{}]", self.context)?;
        }
        write!(f, " {}", self.message)?;
        if let Some(error) = &self.error {
            write!(f, " ({error})")?;
        }
        Ok(())
    }
}
/*
Boilerplate notes for LogRecord:

IMPLEMENTED:
- Debug, Clone: derived; records get forwarded and inspected in tests
- PartialEq/Eq/Hash: derived; every field is plain data
- Display: the one-line form the stderr backend writes

NOT IMPLEMENTED:
- Default: a record without a logger name is meaningless
- Copy: owns strings
- Ord: no meaningful ordering between records
*/
