// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging declarations.
//!
//! These are the annotations a developer attaches to methods and parameters.  They are plain
//! data, written as struct literals:
//!
//! ```
//! use methodlog::annotation::{LogEntry, LogError};
//! use methodlog::error_class::{NULL_POINTER_EXCEPTION, RUNTIME_EXCEPTION};
//! use methodlog::Level;
//!
//! let entry = LogEntry { level: Some(Level::Info), ..Default::default() };
//! let error = LogError {
//!     include: vec![&RUNTIME_EXCEPTION],
//!     exclude: vec![&NULL_POINTER_EXCEPTION],
//!     ..Default::default()
//! };
//! ```
//!
//! Every logging declaration names the backend it targets in `logger`; the empty string
//! targets the default backend.  A `level` of `None` means the declaration's default;
//! `Some(Level::Off)` is rejected when the class is instrumented.

use crate::Level;
use crate::error_class::{ErrorClass, THROWABLE};

/// Entry and exit logging in one declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Logging {
    pub level: Option<Level>,
    /// Additionally require this level to be enabled.
    pub if_enabled: Option<Level>,
    /// Arguments and result are rendered only while this level is enabled.  Defaults to `level`.
    pub verbose: Option<Level>,
    /// Printer for arguments and result.
    pub printer: Option<String>,
    pub logger: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LogEntry {
    pub level: Option<Level>,
    pub if_enabled: Option<Level>,
    pub verbose: Option<Level>,
    pub printer: Option<String>,
    pub logger: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LogExit {
    pub level: Option<Level>,
    pub if_enabled: Option<Level>,
    pub verbose: Option<Level>,
    pub printer: Option<String>,
    pub logger: String,
}

/**
Error logging.

`include` defaults to [`THROWABLE`], i.e. everything.  Several `LogError`s may target the same
backend; the one whose include is nearest to the thrown class is used.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogError {
    pub level: Option<Level>,
    pub if_enabled: Option<Level>,
    /// The error itself is attached only while this level is enabled.  Defaults to `level`.
    pub verbose: Option<Level>,
    pub include: Vec<&'static ErrorClass>,
    pub exclude: Vec<&'static ErrorClass>,
    pub logger: String,
}

impl Default for LogError {
    fn default() -> Self {
        Self {
            level: None,
            if_enabled: None,
            verbose: None,
            include: vec![&THROWABLE],
            exclude: Vec::new(),
            logger: String::new(),
        }
    }
}

/// Argument logging on a single parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LogArg {
    /// The argument is rendered only while this level is enabled.
    pub if_enabled: Option<Level>,
    pub printer: Option<String>,
    pub logger: String,
}

/**
A diagnostic-context entry.

On a method, `value` is evaluated with no receiver; on a parameter, with the argument as
receiver (an empty `value` then means the argument itself).  An empty `key` is replaced by the
method name or the parameter name.  A `global` entry outlives the call that installed it.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Mdc {
    pub key: String,
    pub value: String,
    pub global: bool,
}

impl Mdc {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            global: false,
        }
    }

    pub fn global(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            global: true,
            ..Self::new(key, value)
        }
    }
}

/// A declaration on a method.  The plural variants are repetition containers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodAnnotation {
    Logging(Logging),
    LoggingSet(Vec<Logging>),
    LogEntry(LogEntry),
    LogEntries(Vec<LogEntry>),
    LogExit(LogExit),
    LogExits(Vec<LogExit>),
    LogError(LogError),
    LogErrors(Vec<LogError>),
    Mdc(Mdc),
    MdcSet(Vec<Mdc>),
}

/// A declaration on a parameter.  The plural variants are repetition containers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamAnnotation {
    LogArg(LogArg),
    LogArgs(Vec<LogArg>),
    Mdc(Mdc),
    MdcSet(Vec<Mdc>),
}

macro_rules! into_annotation {
    ($target:ident: $($single:ident / $plural:ident),*) => {
        $(
            impl From<$single> for $target {
                fn from(value: $single) -> Self {
                    $target::$single(value)
                }
            }
            impl From<Vec<$single>> for $target {
                fn from(value: Vec<$single>) -> Self {
                    $target::$plural(value)
                }
            }
        )*
    };
}

into_annotation!(MethodAnnotation: Logging / LoggingSet, LogEntry / LogEntries, LogExit / LogExits, LogError / LogErrors, Mdc / MdcSet);
into_annotation!(ParamAnnotation: LogArg / LogArgs, Mdc / MdcSet);

/// The parts of a logging declaration that select and gate a backend.
pub trait Targeted {
    const KIND: &'static str;
    fn logger(&self) -> &str;
    fn level(&self) -> Option<Level>;
}

macro_rules! targeted {
    ($($t:ident),*) => {
        $(
            impl Targeted for $t {
                const KIND: &'static str = stringify!($t);
                fn logger(&self) -> &str {
                    &self.logger
                }
                fn level(&self) -> Option<Level> {
                    self.level
                }
            }
        )*
    };
}

targeted!(Logging, LogEntry, LogExit, LogError);

impl Targeted for LogArg {
    const KIND: &'static str = "LogArg";
    fn logger(&self) -> &str {
        &self.logger
    }
    fn level(&self) -> Option<Level> {
        None
    }
}
