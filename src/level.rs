// SPDX-License-Identifier: MIT OR Apache-2.0

//! Severity levels.
//!
//! Levels are ordered by severity, so `Level::Trace < Level::Error`.  A definition
//! configured at some level is *enabled* when that level is at least as severe as the
//! backend's effective level for the logger in question.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Very detailed diagnostics, usually argument dumps
    Trace,
    /// Developer diagnostics; the default for entry/exit logging
    Debug,
    /// Normal operational messages
    Info,
    /// Suspicious condition
    Warn,
    /// Runtime error; the default for error logging
    Error,
    /// Never logs.  Writing this explicitly on a declaration is a usage error.
    Off,
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Off,
    ];

    /**
    Whether a definition configured at `self` emits when the backend is currently at `effective`.

    ```
    use methodlog::Level;
    assert!(Level::Info.is_enabled(Level::Debug));
    assert!(!Level::Debug.is_enabled(Level::Info));
    assert!(!Level::Off.is_enabled(Level::Trace));
    ```
    */
    #[inline]
    pub fn is_enabled(self, effective: Level) -> bool {
        self != Level::Off && self >= effective
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }
}

/// Gate helper: an absent threshold is always satisfied.
#[inline]
pub(crate) fn gate_satisfied(threshold: Option<Level>, effective: Level) -> bool {
    threshold.is_none_or(|t| t.is_enabled(effective))
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level `{0}`")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "disabled" => Ok(Level::Off),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_severity() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("WARNING".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" info ".parse::<Level>(), Ok(Level::Info));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn absent_gate_is_open() {
        assert!(gate_satisfied(None, Level::Error));
        assert!(!gate_satisfied(Some(Level::Debug), Level::Info));
    }
}
