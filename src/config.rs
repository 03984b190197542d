// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration.
//!
//! Two pieces live here.  [`LevelConfig`] maps logger names to effective levels for the
//! backends that don't delegate that decision elsewhere.  [`InstrumentationConfig`] is the
//! file-loadable form of an instrumentor's settings:
//!
//! ```
//! use methodlog::config::InstrumentationConfig;
//! use methodlog::Level;
//!
//! let config = InstrumentationConfig::from_toml_str(r#"
//!     default_backend = "main"
//!     print_parameter_names = false
//!     printer_order = ["display", "json"]
//!     max_value_length = 120
//!     redact_patterns = ["\\d{16}"]
//!     levels = "info,app.orders=trace"
//! "#).unwrap();
//! assert!(!config.print_parameter_names);
//! let levels = config.level_config().unwrap();
//! assert_eq!(levels.level_for("app.orders.Cart.add"), Level::Trace);
//! assert_eq!(levels.level_for("app.billing.Invoice.send"), Level::Info);
//! ```

use crate::Level;
use crate::error::ConfigError;
use serde::Deserialize;
use std::str::FromStr;

/**
Effective levels by logger name.

Written as comma-separated directives: a bare level sets the default, `prefix=level` applies
to that logger and everything below it in the dotted hierarchy.  The longest matching prefix
wins.

```
use methodlog::config::LevelConfig;
use methodlog::Level;

let levels: LevelConfig = "warn,app=info,app.orders.Cart=trace".parse().unwrap();
assert_eq!(levels.level_for("app.orders.Cart.add"), Level::Trace);
assert_eq!(levels.level_for("app.orders.CartView.add"), Level::Info);
assert_eq!(levels.level_for("other.Thing.run"), Level::Warn);
```
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    default: Level,
    directives: Vec<(String, Level)>,
}

impl LevelConfig {
    /// Every logger at `default`.
    pub fn new(default: Level) -> Self {
        Self {
            default,
            directives: Vec::new(),
        }
    }

    /// Adds or replaces the directive for `prefix`.
    pub fn with_directive(mut self, prefix: impl Into<String>, level: Level) -> Self {
        let prefix = prefix.into();
        self.directives.retain(|(p, _)| *p != prefix);
        self.directives.push((prefix, level));
        self
    }

    #[inline]
    pub fn default_level(&self) -> Level {
        self.default
    }

    pub fn level_for(&self, logger: &str) -> Level {
        self.directives
            .iter()
            .filter(|(prefix, _)| covers(prefix, logger))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or(self.default, |(_, level)| *level)
    }
}

fn covers(prefix: &str, logger: &str) -> bool {
    match logger.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl FromStr for LevelConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = LevelConfig::default();
        for directive in s.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            let invalid = || ConfigError::LevelDirective(directive.to_string());
            match directive.split_once('=') {
                Some((prefix, level)) => {
                    let prefix = prefix.trim();
                    if prefix.is_empty() {
                        return Err(invalid());
                    }
                    let level = level.trim().parse::<Level>().map_err(|_| invalid())?;
                    config = config.with_directive(prefix, level);
                }
                None => config.default = directive.parse::<Level>().map_err(|_| invalid())?,
            }
        }
        Ok(config)
    }
}

/// Settings for an [`Instrumentor`](crate::instrumentor::Instrumentor).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstrumentationConfig {
    /// Backend that answers to the empty logger name.  Defaults to the first registered.
    pub default_backend: Option<String>,
    /// Render arguments as `name=value` when names are known.
    pub print_parameter_names: bool,
    /// Printer names to try first, in order.
    pub printer_order: Vec<String>,
    /// Rendered values longer than this many characters are cut.
    pub max_value_length: Option<usize>,
    /// Regular expressions whose matches are masked in rendered values.
    pub redact_patterns: Vec<String>,
    /// Level directives for the built-in backends, as parsed by [`LevelConfig`].
    pub levels: Option<String>,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            default_backend: None,
            print_parameter_names: true,
            printer_order: Vec::new(),
            max_value_length: None,
            redact_patterns: Vec::new(),
            levels: None,
        }
    }
}

impl InstrumentationConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// The parsed `levels`, or the default when unset.
    pub fn level_config(&self) -> Result<LevelConfig, ConfigError> {
        self.levels
            .as_deref()
            .map_or_else(|| Ok(LevelConfig::default()), str::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_must_end_on_segment_boundary() {
        let levels = LevelConfig::new(Level::Error).with_directive("app.ord", Level::Trace);
        assert_eq!(levels.level_for("app.orders.Cart.add"), Level::Error);
        assert_eq!(levels.level_for("app.ord"), Level::Trace);
        assert_eq!(levels.level_for("app.ord.X.y"), Level::Trace);
    }

    #[test]
    fn later_directive_replaces_earlier() {
        let levels: LevelConfig = "app=debug,app=warn".parse().unwrap();
        assert_eq!(levels.level_for("app.A.b"), Level::Warn);
    }

    #[test]
    fn bad_directives() {
        assert!(matches!("loud".parse::<LevelConfig>(), Err(ConfigError::LevelDirective(d)) if d == "loud"));
        assert!("=info".parse::<LevelConfig>().is_err());
        assert!("app=".parse::<LevelConfig>().is_err());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = InstrumentationConfig::from_toml_str("").unwrap();
        assert_eq!(config, InstrumentationConfig::default());
        assert!(config.print_parameter_names);
        assert_eq!(config.level_config().unwrap(), LevelConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            InstrumentationConfig::from_toml_str("colour = true"),
            Err(ConfigError::Toml(_))
        ));
    }
}
