// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.
//!
//! Only two kinds of failure ever leave this crate: [`UsageError`] when a class's logging
//! declarations are inconsistent (raised once, when the class is first instrumented), and
//! [`ConfigError`] when the instrumentor itself is misconfigured.  [`PrintError`] stays inside
//! the interceptors, where a failed rendering degrades to a fallback instead of disturbing the
//! intercepted call.

/// A rule violated by a logging declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageRule {
    #[error("`{annotation}` sets level Off explicitly; omit the declaration instead")]
    DisabledLevel { annotation: &'static str },
    #[error("`{annotation}` is declared more than once for logger `{logger}`")]
    Duplicate {
        annotation: &'static str,
        logger: String,
    },
    #[error("`{annotation}` on parameter {index} is declared more than once for logger `{logger}`")]
    DuplicateOnParameter {
        annotation: &'static str,
        index: usize,
        logger: String,
    },
    #[error("`Logging` and `{annotation}` disagree for logger `{logger}`")]
    ConflictingShorthand {
        annotation: &'static str,
        logger: String,
    },
    #[error("no backend is named `{logger}`")]
    UnknownLogger { logger: String },
    #[error("`{class}` is an interface and cannot be used in an error filter")]
    InterfaceInFilter { class: &'static str },
    #[error("bridge method has no target `{target}`")]
    MissingBridgeTarget { target: String },
}

/**
An inconsistent logging declaration.

Raised when a class is instrumented; the class gets no interceptors at all.
*/
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid logging declaration on {class}.{method}: {rule}")]
pub struct UsageError {
    pub class: String,
    pub method: String,
    pub rule: UsageRule,
}

impl UsageError {
    pub fn new(class: impl Into<String>, method: impl Into<String>, rule: UsageRule) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
            rule,
        }
    }
}

/// A value could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("printer `{printer}` cannot print values of type {type_name}")]
    Unsupported {
        printer: String,
        type_name: &'static str,
    },
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("printer `{printer}` panicked")]
    Panicked { printer: String },
    #[error("{0}")]
    Failed(String),
}

/// The instrumentor could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid redact pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("invalid level directive `{0}`")]
    LevelDirective(String),
    #[error("default backend `{0}` is not registered")]
    UnknownDefaultBackend(String),
    #[error("backend name `{0}` is registered twice")]
    DuplicateBackend(String),
    #[error("no backend is registered")]
    NoBackends,
}
