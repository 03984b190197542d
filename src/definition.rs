// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolved logging definitions and the factory that builds them.
//!
//! A [`LoggingPlan`] is what one backend's interceptor consults on every call to one method.
//! It is immutable once built.  Plans that would never log anything are not built at all:
//! [`DefinitionFactory::logging_plan`] returns `None` instead, and likewise for
//! [`DefinitionFactory::context_plan`].
//!
//! Precedence, per backend:
//!
//! * entry: an explicit `LogEntry`, else the `Logging` shorthand, else a minimal entry
//!   synthesized when some parameter carries a `LogArg`;
//! * exit: an explicit `LogExit`, else the `Logging` shorthand;
//! * each parameter: its own `LogArg`, else the entry's defaults when the entry was declared,
//!   else nothing;
//! * errors: every `LogError`, in declaration order.

use crate::Level;
use crate::annotation::Mdc;
use crate::descriptor::{MethodDescriptor, MethodKey};
use crate::error_filter::ErrorFilter;
use crate::error_resolver::ErrorResolver;
use crate::extractor;
use crate::printer::{PrinterRegistry, ResolvedPrinter};

/// Default level of entry, exit and argument logging.
pub const DEFAULT_LEVEL: Level = Level::Debug;
/// Default level of error logging.
pub const DEFAULT_ERROR_LEVEL: Level = Level::Error;

#[derive(Debug, Clone)]
pub struct ArgDefinition {
    /// `None` defers to the entry's verbosity threshold.
    pub if_enabled: Option<Level>,
    pub printer: ResolvedPrinter,
}

#[derive(Debug, Clone)]
pub struct EntryDefinition {
    pub level: Level,
    pub if_enabled: Option<Level>,
    pub verbose: Option<Level>,
    /// Index-aligned with the method's parameters.
    pub args: Vec<Option<ArgDefinition>>,
    /// Declared explicitly or through the shorthand, as opposed to synthesized for `LogArg`s.
    pub unconditional: bool,
}

impl EntryDefinition {
    /// The level that must be enabled for values to be rendered.
    #[inline]
    pub fn verbose_threshold(&self) -> Level {
        self.verbose.unwrap_or(self.level)
    }

    pub fn has_args(&self) -> bool {
        self.args.iter().any(Option::is_some)
    }
}

#[derive(Debug, Clone)]
pub struct ExitDefinition {
    pub level: Level,
    pub if_enabled: Option<Level>,
    pub verbose: Option<Level>,
    /// `None` for a void method.
    pub printer: Option<ResolvedPrinter>,
}

impl ExitDefinition {
    #[inline]
    pub fn verbose_threshold(&self) -> Level {
        self.verbose.unwrap_or(self.level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorDefinition {
    pub level: Level,
    pub if_enabled: Option<Level>,
    /// The error is attached to the record only while this level is enabled.
    pub verbose: Option<Level>,
    pub filter: ErrorFilter,
}

impl ErrorDefinition {
    #[inline]
    pub fn verbose_threshold(&self) -> Level {
        self.verbose.unwrap_or(self.level)
    }
}

/// One key/expression pair to install in the diagnostic context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextDefinition {
    pub key: String,
    pub expression: String,
    pub global: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPlan {
    pub method: Vec<ContextDefinition>,
    /// Index-aligned with the method's parameters.
    pub params: Vec<Vec<ContextDefinition>>,
}

/// Everything one backend needs to log calls to one method.
#[derive(Debug)]
pub struct LoggingPlan {
    logger_name: String,
    method: MethodKey,
    param_names: Vec<Option<String>>,
    entry: Option<EntryDefinition>,
    exit: Option<ExitDefinition>,
    errors: ErrorResolver,
}

impl LoggingPlan {
    /// `declaring class` + `.` + `method name`.
    #[inline]
    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    #[inline]
    pub fn method(&self) -> &MethodKey {
        &self.method
    }

    #[inline]
    pub fn param_names(&self) -> &[Option<String>] {
        &self.param_names
    }

    #[inline]
    pub fn entry(&self) -> Option<&EntryDefinition> {
        self.entry.as_ref()
    }

    #[inline]
    pub fn exit(&self) -> Option<&ExitDefinition> {
        self.exit.as_ref()
    }

    #[inline]
    pub fn errors(&self) -> &ErrorResolver {
        &self.errors
    }
}

/// Builds definitions for one method at a time.
#[derive(Debug, Clone, Copy)]
pub struct DefinitionFactory<'a> {
    printers: &'a PrinterRegistry,
}

impl<'a> DefinitionFactory<'a> {
    pub fn new(printers: &'a PrinterRegistry) -> Self {
        Self { printers }
    }

    /**
    The plan for `method` as seen by the backend answering to `acceptable` names.

    `None` when the method has nothing to log for that backend.
    */
    pub fn logging_plan(&self, method: &MethodDescriptor, acceptable: &[&str]) -> Option<LoggingPlan> {
        let entry = self.entry_definition(method, acceptable);
        let exit = self.exit_definition(method, acceptable);
        let errors = self.error_definitions(method, acceptable);
        if entry.is_none() && exit.is_none() && errors.is_empty() {
            return None;
        }
        Some(LoggingPlan {
            logger_name: format!("{}.{}", method.declaring_class(), method.name()),
            method: method.key().clone(),
            param_names: method.params().iter().map(|p| p.name().map(str::to_string)).collect(),
            entry,
            exit,
            errors: ErrorResolver::new(errors),
        })
    }

    pub fn entry_definition(&self, method: &MethodDescriptor, acceptable: &[&str]) -> Option<EntryDefinition> {
        let explicit = extractor::find_by_backend_name(&extractor::log_entries(method), acceptable)
            .map(|e| (e.level, e.if_enabled, e.verbose, e.printer.as_deref()));
        let declared = explicit.or_else(|| {
            extractor::find_by_backend_name(&extractor::logging(method), acceptable)
                .map(|l| (l.level, l.if_enabled, l.verbose, l.printer.as_deref()))
        });

        let args: Vec<Option<ArgDefinition>> = method
            .params()
            .iter()
            .map(|param| {
                let own = extractor::find_by_backend_name(&extractor::log_args(param), acceptable);
                match (own, declared) {
                    (Some(arg), _) => Some(ArgDefinition {
                        if_enabled: arg.if_enabled,
                        printer: self.printers.resolve(
                            arg.printer.as_deref().or(declared.and_then(|d| d.3)),
                            param.ty(),
                        ),
                    }),
                    (None, Some((_, _, _, printer))) => Some(ArgDefinition {
                        if_enabled: None,
                        printer: self.printers.resolve(printer, param.ty()),
                    }),
                    (None, None) => None,
                }
            })
            .collect();

        match declared {
            Some((level, if_enabled, verbose, _)) => Some(EntryDefinition {
                level: level.unwrap_or(DEFAULT_LEVEL),
                if_enabled,
                verbose,
                args,
                unconditional: true,
            }),
            None if args.iter().any(Option::is_some) => Some(EntryDefinition {
                level: DEFAULT_LEVEL,
                if_enabled: None,
                verbose: None,
                args,
                unconditional: false,
            }),
            None => None,
        }
    }

    pub fn exit_definition(&self, method: &MethodDescriptor, acceptable: &[&str]) -> Option<ExitDefinition> {
        let explicit = extractor::find_by_backend_name(&extractor::log_exits(method), acceptable)
            .map(|e| (e.level, e.if_enabled, e.verbose, e.printer.as_deref()));
        let (level, if_enabled, verbose, printer) = explicit.or_else(|| {
            extractor::find_by_backend_name(&extractor::logging(method), acceptable)
                .map(|l| (l.level, l.if_enabled, l.verbose, l.printer.as_deref()))
        })?;
        let return_type = method.return_type();
        Some(ExitDefinition {
            level: level.unwrap_or(DEFAULT_LEVEL),
            if_enabled,
            verbose,
            printer: (!return_type.is_void()).then(|| self.printers.resolve(printer, return_type)),
        })
    }

    /// In declaration order, with exact repeats dropped.
    pub fn error_definitions(&self, method: &MethodDescriptor, acceptable: &[&str]) -> Vec<ErrorDefinition> {
        let mut definitions: Vec<ErrorDefinition> = Vec::new();
        for error in extractor::filter_by_backend_name(&extractor::log_errors(method), acceptable) {
            let definition = ErrorDefinition {
                level: error.level.unwrap_or(DEFAULT_ERROR_LEVEL),
                if_enabled: error.if_enabled,
                verbose: error.verbose,
                filter: ErrorFilter::build(&error.include, &error.exclude),
            };
            if !definitions.contains(&definition) {
                definitions.push(definition);
            }
        }
        definitions
    }

    /**
    The diagnostic-context plan for `method`, `None` when it declares no context entries.

    Empty keys are named after the method, the parameter, or `method[index]` for a parameter
    whose name is unavailable.  An empty parameter expression means the argument itself.
    */
    pub fn context_plan(&self, method: &MethodDescriptor) -> Option<ContextPlan> {
        let on_method: Vec<ContextDefinition> = extractor::method_mdcs(method)
            .into_iter()
            .map(|mdc| context_definition(mdc, method.name().to_string(), String::new()))
            .collect();
        let on_params: Vec<Vec<ContextDefinition>> = method
            .params()
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let fallback_key = match param.name() {
                    Some(name) => name.to_string(),
                    None => format!("{}[{}]", method.name(), index),
                };
                extractor::param_mdcs(param)
                    .into_iter()
                    .map(|mdc| context_definition(mdc, fallback_key.clone(), "#{this}".to_string()))
                    .collect()
            })
            .collect();
        if on_method.is_empty() && on_params.iter().all(Vec::is_empty) {
            return None;
        }
        Some(ContextPlan {
            method: on_method,
            params: on_params,
        })
    }
}

fn context_definition(mdc: &Mdc, fallback_key: String, fallback_expression: String) -> ContextDefinition {
    ContextDefinition {
        key: if mdc.key.is_empty() {
            fallback_key
        } else {
            mdc.key.clone()
        },
        expression: if mdc.value.is_empty() {
            fallback_expression
        } else {
            mdc.value.clone()
        },
        global: mdc.global,
    }
}
