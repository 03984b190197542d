// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consistency checks on logging declarations.
//!
//! Runs before any plan is built for a class.  The first violation found is reported and the
//! class is not instrumented.

use crate::Level;
use crate::annotation::{LogArg, LogEntry, LogExit, Logging, Targeted};
use crate::descriptor::{ClassDescriptor, MethodDescriptor};
use crate::error::{UsageError, UsageRule};
use crate::extractor;

/// Checks every method `class` declares or inherits, bridges included.
///
/// `backend_index` maps a declared logger name to the backend it selects.
pub fn validate_class(class: &ClassDescriptor, backend_index: &dyn Fn(&str) -> Option<usize>) -> Result<(), UsageError> {
    for current in class.hierarchy().filter(|c| !c.is_object()) {
        for method in current.methods() {
            if method.is_bridge() {
                if extractor::resolve_bridged(class, method).is_none() {
                    return Err(UsageError::new(
                        method.declaring_class(),
                        method.name(),
                        UsageRule::MissingBridgeTarget {
                            target: method.resolved_key().to_string(),
                        },
                    ));
                }
                continue;
            }
            validate_method(method, backend_index)?;
        }
    }
    Ok(())
}

pub fn validate_method(method: &MethodDescriptor, backend_index: &dyn Fn(&str) -> Option<usize>) -> Result<(), UsageError> {
    let fail = |rule| UsageError::new(method.declaring_class(), method.name(), rule);

    let logging = extractor::logging(method);
    let entries = extractor::log_entries(method);
    let exits = extractor::log_exits(method);
    let errors = extractor::log_errors(method);

    check_kind(&logging, backend_index, true).map_err(fail)?;
    check_kind(&entries, backend_index, true).map_err(fail)?;
    check_kind(&exits, backend_index, true).map_err(fail)?;
    // LogError is repeatable per backend.
    check_kind(&errors, backend_index, false).map_err(fail)?;

    for error in &errors {
        if let Some(class) = error.include.iter().chain(&error.exclude).find(|c| c.is_interface()) {
            return Err(fail(UsageRule::InterfaceInFilter { class: class.name() }));
        }
    }

    for shorthand in &logging {
        let backend = backend_index(&shorthand.logger);
        if let Some(entry) = entries.iter().find(|e| backend_index(&e.logger) == backend) {
            if !entry_agrees(shorthand, entry) {
                return Err(fail(UsageRule::ConflictingShorthand {
                    annotation: LogEntry::KIND,
                    logger: entry.logger.clone(),
                }));
            }
        }
        if let Some(exit) = exits.iter().find(|e| backend_index(&e.logger) == backend) {
            if !exit_agrees(shorthand, exit) {
                return Err(fail(UsageRule::ConflictingShorthand {
                    annotation: LogExit::KIND,
                    logger: exit.logger.clone(),
                }));
            }
        }
    }

    for (index, param) in method.params().iter().enumerate() {
        let args = extractor::log_args(param);
        let mut seen: Vec<usize> = Vec::with_capacity(args.len());
        for arg in &args {
            let backend = backend_index(&arg.logger).ok_or_else(|| {
                fail(UsageRule::UnknownLogger {
                    logger: arg.logger.clone(),
                })
            })?;
            if seen.contains(&backend) {
                return Err(fail(UsageRule::DuplicateOnParameter {
                    annotation: LogArg::KIND,
                    index,
                    logger: arg.logger.clone(),
                }));
            }
            seen.push(backend);
        }
    }
    Ok(())
}

fn check_kind<T: Targeted>(
    occurrences: &[&T],
    backend_index: &dyn Fn(&str) -> Option<usize>,
    unique: bool,
) -> Result<(), UsageRule> {
    let mut seen: Vec<usize> = Vec::with_capacity(occurrences.len());
    for occurrence in occurrences {
        if occurrence.level() == Some(Level::Off) {
            return Err(UsageRule::DisabledLevel { annotation: T::KIND });
        }
        let backend = backend_index(occurrence.logger()).ok_or_else(|| UsageRule::UnknownLogger {
            logger: occurrence.logger().to_string(),
        })?;
        if unique && seen.contains(&backend) {
            return Err(UsageRule::Duplicate {
                annotation: T::KIND,
                logger: occurrence.logger().to_string(),
            });
        }
        seen.push(backend);
    }
    Ok(())
}

fn entry_agrees(shorthand: &Logging, entry: &LogEntry) -> bool {
    shorthand.level == entry.level
        && shorthand.if_enabled == entry.if_enabled
        && shorthand.verbose == entry.verbose
        && shorthand.printer == entry.printer
}

fn exit_agrees(shorthand: &Logging, exit: &LogExit) -> bool {
    shorthand.level == exit.level
        && shorthand.if_enabled == exit.if_enabled
        && shorthand.verbose == exit.verbose
        && shorthand.printer == exit.printer
}
