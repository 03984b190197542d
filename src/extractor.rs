// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading declarations off descriptors.
//!
//! Everything here is a pure function of the descriptors.  The getters return the declarations
//! attached directly to a method or parameter, with repetition containers unwrapped, in
//! declaration order.

use crate::annotation::{
    LogArg, LogEntry, LogError, LogExit, Logging, Mdc, MethodAnnotation, ParamAnnotation, Targeted,
};
use crate::descriptor::{ClassDescriptor, MethodDescriptor, ParamDescriptor};
use std::sync::Arc;

/**
The methods eligible for logging plans: declared or inherited, overrides collapsed to the most
derived declaration, excluding the universal base class and anything synthetic.
*/
pub fn candidate_methods(class: &ClassDescriptor) -> Vec<Arc<MethodDescriptor>> {
    let mut seen: Vec<&Arc<MethodDescriptor>> = Vec::new();
    let mut found: Vec<Arc<MethodDescriptor>> = Vec::new();
    for current in class.hierarchy().filter(|c| !c.is_object()) {
        for method in current.methods() {
            // A bridge in a subclass overrides the erased signature it shares with a superclass method.
            if seen.iter().any(|s| s.key().same_signature(method.key())) {
                continue;
            }
            seen.push(method);
            if !method.is_synthetic() {
                found.push(method.clone());
            }
        }
    }
    found
}

/// Whether the method or any of its parameters carries any declaration.
pub fn has_any_logging_annotation(method: &MethodDescriptor) -> bool {
    !method.annotations().is_empty() || method.params().iter().any(param_has_any_logging_annotation)
}

pub fn param_has_any_logging_annotation(param: &ParamDescriptor) -> bool {
    !param.annotations().is_empty()
}

/**
The method that actually carries the declarations for `method`.

For a bridge that is its target, looked up in `class`; for anything else the method itself.
`None` only for a bridge whose target is missing.
*/
pub fn resolve_bridged(class: &ClassDescriptor, method: &Arc<MethodDescriptor>) -> Option<Arc<MethodDescriptor>> {
    if method.is_bridge() {
        class.find_method(method.resolved_key()).cloned()
    } else {
        Some(method.clone())
    }
}

macro_rules! method_getter {
    ($(#[$doc:meta])* $fn_name:ident -> $t:ident: $single:ident / $plural:ident) => {
        $(#[$doc])*
        pub fn $fn_name(method: &MethodDescriptor) -> Vec<&$t> {
            method
                .annotations()
                .iter()
                .flat_map(|a| match a {
                    MethodAnnotation::$single(one) => std::slice::from_ref(one),
                    MethodAnnotation::$plural(many) => many.as_slice(),
                    _ => &[],
                })
                .collect()
        }
    };
}

method_getter!(logging -> Logging: Logging / LoggingSet);
method_getter!(log_entries -> LogEntry: LogEntry / LogEntries);
method_getter!(log_exits -> LogExit: LogExit / LogExits);
method_getter!(log_errors -> LogError: LogError / LogErrors);
method_getter!(
    /// Method-level diagnostic-context declarations.
    method_mdcs -> Mdc: Mdc / MdcSet
);

pub fn log_args(param: &ParamDescriptor) -> Vec<&LogArg> {
    param
        .annotations()
        .iter()
        .flat_map(|a| match a {
            ParamAnnotation::LogArg(one) => std::slice::from_ref(one),
            ParamAnnotation::LogArgs(many) => many.as_slice(),
            _ => &[],
        })
        .collect()
}

pub fn param_mdcs(param: &ParamDescriptor) -> Vec<&Mdc> {
    param
        .annotations()
        .iter()
        .flat_map(|a| match a {
            ParamAnnotation::Mdc(one) => std::slice::from_ref(one),
            ParamAnnotation::MdcSet(many) => many.as_slice(),
            _ => &[],
        })
        .collect()
}

/// The first occurrence targeting one of the `acceptable` backend names.
pub fn find_by_backend_name<'a, T: Targeted>(occurrences: &[&'a T], acceptable: &[&str]) -> Option<&'a T> {
    occurrences
        .iter()
        .find(|o| acceptable.contains(&o.logger()))
        .copied()
}

/// Every occurrence targeting one of the `acceptable` backend names, in declaration order.
pub fn filter_by_backend_name<'a, T: Targeted>(occurrences: &[&'a T], acceptable: &[&str]) -> Vec<&'a T> {
    occurrences
        .iter()
        .filter(|o| acceptable.contains(&o.logger()))
        .copied()
        .collect()
}
