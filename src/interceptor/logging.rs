// SPDX-License-Identifier: MIT OR Apache-2.0

//! The logging interceptor.

use super::{Invocation, MethodInterceptor, Outcome, Proceed};
use crate::backend::LogBackend;
use crate::definition::LoggingPlan;
use crate::descriptor::MethodDescriptor;
use crate::error_class::Throwable;
use crate::level::gate_satisfied;
use crate::message::{self, EMERGENCY_EXIT};
use crate::plan_cache::ClassPlans;
use crate::value::Value;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/**
Logs entry, exit and errors of matched calls to one backend.

Every phase asks the backend for the effective level of the plan's logger first and does
nothing more unless the definition's level, and its `if_enabled` gate if any, are enabled.
What the call returned or threw is handed back untouched; a failure while logging is reported
through `tracing` and otherwise ignored.
*/
#[derive(Debug)]
pub struct LoggingInterceptor {
    backend: Arc<dyn LogBackend>,
    backend_index: usize,
    plans: Arc<ClassPlans>,
    print_parameter_names: bool,
}

impl LoggingInterceptor {
    /// `backend_index` is the backend's position in the plans.
    pub fn new(
        backend: Arc<dyn LogBackend>,
        backend_index: usize,
        plans: Arc<ClassPlans>,
        print_parameter_names: bool,
    ) -> Self {
        Self {
            backend,
            backend_index,
            plans,
            print_parameter_names,
        }
    }

    fn log_entry(&self, plan: &LoggingPlan, args: &[Option<Value>]) {
        let Some(entry) = plan.entry() else {
            return;
        };
        if !entry.unconditional && !entry.has_args() {
            return;
        }
        let logger = plan.logger_name();
        let effective = self.backend.effective_level(logger);
        if !entry.level.is_enabled(effective) || !gate_satisfied(entry.if_enabled, effective) {
            return;
        }
        let clause = message::argument_clause(entry, plan.param_names(), args, effective, self.print_parameter_names);
        if clause.is_empty() {
            // An entry that exists only to carry arguments has nothing to say without them.
            if entry.unconditional {
                self.backend.log(logger, entry.level, message::ENTRY);
            }
        } else {
            self.backend
                .log(logger, entry.level, &format!("{} {}", message::ENTRY, clause));
        }
    }

    fn log_exit(&self, plan: &LoggingPlan, result: Option<&Value>) {
        let Some(exit) = plan.exit() else {
            return;
        };
        let logger = plan.logger_name();
        let effective = self.backend.effective_level(logger);
        if !exit.level.is_enabled(effective) || !gate_satisfied(exit.if_enabled, effective) {
            return;
        }
        self.backend
            .log(logger, exit.level, &message::exit_message(exit, result, effective));
    }

    fn log_thrown(&self, plan: &LoggingPlan, thrown: &dyn Throwable) {
        let logger = plan.logger_name();
        let effective = self.backend.effective_level(logger);
        if let Some(error) = plan.errors().resolve(thrown.error_class()) {
            if error.level.is_enabled(effective) && gate_satisfied(error.if_enabled, effective) {
                if error.verbose_threshold().is_enabled(effective) {
                    self.backend.log_with_error(
                        logger,
                        error.level,
                        &message::error_message(thrown, true),
                        thrown,
                    );
                } else {
                    self.backend
                        .log(logger, error.level, &message::error_message(thrown, false));
                }
            }
        }
        if let Some(exit) = plan.exit() {
            if exit.level.is_enabled(effective) && gate_satisfied(exit.if_enabled, effective) {
                self.backend.log(logger, exit.level, EMERGENCY_EXIT);
            }
        }
    }

    fn guarded(&self, plan: &LoggingPlan, phase: &'static str, f: impl FnOnce()) {
        if catch_unwind(AssertUnwindSafe(f)).is_err() {
            tracing::warn!(logger = plan.logger_name(), phase, "logging panicked; call unaffected");
        }
    }
}

impl MethodInterceptor for LoggingInterceptor {
    fn matches(&self, method: &MethodDescriptor) -> bool {
        self.plans.matches(self.backend_index, method)
    }

    fn invoke(&self, invocation: Invocation<'_>, next: Proceed<'_>) -> Outcome {
        let Some(plan) = self.plans.logging_plan(self.backend_index, invocation.method) else {
            return next.proceed();
        };
        self.guarded(plan, "entry", || self.log_entry(plan, invocation.args));
        match next.proceed() {
            Ok(result) => {
                self.guarded(plan, "exit", || self.log_exit(plan, result.as_ref()));
                Ok(result)
            }
            Err(thrown) => {
                self.guarded(plan, "error", || self.log_thrown(plan, &*thrown));
                Err(thrown)
            }
        }
    }
}
