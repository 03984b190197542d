// SPDX-License-Identifier: MIT OR Apache-2.0

//! The diagnostic-context interceptor.

use super::{Invocation, MethodInterceptor, Outcome, Proceed};
use crate::context::ContextScope;
use crate::descriptor::MethodDescriptor;
use crate::expression::ExpressionEvaluator;
use crate::plan_cache::ClassPlans;
use std::sync::Arc;

/**
Installs a method's context entries for the duration of each call.

Method-level entries are evaluated first, then each parameter's against its argument; a null
argument contributes nothing.  Values are written as they are evaluated, so a key declared
twice ends up with the later value.  Non-global keys are removed when the call ends, however
it ends; global keys stay.
*/
#[derive(Debug)]
pub struct ContextInterceptor {
    plans: Arc<ClassPlans>,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl ContextInterceptor {
    pub fn new(plans: Arc<ClassPlans>, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self { plans, evaluator }
    }
}

impl MethodInterceptor for ContextInterceptor {
    fn matches(&self, method: &MethodDescriptor) -> bool {
        self.plans.matches_context(method)
    }

    fn invoke(&self, invocation: Invocation<'_>, next: Proceed<'_>) -> Outcome {
        let Some(plan) = self.plans.context_plan(invocation.method) else {
            return next.proceed();
        };
        let mut scope = ContextScope::new();
        for definition in &plan.method {
            if let Some(value) = self.evaluator.evaluate(&definition.expression) {
                scope.install(definition.key.as_str(), value, definition.global);
            }
        }
        for (index, definitions) in plan.params.iter().enumerate() {
            let argument = invocation.args.get(index).and_then(Option::as_ref);
            for definition in definitions {
                if let Some(value) = self.evaluator.evaluate_with(&definition.expression, argument) {
                    scope.install(definition.key.as_str(), value, definition.global);
                }
            }
        }
        let outcome = next.proceed();
        drop(scope);
        outcome
    }
}
