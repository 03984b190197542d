// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call interception.
//!
//! The host hands every call to a matched method to an [`InterceptorChain`] together with the
//! call's arguments and a continuation that performs the real call.  The chain runs the
//! interceptors that match the method, outermost first, and each decides when to
//! [`proceed`](Proceed::proceed).
//!
//! ```rust
//! use methodlog::interceptor::{Invocation, MethodInterceptor, Outcome, Proceed};
//! use methodlog::descriptor::{ClassDescriptor, MethodDescriptor};
//! use methodlog::Value;
//!
//! #[derive(Debug)]
//! struct Doubler;
//!
//! impl MethodInterceptor for Doubler {
//!     fn matches(&self, _method: &MethodDescriptor) -> bool {
//!         true
//!     }
//!     fn invoke(&self, _invocation: Invocation<'_>, next: Proceed<'_>) -> Outcome {
//!         let result = next.proceed()?;
//!         Ok(result.and_then(|v| v.downcast_ref::<i32>().map(|n| Value::from(n * 2))))
//!     }
//! }
//!
//! let class = ClassDescriptor::builder("app.Calc").method(MethodDescriptor::builder("one")).build();
//! let invocation = Invocation::new(&class.methods()[0], &[]);
//! let outcome = Doubler.invoke(invocation, Proceed::to_target(invocation, || Ok(Some(Value::from(1)))));
//! assert_eq!(outcome.unwrap().and_then(|v| v.downcast_ref::<i32>().copied()), Some(2));
//! ```

mod context;
mod logging;

#[cfg(test)]
mod tests;

pub use context::ContextInterceptor;
pub use logging::LoggingInterceptor;

use crate::descriptor::MethodDescriptor;
use crate::error_class::Thrown;
use crate::value::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// What an intercepted call produced: its result (`None` for void or null) or what it threw.
pub type Outcome = Result<Option<Value>, Thrown>;

/// One call: the method as the host saw it, and its arguments (`None` for null).
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub method: &'a MethodDescriptor,
    pub args: &'a [Option<Value>],
}

impl<'a> Invocation<'a> {
    pub fn new(method: &'a MethodDescriptor, args: &'a [Option<Value>]) -> Self {
        Self { method, args }
    }
}

pub trait MethodInterceptor: Debug + Send + Sync {
    /// Cheap: runs for every call into an instrumented class.
    fn matches(&self, method: &MethodDescriptor) -> bool;

    /// Wraps one call.  Must call `next.proceed()` exactly once and return its failure unchanged.
    fn invoke(&self, invocation: Invocation<'_>, next: Proceed<'_>) -> Outcome;
}

/// The rest of the chain, ending in the real call.  Consumed by [`proceed`](Self::proceed).
pub struct Proceed<'a> {
    rest: &'a [Arc<dyn MethodInterceptor>],
    invocation: Invocation<'a>,
    target: Box<dyn FnOnce() -> Outcome + 'a>,
}

impl<'a> Proceed<'a> {
    /// A continuation that performs the real call directly.
    pub fn to_target(invocation: Invocation<'a>, target: impl FnOnce() -> Outcome + 'a) -> Self {
        Self {
            rest: &[],
            invocation,
            target: Box::new(target),
        }
    }

    pub fn proceed(self) -> Outcome {
        let mut rest = self.rest;
        while let Some((first, tail)) = rest.split_first() {
            if first.matches(self.invocation.method) {
                return first.invoke(
                    self.invocation,
                    Proceed {
                        rest: tail,
                        invocation: self.invocation,
                        target: self.target,
                    },
                );
            }
            rest = tail;
        }
        (self.target)()
    }
}

impl Debug for Proceed<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proceed")
            .field("rest", &self.rest)
            .field("invocation", &self.invocation)
            .finish_non_exhaustive()
    }
}

/// The interceptors installed on one class, outermost first.
#[derive(Debug, Clone)]
pub struct InterceptorChain {
    class: String,
    interceptors: Vec<Arc<dyn MethodInterceptor>>,
}

impl InterceptorChain {
    pub fn new(class: impl Into<String>, interceptors: Vec<Arc<dyn MethodInterceptor>>) -> Self {
        Self {
            class: class.into(),
            interceptors,
        }
    }

    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn interceptors(&self) -> &[Arc<dyn MethodInterceptor>] {
        &self.interceptors
    }

    /// Whether any interceptor wants calls to `method`.
    pub fn matches(&self, method: &MethodDescriptor) -> bool {
        self.interceptors.iter().any(|i| i.matches(method))
    }

    /// Runs one call through the chain.  `target` performs the real call.
    pub fn invoke<'a>(
        &'a self,
        method: &'a MethodDescriptor,
        args: &'a [Option<Value>],
        target: impl FnOnce() -> Outcome + 'a,
    ) -> Outcome {
        Proceed {
            rest: &self.interceptors,
            invocation: Invocation::new(method, args),
            target: Box::new(target),
        }
        .proceed()
    }
}
