// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-class plans and the cache that holds them.
//!
//! The first time a class is instrumented, every candidate method is turned into plans: one
//! diagnostic-context plan and one logging plan per backend, each left out when empty.  The
//! result is kept for the life of the process.  Concurrent first lookups of the same class
//! build it once; the others wait for that result.

use crate::definition::{ContextPlan, DefinitionFactory, LoggingPlan};
use crate::descriptor::{ClassDescriptor, MethodDescriptor, MethodKey};
use crate::error::UsageError;
use crate::extractor;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Every plan for one class.
#[derive(Debug, Default)]
pub struct ClassPlans {
    context: HashMap<MethodKey, Arc<ContextPlan>>,
    /// Index-aligned with the instrumentor's backends.
    backends: Vec<HashMap<MethodKey, Arc<LoggingPlan>>>,
}

impl ClassPlans {
    /**
    Builds the plans for `class`.

    `backend_names[i]` holds every name backend `i` answers to.
    */
    pub fn build(class: &ClassDescriptor, factory: &DefinitionFactory<'_>, backend_names: &[Vec<&str>]) -> Self {
        let mut plans = ClassPlans {
            context: HashMap::new(),
            backends: vec![HashMap::new(); backend_names.len()],
        };
        for method in extractor::candidate_methods(class) {
            if !extractor::has_any_logging_annotation(&method) {
                continue;
            }
            if let Some(context) = factory.context_plan(&method) {
                plans.context.insert(method.key().clone(), Arc::new(context));
            }
            for (map, names) in plans.backends.iter_mut().zip(backend_names) {
                if let Some(plan) = factory.logging_plan(&method, names) {
                    map.insert(method.key().clone(), Arc::new(plan));
                }
            }
        }
        tracing::debug!(
            class = class.name(),
            context_methods = plans.context.len(),
            logged_methods = plans.backends.iter().map(HashMap::len).sum::<usize>(),
            "built logging plans"
        );
        plans
    }

    /// Whether calls to `method` need the diagnostic-context interceptor.  Bridges match their target.
    #[inline]
    pub fn matches_context(&self, method: &MethodDescriptor) -> bool {
        self.context.contains_key(method.resolved_key())
    }

    /// Whether backend `backend` logs calls to `method`.  Bridges match their target.
    #[inline]
    pub fn matches(&self, backend: usize, method: &MethodDescriptor) -> bool {
        self.backends
            .get(backend)
            .is_some_and(|map| map.contains_key(method.resolved_key()))
    }

    #[inline]
    pub fn context_plan(&self, method: &MethodDescriptor) -> Option<&Arc<ContextPlan>> {
        self.context.get(method.resolved_key())
    }

    #[inline]
    pub fn logging_plan(&self, backend: usize, method: &MethodDescriptor) -> Option<&Arc<LoggingPlan>> {
        self.backends.get(backend)?.get(method.resolved_key())
    }

    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }

    /// Whether backend `backend` has anything to log for this class at all.
    pub fn has_backend(&self, backend: usize) -> bool {
        self.backends.get(backend).is_some_and(|map| !map.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        !self.has_context() && self.backends.iter().all(HashMap::is_empty)
    }
}

type Slot = Arc<OnceLock<Result<Arc<ClassPlans>, UsageError>>>;

/// Plans by class name.  Entries are never invalidated.
#[derive(Debug, Default)]
pub struct PlanCache {
    classes: RwLock<HashMap<String, Slot>>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached plans for `class`, building them with `build` on first sight.
    ///
    /// A failed build is cached too: the class stays uninstrumentable.
    pub fn get_or_build(
        &self,
        class: &ClassDescriptor,
        build: impl FnOnce() -> Result<ClassPlans, UsageError>,
    ) -> Result<Arc<ClassPlans>, UsageError> {
        let slot = self.slot(class.name());
        slot.get_or_init(|| build().map(Arc::new)).clone()
    }

    /// Plans already built for `class`, if any.
    pub fn get(&self, class: &str) -> Option<Result<Arc<ClassPlans>, UsageError>> {
        let classes = self.classes.read().unwrap_or_else(PoisonError::into_inner);
        classes.get(class)?.get().cloned()
    }

    pub fn len(&self) -> usize {
        self.classes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, class: &str) -> Slot {
        if let Some(slot) = self
            .classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(class)
        {
            return slot.clone();
        }
        self.classes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(class.to_string())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{LogEntry, Logging, Mdc};
    use crate::descriptor::{OBJECT_CLASS, ParamDescriptor};
    use crate::printer::PrinterRegistry;
    use crate::value::TypeDesc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn names() -> Vec<Vec<&'static str>> {
        vec![vec!["main", ""], vec!["audit"]]
    }

    fn repo() -> Arc<ClassDescriptor> {
        ClassDescriptor::builder("app.Repo")
            .method(
                MethodDescriptor::builder("save")
                    .param(ParamDescriptor::new("user", TypeDesc::named("app.User")))
                    .annotate(Logging::default()),
            )
            .method(
                MethodDescriptor::builder("save")
                    .param(ParamDescriptor::unnamed(TypeDesc::named(OBJECT_CLASS)))
                    .bridge_to(&["app.User"]),
            )
            .method(MethodDescriptor::builder("count"))
            .method(MethodDescriptor::builder("tag").annotate(Mdc::new("op", "tag")))
            .build()
    }

    #[test]
    fn unannotated_methods_do_not_match() {
        let registry = PrinterRegistry::new();
        let factory = DefinitionFactory::new(&registry);
        let class = repo();
        let plans = ClassPlans::build(&class, &factory, &names());
        let count = &class.methods()[2];
        assert!(!plans.matches(0, count));
        assert!(!plans.matches_context(count));
        assert!(plans.has_backend(0));
        assert!(!plans.has_backend(1));
        assert!(plans.has_context());
    }

    #[test]
    fn bridge_matches_same_plan() {
        let registry = PrinterRegistry::new();
        let factory = DefinitionFactory::new(&registry);
        let class = repo();
        let plans = ClassPlans::build(&class, &factory, &names());
        let (real, bridge) = (&class.methods()[0], &class.methods()[1]);
        assert!(plans.matches(0, real));
        assert!(plans.matches(0, bridge));
        let a = plans.logging_plan(0, real).expect("plan");
        let b = plans.logging_plan(0, bridge).expect("plan");
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn inherited_methods_are_planned_under_declaring_key() {
        let registry = PrinterRegistry::new();
        let factory = DefinitionFactory::new(&registry);
        let base = ClassDescriptor::builder("app.Base")
            .method(MethodDescriptor::builder("run").annotate(LogEntry {
                logger: "audit".to_string(),
                ..Default::default()
            }))
            .build();
        let child = ClassDescriptor::builder("app.Child").extends(base.clone()).build();
        let plans = ClassPlans::build(&child, &factory, &names());
        assert!(plans.matches(1, &base.methods()[0]));
        assert!(!plans.matches(0, &base.methods()[0]));
    }

    #[test]
    fn cache_builds_each_class_once() {
        let cache = PlanCache::new();
        let class = repo();
        let builds = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let plans = cache.get_or_build(&class, || {
                        builds.fetch_add(1, Ordering::SeqCst);
                        Ok(ClassPlans::default())
                    });
                    assert!(plans.is_ok());
                });
            }
        });
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("app.Repo").is_some());
    }

    #[test]
    fn failures_are_cached() {
        let cache = PlanCache::new();
        let class = repo();
        let err = UsageError::new(
            "app.Repo",
            "save",
            crate::error::UsageRule::UnknownLogger {
                logger: "x".to_string(),
            },
        );
        assert!(cache.get_or_build(&class, || Err(err.clone())).is_err());
        assert!(cache.get_or_build(&class, || Ok(ClassPlans::default())).is_err());
    }
}
