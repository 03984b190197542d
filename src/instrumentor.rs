// SPDX-License-Identifier: MIT OR Apache-2.0

//! Putting it together.
//!
//! An [`Instrumentor`] owns the named backends, the printer registry, the expression evaluator
//! and the plan cache.  The interception host asks it once per class for an
//! [`InterceptorChain`] and routes calls to matched methods through that chain.
//!
//! ```
//! use methodlog::annotation::Logging;
//! use methodlog::descriptor::{ClassDescriptor, MethodDescriptor};
//! use methodlog::instrumentor::Instrumentor;
//! use methodlog::InMemoryBackend;
//! use std::sync::Arc;
//!
//! let memory = Arc::new(InMemoryBackend::new());
//! let instrumentor = Instrumentor::builder().backend("main", memory.clone()).build().unwrap();
//!
//! let class = ClassDescriptor::builder("app.Jobs")
//!     .method(MethodDescriptor::builder("run").annotate(Logging::default()))
//!     .method(MethodDescriptor::builder("idle"))
//!     .build();
//! let chain = instrumentor.chain_for(&class).unwrap().expect("run is logged");
//!
//! let run = &class.methods()[0];
//! assert!(chain.matches(run));
//! assert!(!chain.matches(&class.methods()[1]));
//! chain.invoke(run, &[], || Ok(None)).unwrap();
//! assert_eq!(memory.messages(), [">", "<"]);
//! ```

use crate::backend::LogBackend;
use crate::config::{InstrumentationConfig, LevelConfig};
use crate::definition::DefinitionFactory;
use crate::descriptor::ClassDescriptor;
use crate::error::{ConfigError, UsageError};
use crate::expression::{ExpressionEvaluator, TemplateEvaluator};
use crate::interceptor::{ContextInterceptor, InterceptorChain, LoggingInterceptor, MethodInterceptor};
use crate::plan_cache::{ClassPlans, PlanCache};
use crate::printer::{PostProcessor, PrinterRegistry, Redact, Truncate, ValuePrinter};
use crate::validation;
use std::sync::Arc;

/// Replacement text for redacted matches.
pub const REDACTED: &str = "***";

#[derive(Debug)]
struct NamedBackend {
    name: String,
    aliases: Vec<String>,
    backend: Arc<dyn LogBackend>,
}

#[derive(Debug)]
pub struct Instrumentor {
    backends: Vec<NamedBackend>,
    default_backend: usize,
    printers: PrinterRegistry,
    evaluator: Arc<dyn ExpressionEvaluator>,
    print_parameter_names: bool,
    cache: PlanCache,
}

impl Instrumentor {
    pub fn builder() -> InstrumentorBuilder {
        InstrumentorBuilder::default()
    }

    /// The backend a declaration's `logger` selects.  The empty name selects the default backend.
    pub fn backend_index(&self, logger: &str) -> Option<usize> {
        if logger.is_empty() {
            return Some(self.default_backend);
        }
        self.backends
            .iter()
            .position(|b| b.name == logger || b.aliases.iter().any(|a| a == logger))
    }

    pub fn backend(&self, name: &str) -> Option<&Arc<dyn LogBackend>> {
        self.backend_index(name).map(|i| &self.backends[i].backend)
    }

    /// Backend names in registration order.
    pub fn backend_names(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(|b| b.name.as_str())
    }

    pub fn printers(&self) -> &PrinterRegistry {
        &self.printers
    }

    /// Checks `class`'s declarations without building anything.
    pub fn validate(&self, class: &ClassDescriptor) -> Result<(), UsageError> {
        validation::validate_class(class, &|logger| self.backend_index(logger))
    }

    /// The plans for `class`, validated and built on first call and cached afterwards.
    pub fn plans_for(&self, class: &ClassDescriptor) -> Result<Arc<ClassPlans>, UsageError> {
        self.cache.get_or_build(class, || {
            self.validate(class).inspect_err(|e| {
                tracing::warn!(class = class.name(), error = %e, "refusing to instrument class");
            })?;
            let names = self.acceptable_names();
            Ok(ClassPlans::build(class, &DefinitionFactory::new(&self.printers), &names))
        })
    }

    /**
    The interceptors to install on `class`.

    Context handling comes first, then one logging interceptor per backend that has anything
    to log for this class, in registration order.  `None` when nothing applies.
    */
    pub fn chain_for(&self, class: &Arc<ClassDescriptor>) -> Result<Option<InterceptorChain>, UsageError> {
        let plans = self.plans_for(class)?;
        let mut interceptors: Vec<Arc<dyn MethodInterceptor>> = Vec::new();
        if plans.has_context() {
            interceptors.push(Arc::new(ContextInterceptor::new(plans.clone(), self.evaluator.clone())));
        }
        for (index, named) in self.backends.iter().enumerate() {
            if plans.has_backend(index) {
                interceptors.push(Arc::new(LoggingInterceptor::new(
                    named.backend.clone(),
                    index,
                    plans.clone(),
                    self.print_parameter_names,
                )));
            }
        }
        if interceptors.is_empty() {
            return Ok(None);
        }
        Ok(Some(InterceptorChain::new(class.name(), interceptors)))
    }

    fn acceptable_names(&self) -> Vec<Vec<&str>> {
        self.backends
            .iter()
            .enumerate()
            .map(|(index, b)| {
                let mut names = vec![b.name.as_str()];
                names.extend(b.aliases.iter().map(String::as_str));
                if index == self.default_backend {
                    names.push("");
                }
                names
            })
            .collect()
    }
}

pub struct InstrumentorBuilder {
    backends: Vec<NamedBackend>,
    default_backend: Option<String>,
    printers: PrinterRegistry,
    printer_order: Vec<String>,
    post_processors: Vec<Arc<dyn PostProcessor>>,
    evaluator: Arc<dyn ExpressionEvaluator>,
    print_parameter_names: bool,
    levels: Option<LevelConfig>,
}

impl Default for InstrumentorBuilder {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
            default_backend: None,
            printers: PrinterRegistry::new(),
            printer_order: Vec::new(),
            post_processors: Vec::new(),
            evaluator: Arc::new(TemplateEvaluator),
            print_parameter_names: true,
            levels: None,
        }
    }
}

impl InstrumentorBuilder {
    /// Registers a backend.  The first one registered is the default unless one is named.
    pub fn backend(mut self, name: impl Into<String>, backend: Arc<dyn LogBackend>) -> Self {
        self.backends.push(NamedBackend {
            name: name.into(),
            aliases: Vec::new(),
            backend,
        });
        self
    }

    /// Another name for the most recently registered backend.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let Some(last) = self.backends.last_mut() {
            last.aliases.push(alias.into());
        }
        self
    }

    pub fn default_backend(mut self, name: impl Into<String>) -> Self {
        self.default_backend = Some(name.into());
        self
    }

    /// Adds a printer at the lowest priority.
    pub fn printer(mut self, printer: Arc<dyn ValuePrinter>) -> Self {
        self.printers.register(printer);
        self
    }

    /// Replaces the built-in printers entirely.
    pub fn printers(mut self, printers: Vec<Arc<dyn ValuePrinter>>) -> Self {
        self.printers = PrinterRegistry::with_printers(printers);
        self
    }

    pub fn printer_order(mut self, order: &[String]) -> Self {
        self.printer_order = order.to_vec();
        self
    }

    pub fn post_processor(mut self, stage: Arc<dyn PostProcessor>) -> Self {
        self.post_processors.push(stage);
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn print_parameter_names(mut self, enabled: bool) -> Self {
        self.print_parameter_names = enabled;
        self
    }

    /// Level directives handed to every registered backend when the instrumentor is built.
    pub fn levels(mut self, levels: LevelConfig) -> Self {
        self.levels = Some(levels);
        self
    }

    /**
    Applies file configuration.  Redaction runs before truncation.

    `levels`, when present, reaches every backend registered before or after this call, through
    [`LogBackend::configure_levels`].
    */
    pub fn config(mut self, config: &InstrumentationConfig) -> Result<Self, ConfigError> {
        if config.levels.is_some() {
            self.levels = Some(config.level_config()?);
        }
        if let Some(name) = &config.default_backend {
            self.default_backend = Some(name.clone());
        }
        self.print_parameter_names = config.print_parameter_names;
        if !config.printer_order.is_empty() {
            self.printer_order = config.printer_order.clone();
        }
        for pattern in &config.redact_patterns {
            self.post_processors.push(Arc::new(Redact::new(pattern, REDACTED)?));
        }
        if let Some(max_chars) = config.max_value_length {
            self.post_processors.push(Arc::new(Truncate { max_chars }));
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Instrumentor, ConfigError> {
        if self.backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        let mut seen: Vec<&str> = Vec::new();
        for name in self
            .backends
            .iter()
            .flat_map(|b| std::iter::once(&b.name).chain(&b.aliases))
        {
            if seen.contains(&name.as_str()) {
                return Err(ConfigError::DuplicateBackend(name.clone()));
            }
            seen.push(name);
        }
        let default_backend = match &self.default_backend {
            None => 0,
            Some(name) => self
                .backends
                .iter()
                .position(|b| b.name == *name || b.aliases.contains(name))
                .ok_or_else(|| ConfigError::UnknownDefaultBackend(name.clone()))?,
        };
        if let Some(levels) = &self.levels {
            for named in &self.backends {
                named.backend.configure_levels(levels.clone());
            }
        }
        let mut printers = self.printers;
        printers.prioritize(&self.printer_order);
        for stage in self.post_processors {
            printers.add_post_processor(stage);
        }
        tracing::debug!(
            backends = self.backends.len(),
            default = self.backends[default_backend].name.as_str(),
            "instrumentor ready"
        );
        Ok(Instrumentor {
            backends: self.backends,
            default_backend,
            printers,
            evaluator: self.evaluator,
            print_parameter_names: self.print_parameter_names,
            cache: PlanCache::new(),
        })
    }
}
