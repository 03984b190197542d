// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests for the interceptors.

use super::*;
use crate::annotation::{LogArg, LogEntry, LogError, LogExit, Logging, Mdc};
use crate::context::DiagnosticContext;
use crate::definition::DefinitionFactory;
use crate::descriptor::{ClassDescriptor, ParamDescriptor};
use crate::error_class::{Exception, ILLEGAL_ARGUMENT_EXCEPTION, IO_EXCEPTION, RUNTIME_EXCEPTION, Throwable};
use crate::expression::TemplateEvaluator;
use crate::inmemory_backend::InMemoryBackend;
use crate::level::Level;
use crate::plan_cache::ClassPlans;
use crate::printer::PrinterRegistry;
use crate::value::TypeDesc;
use std::sync::Mutex;

#[derive(Debug)]
struct Recorder {
    name: &'static str,
    seen: Arc<Mutex<Vec<String>>>,
}

impl MethodInterceptor for Recorder {
    fn matches(&self, method: &MethodDescriptor) -> bool {
        method.name() != "skip"
    }

    fn invoke(&self, _invocation: Invocation<'_>, next: Proceed<'_>) -> Outcome {
        self.seen.lock().unwrap().push(format!("{} in", self.name));
        let outcome = next.proceed();
        self.seen.lock().unwrap().push(format!("{} out", self.name));
        outcome
    }
}

fn plans(class: &ClassDescriptor) -> Arc<ClassPlans> {
    let registry = PrinterRegistry::new();
    Arc::new(ClassPlans::build(class, &DefinitionFactory::new(&registry), &[vec!["main", ""]]))
}

fn logging(class: &ClassDescriptor, backend: &Arc<InMemoryBackend>) -> InterceptorChain {
    InterceptorChain::new(
        class.name(),
        vec![Arc::new(LoggingInterceptor::new(backend.clone(), 0, plans(class), true))],
    )
}

#[test]
fn chain_runs_outermost_first() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let chain = InterceptorChain::new(
        "app.T",
        vec![
            Arc::new(Recorder { name: "a", seen: seen.clone() }),
            Arc::new(Recorder { name: "b", seen: seen.clone() }),
        ],
    );
    let class = ClassDescriptor::builder("app.T")
        .method(MethodDescriptor::builder("run"))
        .method(MethodDescriptor::builder("skip"))
        .build();
    let inner = seen.clone();
    chain
        .invoke(&class.methods()[0], &[], || {
            inner.lock().unwrap().push("target".to_string());
            Ok(None)
        })
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), ["a in", "b in", "target", "b out", "a out"]);

    seen.lock().unwrap().clear();
    assert!(!chain.matches(&class.methods()[1]));
    chain.invoke(&class.methods()[1], &[], || Ok(None)).unwrap();
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn context_is_removed_after_success_and_failure() {
    DiagnosticContext::clear();
    let class = ClassDescriptor::builder("app.Orders")
        .method(
            MethodDescriptor::builder("place")
                .param(ParamDescriptor::new("id", TypeDesc::plain::<i32>()).annotate(Mdc::new("order", "")))
                .annotate(Mdc::new("op", "place"))
                .annotate(Mdc::global("corr", "c-1")),
        )
        .build();
    let chain = InterceptorChain::new(
        class.name(),
        vec![Arc::new(ContextInterceptor::new(plans(&class), Arc::new(TemplateEvaluator)))],
    );
    let method = &class.methods()[0];
    let args = [Some(Value::from(7))];

    let outcome = chain.invoke(method, &args, || {
        assert_eq!(DiagnosticContext::get("op").as_deref(), Some("place"));
        assert_eq!(DiagnosticContext::get("order").as_deref(), Some("7"));
        Ok(None)
    });
    assert!(outcome.is_ok());
    assert!(!DiagnosticContext::contains("op"));
    assert!(!DiagnosticContext::contains("order"));
    assert_eq!(DiagnosticContext::get("corr").as_deref(), Some("c-1"));

    DiagnosticContext::clear();
    let outcome = chain.invoke(method, &args, || {
        Err(Box::new(Exception::new(&RUNTIME_EXCEPTION, "boom")) as Thrown)
    });
    assert!(outcome.is_err());
    assert!(!DiagnosticContext::contains("op"));
    assert!(DiagnosticContext::contains("corr"));
    DiagnosticContext::clear();
}

#[test]
fn null_argument_contributes_no_context() {
    DiagnosticContext::clear();
    let class = ClassDescriptor::builder("app.Orders")
        .method(
            MethodDescriptor::builder("find")
                .param(ParamDescriptor::new("id", TypeDesc::plain::<i32>()).annotate(Mdc::new("id", ""))),
        )
        .build();
    let chain = InterceptorChain::new(
        class.name(),
        vec![Arc::new(ContextInterceptor::new(plans(&class), Arc::new(TemplateEvaluator)))],
    );
    chain
        .invoke(&class.methods()[0], &[None], || {
            assert!(!DiagnosticContext::contains("id"));
            Ok(None)
        })
        .unwrap();
}

#[test]
fn entry_and_exit_with_values() {
    let backend = Arc::new(InMemoryBackend::new());
    let class = ClassDescriptor::builder("app.Calc")
        .method(
            MethodDescriptor::builder("add")
                .param(ParamDescriptor::new("a", TypeDesc::plain::<i32>()))
                .param(ParamDescriptor::new("b", TypeDesc::plain::<i32>()))
                .returns(TypeDesc::plain::<i32>())
                .annotate(Logging::default()),
        )
        .build();
    let chain = logging(&class, &backend);
    let args = [Some(Value::from(1)), Some(Value::from(2))];
    let outcome = chain.invoke(&class.methods()[0], &args, || Ok(Some(Value::from(3))));
    assert_eq!(outcome.unwrap().and_then(|v| v.downcast_ref::<i32>().copied()), Some(3));
    assert_eq!(backend.messages(), ["> a=1, b=2", "< 3"]);
    let records = backend.records();
    assert_eq!(records[0].logger(), "app.Calc.add");
    assert_eq!(records[0].level(), Level::Debug);
}

#[test]
fn nothing_logged_below_effective_level() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.set_level(Level::Info);
    let class = ClassDescriptor::builder("app.Calc")
        .method(MethodDescriptor::builder("tick").annotate(Logging::default()))
        .build();
    logging(&class, &backend)
        .invoke(&class.methods()[0], &[], || Ok(None))
        .unwrap();
    assert!(backend.records().is_empty());
}

#[test]
fn if_enabled_gates_entry() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.set_level(Level::Debug);
    let class = ClassDescriptor::builder("app.Calc")
        .method(MethodDescriptor::builder("tick").annotate(LogEntry {
            level: Some(Level::Info),
            if_enabled: Some(Level::Trace),
            ..Default::default()
        }))
        .build();
    let chain = logging(&class, &backend);
    chain.invoke(&class.methods()[0], &[], || Ok(None)).unwrap();
    assert!(backend.records().is_empty());

    backend.set_level(Level::Trace);
    chain.invoke(&class.methods()[0], &[], || Ok(None)).unwrap();
    assert_eq!(backend.messages(), [">"]);
}

#[test]
fn argument_only_entry_needs_an_argument() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.set_level(Level::Info);
    let class = ClassDescriptor::builder("app.Users")
        .method(
            MethodDescriptor::builder("rename").param(
                ParamDescriptor::new("name", TypeDesc::plain::<String>()).annotate(LogArg {
                    if_enabled: Some(Level::Trace),
                    ..Default::default()
                }),
            ),
        )
        .build();
    let chain = logging(&class, &backend);
    let args = [Some(Value::from("bob"))];
    chain.invoke(&class.methods()[0], &args, || Ok(None)).unwrap();
    assert!(backend.records().is_empty());

    backend.set_level(Level::Trace);
    chain.invoke(&class.methods()[0], &args, || Ok(None)).unwrap();
    assert_eq!(backend.messages(), ["> name=\"bob\""]);
}

#[test]
fn error_then_emergency_exit() {
    let backend = Arc::new(InMemoryBackend::new());
    let class = ClassDescriptor::builder("app.Files")
        .method(
            MethodDescriptor::builder("read")
                .annotate(LogExit::default())
                .annotate(LogError {
                    include: vec![&IO_EXCEPTION],
                    ..Default::default()
                }),
        )
        .build();
    let chain = logging(&class, &backend);
    let error: Thrown = Box::new(Exception::new(&IO_EXCEPTION, "disk gone"));
    let sent: *const dyn Throwable = &*error;
    let outcome = chain.invoke(&class.methods()[0], &[], || Err(error));
    let thrown = outcome.unwrap_err();
    assert!(std::ptr::addr_eq(&*thrown as *const dyn Throwable, sent));
    assert_eq!(backend.messages(), ["! IOException: disk gone", "<!"]);
    let records = backend.records();
    assert_eq!(records[0].level(), Level::Error);
    assert_eq!(records[0].error(), Some("IOException: disk gone"));
    assert_eq!(records[1].level(), Level::Debug);
}

#[test]
fn unmatched_error_still_gets_emergency_exit() {
    let backend = Arc::new(InMemoryBackend::new());
    let class = ClassDescriptor::builder("app.Files")
        .method(
            MethodDescriptor::builder("read")
                .annotate(LogExit::default())
                .annotate(LogError {
                    include: vec![&IO_EXCEPTION],
                    ..Default::default()
                }),
        )
        .build();
    let outcome = logging(&class, &backend).invoke(&class.methods()[0], &[], || {
        Err(Box::new(Exception::new(&ILLEGAL_ARGUMENT_EXCEPTION, "no")) as Thrown)
    });
    assert!(outcome.is_err());
    assert_eq!(backend.messages(), ["<!"]);
}

#[test]
fn terse_error_below_verbose_threshold() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.set_level(Level::Warn);
    let class = ClassDescriptor::builder("app.Files")
        .method(MethodDescriptor::builder("read").annotate(LogError {
            level: Some(Level::Warn),
            verbose: Some(Level::Debug),
            ..Default::default()
        }))
        .build();
    let outcome = logging(&class, &backend).invoke(&class.methods()[0], &[], || {
        Err(Box::new(Exception::new(&RUNTIME_EXCEPTION, "oops")) as Thrown)
    });
    assert!(outcome.is_err());
    assert_eq!(backend.messages(), ["! RuntimeException"]);
    assert_eq!(backend.records()[0].error(), None);
}
