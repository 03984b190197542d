// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic-context keys installed by intercepted calls.

#[cfg(test)]
mod tests {
    use methodlog::annotation::{LogEntry, Mdc};
    use methodlog::context::{ContextSnapshot, DiagnosticContext};
    use methodlog::descriptor::{ClassDescriptor, MethodDescriptor, ParamDescriptor};
    use methodlog::{InMemoryBackend, Instrumentor, InterceptorChain, TypeDesc, Value};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;

    fn instrument(class: &Arc<ClassDescriptor>) -> (Arc<InMemoryBackend>, InterceptorChain) {
        let backend = Arc::new(InMemoryBackend::new());
        let instrumentor = Instrumentor::builder().backend("main", backend.clone()).build().unwrap();
        (backend, instrumentor.chain_for(class).unwrap().unwrap())
    }

    fn jobs() -> Arc<ClassDescriptor> {
        ClassDescriptor::builder("app.Jobs")
            .method(
                MethodDescriptor::builder("run")
                    .param(ParamDescriptor::new("job", TypeDesc::plain::<String>()).annotate(Mdc::new("", "")))
                    .annotate(Mdc::global("session", "s-1"))
                    .annotate(Mdc::new("phase", "run"))
                    .annotate(LogEntry::default()),
            )
            .build()
    }

    #[test]
    fn global_keys_survive_the_call() {
        DiagnosticContext::clear();
        let class = jobs();
        let (backend, chain) = instrument(&class);
        chain
            .invoke(&class.methods()[0], &[Some(Value::from("nightly"))], || Ok(None))
            .unwrap();
        assert_eq!(DiagnosticContext::get("session").as_deref(), Some("s-1"));
        assert!(!DiagnosticContext::contains("phase"));
        assert!(!DiagnosticContext::contains("job"));

        let records = backend.records();
        let context = records[0].context();
        assert_eq!(context.get("job"), Some("nightly"));
        assert_eq!(context.get("phase"), Some("run"));
        DiagnosticContext::clear();
    }

    #[test]
    fn keys_are_removed_when_the_target_panics() {
        DiagnosticContext::clear();
        let class = jobs();
        let (_backend, chain) = instrument(&class);
        let result = catch_unwind(AssertUnwindSafe(|| {
            chain.invoke(&class.methods()[0], &[Some(Value::from("x"))], || panic!("target failed"))
        }));
        assert!(result.is_err());
        assert!(!DiagnosticContext::contains("phase"));
        assert!(!DiagnosticContext::contains("job"));
        DiagnosticContext::clear();
    }

    #[test]
    fn snapshot_carries_context_to_worker_thread() {
        DiagnosticContext::clear();
        let class = jobs();
        let (_backend, chain) = instrument(&class);
        let mut captured = None;
        chain
            .invoke(&class.methods()[0], &[Some(Value::from("batch"))], || {
                captured = Some(ContextSnapshot::capture());
                Ok(None)
            })
            .unwrap();
        let snapshot = captured.expect("target ran");
        let seen = std::thread::spawn(move || {
            snapshot.run_with(|| DiagnosticContext::get("job"))
        })
        .join()
        .unwrap();
        assert_eq!(seen.as_deref(), Some("batch"));
        DiagnosticContext::clear();
    }

    fn run_with_corr(first: Mdc, second: Mdc) -> Option<String> {
        DiagnosticContext::clear();
        let class = ClassDescriptor::builder("app.Requests")
            .method(MethodDescriptor::builder("run").annotate(first).annotate(second))
            .build();
        let (_backend, chain) = instrument(&class);
        chain.invoke(&class.methods()[0], &[], || Ok(None)).unwrap();
        let after = DiagnosticContext::get("corr");
        DiagnosticContext::clear();
        after
    }

    #[test]
    fn later_global_declaration_keeps_the_key() {
        let after = run_with_corr(Mdc::new("corr", "local"), Mdc::global("corr", "global"));
        assert_eq!(after.as_deref(), Some("global"));
    }

    #[test]
    fn later_local_declaration_removes_the_key() {
        let after = run_with_corr(Mdc::global("corr", "global"), Mdc::new("corr", "local"));
        assert_eq!(after, None);
    }

    #[test]
    fn context_is_per_thread() {
        DiagnosticContext::clear();
        DiagnosticContext::put("here", "1");
        let elsewhere = std::thread::spawn(|| DiagnosticContext::contains("here"))
            .join()
            .unwrap();
        assert!(!elsewhere);
        DiagnosticContext::clear();
    }
}
