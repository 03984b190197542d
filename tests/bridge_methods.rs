// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridge methods log through the method they forward to.

#[cfg(test)]
mod tests {
    use methodlog::annotation::{LogArg, Logging};
    use methodlog::descriptor::{ClassDescriptor, MethodDescriptor, OBJECT_CLASS, ParamDescriptor};
    use methodlog::{InMemoryBackend, Instrumentor, TypeDesc, UsageRule, Value};
    use std::sync::Arc;

    fn repository(with_target: bool) -> Arc<ClassDescriptor> {
        let mut builder = ClassDescriptor::builder("app.UserRepository");
        if with_target {
            builder = builder.method(
                MethodDescriptor::builder("save")
                    .param(ParamDescriptor::new("user", TypeDesc::plain::<String>()))
                    .annotate(Logging::default()),
            );
        }
        builder
            .method(
                MethodDescriptor::builder("save")
                    .param(ParamDescriptor::unnamed(TypeDesc::named(OBJECT_CLASS)))
                    .bridge_to(&[TypeDesc::plain::<String>().name()]),
            )
            .build()
    }

    #[test]
    fn call_through_bridge_uses_target_plan() {
        let backend = Arc::new(InMemoryBackend::new());
        let instrumentor = Instrumentor::builder().backend("main", backend.clone()).build().unwrap();
        let class = repository(true);
        let chain = instrumentor.chain_for(&class).unwrap().expect("save is logged");

        let (real, bridge) = (&class.methods()[0], &class.methods()[1]);
        assert!(chain.matches(bridge));
        let args = [Some(Value::from("ada"))];
        chain.invoke(bridge, &args, || Ok(None)).unwrap();
        chain.invoke(real, &args, || Ok(None)).unwrap();
        assert_eq!(backend.messages(), ["> user=\"ada\"", "<", "> user=\"ada\"", "<"]);
        assert!(backend.records().iter().all(|r| r.logger() == "app.UserRepository.save"));
    }

    #[test]
    fn bridge_without_target_is_rejected() {
        let instrumentor = Instrumentor::builder()
            .backend("main", Arc::new(InMemoryBackend::new()))
            .build()
            .unwrap();
        let err = instrumentor.chain_for(&repository(false)).unwrap_err();
        assert!(matches!(err.rule, UsageRule::MissingBridgeTarget { .. }));
    }

    fn handler_hierarchy(child_logged: bool) -> Arc<ClassDescriptor> {
        let base = ClassDescriptor::builder("app.Handler")
            .method(
                MethodDescriptor::builder("handle")
                    .param(ParamDescriptor::new("item", TypeDesc::named(OBJECT_CLASS)))
                    .annotate(Logging::default()),
            )
            .build();
        let mut handle = MethodDescriptor::builder("handle").param(ParamDescriptor::new("item", TypeDesc::named("app.User")));
        if child_logged {
            handle = handle.annotate(Logging::default());
        }
        ClassDescriptor::builder("app.UserHandler")
            .extends(base)
            .method(handle)
            .method(
                MethodDescriptor::builder("handle")
                    .param(ParamDescriptor::unnamed(TypeDesc::named(OBJECT_CLASS)))
                    .bridge_to(&["app.User"]),
            )
            .build()
    }

    #[test]
    fn overridden_superclass_method_is_not_instrumented() {
        let instrumentor = Instrumentor::builder()
            .backend("main", Arc::new(InMemoryBackend::new()))
            .build()
            .unwrap();
        assert!(instrumentor.chain_for(&handler_hierarchy(false)).unwrap().is_none());
    }

    #[test]
    fn bridge_of_override_logs_as_the_override() {
        let backend = Arc::new(InMemoryBackend::new());
        let instrumentor = Instrumentor::builder().backend("main", backend.clone()).build().unwrap();
        let class = handler_hierarchy(true);
        let chain = instrumentor.chain_for(&class).unwrap().expect("override is logged");
        let base_method = &class.superclass().expect("extends").methods()[0];
        let bridge = &class.methods()[1];
        assert!(chain.matches(bridge));
        assert!(!chain.matches(base_method));
        chain.invoke(bridge, &[None], || Ok(None)).unwrap();
        assert_eq!(backend.messages(), ["> item=null", "<"]);
        assert!(backend.records().iter().all(|r| r.logger() == "app.UserHandler.handle"));
    }

    #[test]
    fn unnamed_parameters_render_bare() {
        let backend = Arc::new(InMemoryBackend::new());
        let instrumentor = Instrumentor::builder().backend("main", backend.clone()).build().unwrap();
        let class = ClassDescriptor::builder("app.Codec")
            .method(
                MethodDescriptor::builder("encode")
                    .param(ParamDescriptor::unnamed(TypeDesc::plain::<i32>()).annotate(LogArg::default()))
                    .param(ParamDescriptor::new("width", TypeDesc::plain::<i32>()).annotate(LogArg::default())),
            )
            .build();
        let chain = instrumentor.chain_for(&class).unwrap().unwrap();
        chain
            .invoke(&class.methods()[0], &[Some(Value::from(1)), Some(Value::from(8))], || Ok(None))
            .unwrap();
        assert_eq!(backend.messages(), ["> 1, width=8"]);
    }
}
