// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class and method descriptors.
//!
//! The interception host describes each instrumented type with a [`ClassDescriptor`]: its name,
//! superclass, and methods with their parameters, return type and logging declarations.
//! Descriptors are built once and shared behind `Arc`; the per-call [`MethodDescriptor`] handed
//! to an interceptor is the same `Arc` the plans were built from.
//!
//! ```
//! use methodlog::descriptor::{ClassDescriptor, MethodDescriptor, ParamDescriptor};
//! use methodlog::annotation::Logging;
//! use methodlog::TypeDesc;
//!
//! let class = ClassDescriptor::builder("app.Orders")
//!     .method(
//!         MethodDescriptor::builder("place")
//!             .param(ParamDescriptor::new("sku", TypeDesc::plain::<String>()))
//!             .returns(TypeDesc::plain::<u64>())
//!             .annotate(Logging::default()),
//!     )
//!     .build();
//! assert_eq!(class.methods().len(), 1);
//! assert_eq!(class.methods()[0].key().to_string(), "app.Orders.place(alloc::string::String)");
//! ```
//!
//! # Bridge methods
//!
//! A generic override can be reachable through two entry points: the real method and a
//! *bridge* with erased parameter types that forwards to it.  Declare the bridge with
//! [`MethodBuilder::bridge_to`]; declarations are always read from the real method and
//! calls through either entry point match the same plan.

use crate::annotation::{MethodAnnotation, ParamAnnotation};
use crate::value::TypeDesc;
use std::fmt::Display;
use std::sync::{Arc, OnceLock};

/// Identity of a method: declaring class, name and parameter type names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    class: Arc<str>,
    name: Arc<str>,
    params: Arc<[&'static str]>,
}

impl MethodKey {
    pub fn new(class: &str, name: &str, params: &[&'static str]) -> Self {
        Self {
            class: Arc::from(class),
            name: Arc::from(name),
            params: Arc::from(params),
        }
    }

    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn params(&self) -> &[&'static str] {
        &self.params
    }

    /// Whether `other` has the same name and parameter types, whatever the declaring class.
    pub fn same_signature(&self, other: &MethodKey) -> bool {
        self.name == other.name && self.params == other.params
    }
}

impl Display for MethodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}({})", self.class, self.name, self.params.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamDescriptor {
    name: Option<String>,
    ty: TypeDesc,
    annotations: Vec<ParamAnnotation>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            annotations: Vec::new(),
        }
    }

    /// A parameter whose name is not known at runtime.
    pub fn unnamed(ty: TypeDesc) -> Self {
        Self {
            name: None,
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn annotate(mut self, annotation: impl Into<ParamAnnotation>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    #[inline]
    pub fn annotations(&self) -> &[ParamAnnotation] {
        &self.annotations
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    key: MethodKey,
    params: Vec<ParamDescriptor>,
    return_type: TypeDesc,
    annotations: Vec<MethodAnnotation>,
    synthetic: bool,
    bridge_target: Option<MethodKey>,
}

impl MethodDescriptor {
    pub fn builder(name: impl Into<String>) -> MethodBuilder {
        MethodBuilder {
            name: name.into(),
            params: Vec::new(),
            return_type: TypeDesc::void(),
            annotations: Vec::new(),
            synthetic: false,
            bridge_target: None,
        }
    }

    #[inline]
    pub fn key(&self) -> &MethodKey {
        &self.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    #[inline]
    pub fn declaring_class(&self) -> &str {
        self.key.class()
    }

    #[inline]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    #[inline]
    pub fn return_type(&self) -> &TypeDesc {
        &self.return_type
    }

    #[inline]
    pub fn annotations(&self) -> &[MethodAnnotation] {
        &self.annotations
    }

    /// Compiler-generated: bridges and other synthetic methods are never logged themselves.
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic || self.bridge_target.is_some()
    }

    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.bridge_target.is_some()
    }

    /// The key plans are stored under: the bridge target for a bridge, the method's own key otherwise.
    #[inline]
    pub fn resolved_key(&self) -> &MethodKey {
        self.bridge_target.as_ref().unwrap_or(&self.key)
    }
}

pub struct MethodBuilder {
    name: String,
    params: Vec<ParamDescriptor>,
    return_type: TypeDesc,
    annotations: Vec<MethodAnnotation>,
    synthetic: bool,
    bridge_target: Option<Vec<&'static str>>,
}

impl MethodBuilder {
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Defaults to [`TypeDesc::void`].
    pub fn returns(mut self, ty: TypeDesc) -> Self {
        self.return_type = ty;
        self
    }

    pub fn annotate(mut self, annotation: impl Into<MethodAnnotation>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Marks this method as a bridge forwarding to the same-named method with these parameter types.
    pub fn bridge_to(mut self, target_params: &[&'static str]) -> Self {
        self.bridge_target = Some(target_params.to_vec());
        self
    }

    fn build(self, class: &str) -> MethodDescriptor {
        let param_types: Vec<&'static str> = self.params.iter().map(|p| p.ty.name()).collect();
        MethodDescriptor {
            key: MethodKey::new(class, &self.name, &param_types),
            bridge_target: self
                .bridge_target
                .map(|target| MethodKey::new(class, &self.name, &target)),
            params: self.params,
            return_type: self.return_type,
            annotations: self.annotations,
            synthetic: self.synthetic,
        }
    }
}

#[derive(Debug)]
pub struct ClassDescriptor {
    name: String,
    superclass: Option<Arc<ClassDescriptor>>,
    methods: Vec<Arc<MethodDescriptor>>,
}

/// Name of the universal base class.
pub const OBJECT_CLASS: &str = "Object";

static OBJECT: OnceLock<Arc<ClassDescriptor>> = OnceLock::new();

impl ClassDescriptor {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            superclass: None,
            methods: Vec::new(),
        }
    }

    /// The universal base class every other class extends.
    pub fn object() -> Arc<ClassDescriptor> {
        OBJECT
            .get_or_init(|| {
                let methods = [
                    MethodDescriptor::builder("to_string").returns(TypeDesc::plain::<String>()),
                    MethodDescriptor::builder("hash_code").returns(TypeDesc::plain::<i32>()),
                    MethodDescriptor::builder("equals")
                        .param(ParamDescriptor::new("other", TypeDesc::named(OBJECT_CLASS)))
                        .returns(TypeDesc::plain::<bool>()),
                ];
                Arc::new(ClassDescriptor {
                    name: OBJECT_CLASS.to_string(),
                    superclass: None,
                    methods: methods
                        .into_iter()
                        .map(|m| Arc::new(m.build(OBJECT_CLASS)))
                        .collect(),
                })
            })
            .clone()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn superclass(&self) -> Option<&Arc<ClassDescriptor>> {
        self.superclass.as_ref()
    }

    /// Methods declared directly on this class.
    #[inline]
    pub fn methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.methods
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        self.superclass.is_none() && self.name == OBJECT_CLASS
    }

    /// Looks a method up by exact key, searching this class and its superclasses.
    pub fn find_method(&self, key: &MethodKey) -> Option<&Arc<MethodDescriptor>> {
        let mut class = Some(self);
        while let Some(current) = class {
            if let Some(found) = current.methods.iter().find(|m| m.key() == key) {
                return Some(found);
            }
            class = current.superclass.as_deref();
        }
        None
    }

    /// This class followed by its superclasses, nearest first.
    pub fn hierarchy(&self) -> impl Iterator<Item = &ClassDescriptor> {
        std::iter::successors(Some(self), |c| c.superclass.as_deref())
    }
}

pub struct ClassBuilder {
    name: String,
    superclass: Option<Arc<ClassDescriptor>>,
    methods: Vec<MethodBuilder>,
}

impl ClassBuilder {
    /// Defaults to [`ClassDescriptor::object`].
    pub fn extends(mut self, superclass: Arc<ClassDescriptor>) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(self) -> Arc<ClassDescriptor> {
        let name = self.name;
        Arc::new(ClassDescriptor {
            methods: self
                .methods
                .into_iter()
                .map(|m| Arc::new(m.build(&name)))
                .collect(),
            superclass: Some(self.superclass.unwrap_or_else(ClassDescriptor::object)),
            name,
        })
    }
}
