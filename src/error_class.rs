// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error class hierarchy.
//!
//! Error-logging declarations name *classes* of errors to include or exclude, and the
//! interceptor picks the definition whose class is nearest to what was actually thrown.
//! Rust errors don't form an inheritance tree on their own, so each thrown value reports
//! an [`ErrorClass`]: a `'static` node with a single parent, rooted at [`THROWABLE`].
//!
//! ```
//! use methodlog::error_class::{self, ErrorClass, RUNTIME_EXCEPTION};
//!
//! static ORDER_REJECTED: ErrorClass = ErrorClass::new("app.OrderRejected", &RUNTIME_EXCEPTION);
//!
//! assert_eq!(error_class::distance(&RUNTIME_EXCEPTION, &ORDER_REJECTED), 1);
//! assert_eq!(error_class::distance(&ORDER_REJECTED, &RUNTIME_EXCEPTION), -1);
//! ```

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

/**
A node in the error class hierarchy.

Equality and hashing use the fully-qualified name, which must be unique in the process.
Ordering is by depth below the root, then by name, so sorted sets of classes are deterministic
regardless of insertion order.
*/
pub struct ErrorClass {
    name: &'static str,
    parent: Option<&'static ErrorClass>,
    interface: bool,
}

impl ErrorClass {
    /// Declares a class extending `parent`.
    pub const fn new(name: &'static str, parent: &'static ErrorClass) -> Self {
        Self {
            name,
            parent: Some(parent),
            interface: false,
        }
    }

    /// Declares a hierarchy root.  The crate's own root is [`THROWABLE`].
    pub const fn root(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            interface: false,
        }
    }

    /**
    Declares a marker interface.

    Interfaces exist so that declarations can be checked for them: inheritance distance is
    undefined for an interface, and passing one to [`distance`] panics.
    */
    pub const fn interface(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            interface: true,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The simple name, i.e. everything after the last `.`.
    pub fn simple_name(&self) -> &'static str {
        self.name.rsplit('.').next().unwrap_or(self.name)
    }

    #[inline]
    pub fn parent(&self) -> Option<&'static ErrorClass> {
        self.parent
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.interface
    }

    /// Number of superclass hops up to the root.  The root has depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent;
        while let Some(class) = current {
            depth += 1;
            current = class.parent;
        }
        depth
    }

    /// Whether a value of class `other` can be treated as a `self`, i.e. `self` is `other` or one of its ancestors.
    pub fn is_assignable_from(&self, other: &ErrorClass) -> bool {
        let mut current = Some(other);
        while let Some(class) = current {
            if class == self {
                return true;
            }
            current = class.parent;
        }
        false
    }
}

impl PartialEq for ErrorClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ErrorClass {}

impl Hash for ErrorClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for ErrorClass {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ErrorClass {
    fn cmp(&self, other: &Self) -> Ordering {
        self.depth()
            .cmp(&other.depth())
            .then_with(|| self.name.cmp(other.name))
    }
}

impl Debug for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ErrorClass({})", self.name)
    }
}

impl Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/*
Boilerplate notes for ErrorClass:

- Clone/Copy: not implemented, classes are always used as `&'static ErrorClass`
- Default: no sensible default class
- PartialEq/Eq/Hash: by name
- Ord: depth then name, used for canonical filter ordering
*/

pub static THROWABLE: ErrorClass = ErrorClass::root("Throwable");
pub static EXCEPTION: ErrorClass = ErrorClass::new("Exception", &THROWABLE);
pub static ERROR: ErrorClass = ErrorClass::new("Error", &THROWABLE);
pub static RUNTIME_EXCEPTION: ErrorClass = ErrorClass::new("RuntimeException", &EXCEPTION);
pub static IO_EXCEPTION: ErrorClass = ErrorClass::new("IOException", &EXCEPTION);
pub static ILLEGAL_ARGUMENT_EXCEPTION: ErrorClass =
    ErrorClass::new("IllegalArgumentException", &RUNTIME_EXCEPTION);
pub static ILLEGAL_STATE_EXCEPTION: ErrorClass =
    ErrorClass::new("IllegalStateException", &RUNTIME_EXCEPTION);
pub static NULL_POINTER_EXCEPTION: ErrorClass =
    ErrorClass::new("NullPointerException", &RUNTIME_EXCEPTION);
pub static INDEX_OUT_OF_BOUNDS_EXCEPTION: ErrorClass =
    ErrorClass::new("IndexOutOfBoundsException", &RUNTIME_EXCEPTION);
pub static ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION: ErrorClass =
    ErrorClass::new("ArrayIndexOutOfBoundsException", &INDEX_OUT_OF_BOUNDS_EXCEPTION);

/**
Superclass hops from `concrete` up to `ancestor`.

Returns 0 for identical classes and -1 when `concrete` does not descend from `ancestor`.

# Panics

If either class is an interface.  Only class hierarchies rooted at [`THROWABLE`] have a
defined distance; declarations are validated before they reach this point.
*/
pub fn distance(ancestor: &ErrorClass, concrete: &ErrorClass) -> i32 {
    assert!(
        !ancestor.is_interface(),
        "{} is an interface, distance is only defined between classes",
        ancestor.name
    );
    assert!(
        !concrete.is_interface(),
        "{} is an interface, distance is only defined between classes",
        concrete.name
    );
    let mut hops = 0;
    let mut current = Some(concrete);
    while let Some(class) = current {
        if class == ancestor {
            return hops;
        }
        hops += 1;
        current = class.parent;
    }
    -1
}

/// The candidate with the smallest non-negative [`distance`] to `concrete`.  Ties go to the earlier candidate.
pub fn find_most_specific_ancestor<'a, I>(candidates: I, concrete: &ErrorClass) -> Option<&'a ErrorClass>
where
    I: IntoIterator<Item = &'a ErrorClass>,
{
    let mut best: Option<(&'a ErrorClass, i32)> = None;
    for candidate in candidates {
        let d = distance(candidate, concrete);
        if d < 0 {
            continue;
        }
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((candidate, d));
        }
    }
    best.map(|(class, _)| class)
}

/**
A value that can be thrown through an intercepted call.

Intercepted calls fail with a [`Thrown`]; the interceptors log it and hand back the very same box.
*/
pub trait Throwable: std::error::Error + Send + Sync + 'static {
    fn error_class(&self) -> &'static ErrorClass;
}

/// The failure half of an intercepted call's outcome.
pub type Thrown = Box<dyn Throwable>;

/**
General-purpose throwable carrying a class and a message.

```
use methodlog::error_class::{Exception, Throwable, ILLEGAL_STATE_EXCEPTION};

let e = Exception::new(&ILLEGAL_STATE_EXCEPTION, "not started");
assert_eq!(e.error_class(), &ILLEGAL_STATE_EXCEPTION);
assert_eq!(e.to_string(), "not started");
```
*/
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Exception {
    class: &'static ErrorClass,
    message: String,
}

impl Exception {
    pub fn new(class: &'static ErrorClass, message: impl Into<String>) -> Self {
        debug_assert!(!class.is_interface(), "cannot throw an interface");
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Throwable for Exception {
    fn error_class(&self) -> &'static ErrorClass {
        self.class
    }
}
