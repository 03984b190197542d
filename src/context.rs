// SPDX-License-Identifier: MIT OR Apache-2.0

//! The diagnostic context: thread-local key/value tags attached to every record.
//!
//! Each thread has its own store, so calls on different threads never see each other's keys.
//! Nested calls on one thread share the store.
//!
//! ```rust
//! use methodlog::context::{ContextScope, DiagnosticContext};
//!
//! DiagnosticContext::put("request", "r-17");
//! {
//!     let mut scope = ContextScope::new();
//!     scope.install("user", "ada", false);
//!     scope.install("trace", "t-1", true);
//!     assert_eq!(DiagnosticContext::get("user").as_deref(), Some("ada"));
//! }
//! // The scope owned `user`; `trace` was global.
//! assert!(!DiagnosticContext::contains("user"));
//! assert!(DiagnosticContext::contains("trace"));
//! # DiagnosticContext::clear();
//! ```
//!
//! # Nested overwrites
//!
//! Scopes remove the keys they own; they do not restore what was there before.  When a nested
//! call installs a key its caller also installed, the caller's value is gone once the nested
//! call returns.
//!
//! ```rust
//! use methodlog::context::{ContextScope, DiagnosticContext};
//!
//! let mut outer = ContextScope::new();
//! outer.install("k", "outer", false);
//! {
//!     let mut inner = ContextScope::new();
//!     inner.install("k", "inner", false);
//! }
//! assert_eq!(DiagnosticContext::get("k"), None);
//! ```
//!
//! # Other threads and executors
//!
//! The store does not follow work onto other threads.  Capture a [`ContextSnapshot`] and
//! install it where the work runs, or wrap a future in [`ApplyContext`].

mod apply_context;
mod scope;
mod store;


pub use apply_context::ApplyContext;
pub use scope::ContextScope;
pub use store::{ContextSnapshot, DiagnosticContext};
