// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call-scoped ownership of context keys.

use super::store::DiagnosticContext;
use std::marker::PhantomData;

/**
Installs context entries and removes the non-global ones when dropped.

The drop runs on every exit path: normal return, an `Err` propagated with `?`, and unwinding.
*/
#[derive(Debug, Default)]
pub struct ContextScope {
    owned: Vec<String>,
    // The owned keys live in this thread's store.
    _thread_bound: PhantomData<*const ()>,
}

impl ContextScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `key` now.  The last write decides: a non-global key becomes owned by this
    /// scope, a global one stops being owned.
    pub fn install(&mut self, key: impl Into<String>, value: impl Into<String>, global: bool) {
        let key = key.into();
        DiagnosticContext::put(key.clone(), value);
        if global {
            self.owned.retain(|owned| *owned != key);
        } else if !self.owned.contains(&key) {
            self.owned.push(key);
        }
    }

    /// The keys that will be removed on drop, in installation order.
    pub fn owned_keys(&self) -> &[String] {
        &self.owned
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        for key in &self.owned {
            DiagnosticContext::remove(key);
        }
    }
}

/*
Boilerplate notes.

Clone would mean two scopes removing the same keys, so no.
PartialEq, Hash and Default-with-keys don't mean anything for a guard.
Not Send: a guard dropped on another thread would remove keys from the wrong store.
*/
