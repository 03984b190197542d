// SPDX-License-Identifier: MIT OR Apache-2.0

//! The thread-local store.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

thread_local! {
    static STORE: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
}

/// Access to the current thread's diagnostic context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DiagnosticContext;

impl DiagnosticContext {
    /// Sets `key`, replacing any previous value.
    pub fn put(key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        STORE.with_borrow_mut(|store| {
            store.insert(key, value);
        });
    }

    pub fn get(key: &str) -> Option<String> {
        STORE.with_borrow(|store| store.get(key).cloned())
    }

    /// Removes `key`, returning its value.
    pub fn remove(key: &str) -> Option<String> {
        STORE.with_borrow_mut(|store| store.remove(key))
    }

    pub fn contains(key: &str) -> bool {
        STORE.with_borrow(|store| store.contains_key(key))
    }

    pub fn is_empty() -> bool {
        STORE.with_borrow(|store| store.is_empty())
    }

    /// Removes every key on this thread.
    pub fn clear() {
        STORE.with_borrow_mut(|store| store.clear());
    }

    pub fn snapshot() -> ContextSnapshot {
        ContextSnapshot::capture()
    }
}

/**
A copy of one thread's diagnostic context.

Entries are ordered by key.

```rust
use methodlog::context::{ContextSnapshot, DiagnosticContext};

DiagnosticContext::put("job", "reindex");
let snapshot = ContextSnapshot::capture();
let seen = std::thread::spawn(move || snapshot.run_with(|| DiagnosticContext::get("job")))
    .join()
    .unwrap();
assert_eq!(seen.as_deref(), Some("reindex"));
# DiagnosticContext::clear();
```
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextSnapshot {
    entries: BTreeMap<String, String>,
}

impl ContextSnapshot {
    pub fn capture() -> Self {
        STORE.with_borrow(|store| Self {
            entries: store
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces the current thread's store with this snapshot.
    pub fn install(&self) {
        let entries: HashMap<String, String> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        STORE.set(entries);
    }

    /// Runs `f` with this snapshot installed, then puts the thread's previous store back.
    pub fn run_with<R>(&self, f: impl FnOnce() -> R) -> R {
        let prior = Self::capture();
        let _restore = Restore(prior);
        self.install();
        f()
    }
}

struct Restore(ContextSnapshot);

impl Drop for Restore {
    fn drop(&mut self) {
        self.0.install();
    }
}

impl Display for ContextSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for ContextSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
