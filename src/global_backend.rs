// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide backends for manual logging.
//!
//! Intercepted calls log to the backends their [`Instrumentor`](crate::instrumentor::Instrumentor)
//! was built with.  Programmatic calls through [`manual_log!`](crate::manual_log) have no
//! instrumentor at hand, so they go to the backends registered here.  Every registered backend
//! receives every record its effective level lets through.
//!
//! # Default Behavior
//!
//! Until something is registered, the collection holds a single [`StdErrorBackend`], so manual
//! logging works with no setup.
//!
//! ```
//! use methodlog::global_backend::{add_global_backend, global_backends};
//! use methodlog::InMemoryBackend;
//! use std::sync::Arc;
//!
//! let before = global_backends().len();
//! add_global_backend(Arc::new(InMemoryBackend::new()));
//! assert_eq!(global_backends().len(), before + 1);
//! ```
//!
//! # Backend Lifecycle
//!
//! Backends are reference-counted.  A backend replaced by [`set_global_backends`] lives on
//! until in-flight logging calls holding it have finished.

use crate::backend::LogBackend;
use crate::stderror_backend::StdErrorBackend;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

static GLOBAL_BACKENDS: OnceLock<RwLock<Vec<Arc<dyn LogBackend>>>> = OnceLock::new();

fn default_backends() -> Vec<Arc<dyn LogBackend>> {
    vec![Arc::new(StdErrorBackend::new())]
}

fn backends() -> &'static RwLock<Vec<Arc<dyn LogBackend>>> {
    GLOBAL_BACKENDS.get_or_init(|| RwLock::new(default_backends()))
}

/// The current backends.  The lock is held only long enough to clone the `Arc`s.
pub fn global_backends() -> Vec<Arc<dyn LogBackend>> {
    backends()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Adds a backend alongside the existing ones.
pub fn add_global_backend(backend: Arc<dyn LogBackend>) {
    backends()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(backend);
}

/**
Replaces every backend.

An empty vector silences manual logging entirely.

```
use methodlog::global_backend::{global_backends, set_global_backends};
use methodlog::InMemoryBackend;
use std::sync::Arc;

let original = global_backends();
let memory = Arc::new(InMemoryBackend::new());
set_global_backends(vec![memory.clone()]);
methodlog::manual_log!(methodlog::Level::Warn, "disk {}% full", 91);
assert_eq!(memory.messages(), ["* disk 91% full"]);
set_global_backends(original);
```
*/
pub fn set_global_backends(new_backends: Vec<Arc<dyn LogBackend>>) {
    *backends().write().unwrap_or_else(PoisonError::into_inner) = new_backends;
}
