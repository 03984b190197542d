// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async context preservation.

use std::future::Future;
use std::pin::Pin;
use std::task::Poll;

use super::store::ContextSnapshot;

/// A [`Future`] wrapper that installs a diagnostic context around every poll.
///
/// Executors move futures between threads, and the store is per thread.  `ApplyContext`
/// installs its snapshot before each poll and puts the polling thread's own context back
/// afterwards.
///
/// ```rust
/// use methodlog::context::{ApplyContext, ContextSnapshot, DiagnosticContext};
///
/// async fn handler() -> Option<String> {
///     DiagnosticContext::get("tenant")
/// }
///
/// # async fn example() {
/// DiagnosticContext::put("tenant", "acme");
/// let wrapped = ApplyContext::new(ContextSnapshot::capture(), handler());
/// assert_eq!(wrapped.await.as_deref(), Some("acme"));
/// # }
/// ```
pub struct ApplyContext<F>(ContextSnapshot, F);

impl<F> ApplyContext<F> {
    pub fn new(context: ContextSnapshot, f: F) -> Self {
        Self(context, f)
    }
}

impl<F> Future for ApplyContext<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        // SAFETY: the inner future is never moved out of `self`, and the snapshot is not pinned.
        let (context, fut) = unsafe {
            let d = self.get_unchecked_mut();
            (&d.0, Pin::new_unchecked(&mut d.1))
        };
        context.run_with(|| fut.poll(cx))
    }
}
