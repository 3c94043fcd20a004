//! # InvocationHandle: caller-owned view of one scheduled handler run
//!
//! `publish` returns one handle per handler it scheduled. The dispatcher
//! keeps nothing: awaiting, aborting or dropping a handle is entirely the
//! caller's business.
//!
//! ## Unobserved failures
//! A handle dropped before it was awaited is *detached*. If its invocation
//! fails (before or after the drop), exactly one `unobserved handler failure`
//! warning is logged. Nothing else happens: no panic, no effect on siblings.
//!
//! ```text
//!   task ── fails ──► fetch_or(FAILED)   ─┐
//!                                         ├─► whichever side comes second warns
//!   handle ─ drop ──► fetch_or(DETACHED) ─┘
//! ```

use std::{
    any::Any,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    task::{Context, Poll},
};

use tokio::task::{JoinError, JoinHandle};

use crate::DispatchError;

const FAILED: u8 = 0b01;
const DETACHED: u8 = 0b10;

/// Shared between a running invocation and its handle.
#[derive(Debug, Clone)]
pub(crate) struct FailureWatch {
    state: Arc<AtomicU8>,
    warn: bool,
}

impl FailureWatch {
    pub(crate) fn new(warn: bool) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(0)),
            warn,
        }
    }

    /// Called by the task when its invocation fails.
    pub(crate) fn record_failure(
        &self,
        err: &DispatchError,
    ) {
        let prev = self.state.fetch_or(FAILED, Ordering::AcqRel);
        if self.warn && prev & DETACHED != 0 {
            tracing::warn!(handler = err.handler(), error = %err, "unobserved handler failure");
        }
    }

    /// Called by the handle when it is dropped without being awaited.
    fn detach(
        &self,
        handler: &str,
    ) {
        let prev = self.state.fetch_or(DETACHED, Ordering::AcqRel);
        if self.warn && prev & FAILED != 0 {
            tracing::warn!(handler, "unobserved handler failure");
        }
    }
}

enum Inner {
    Spawned(JoinHandle<Result<(), DispatchError>>),
    Rejected(DispatchError),
    /// Outcome already handed out.
    Done,
}

/// Awaitable handle for one handler invocation.
///
/// Resolves to `Ok(())` when the handler succeeded, or to the
/// [`DispatchError`] describing why it did not.
#[must_use = "dropping an InvocationHandle detaches the invocation; its outcome is lost"]
pub struct InvocationHandle {
    handler: String,
    inner: Inner,
    watch: FailureWatch,
    observed: bool,
}

impl InvocationHandle {
    pub(crate) fn spawned(
        handler: String,
        join: JoinHandle<Result<(), DispatchError>>,
        watch: FailureWatch,
    ) -> Self {
        Self {
            handler,
            inner: Inner::Spawned(join),
            watch,
            observed: false,
        }
    }

    /// A handle for an invocation that could not be scheduled at all.
    pub(crate) fn rejected(
        err: DispatchError,
        watch: FailureWatch,
    ) -> Self {
        watch.state.fetch_or(FAILED, Ordering::AcqRel);
        Self {
            handler: err.handler().to_owned(),
            inner: Inner::Rejected(err),
            watch,
            observed: false,
        }
    }

    pub fn handler_name(&self) -> &str {
        &self.handler
    }

    /// `true` once the invocation has produced its outcome.
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Inner::Spawned(join) => join.is_finished(),
            Inner::Rejected(_) | Inner::Done => true,
        }
    }

    /// Requests cancellation of the invocation. Awaiting the handle afterwards
    /// yields [`DispatchError::Cancelled`] unless the handler already finished.
    pub fn abort(&self) {
        if let Inner::Spawned(join) = &self.inner {
            join.abort();
        }
    }
}

impl Future for InvocationHandle {
    type Output = Result<(), DispatchError>;

    fn poll(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        let this = self.get_mut();
        let out = match std::mem::replace(&mut this.inner, Inner::Done) {
            Inner::Spawned(mut join) => match Pin::new(&mut join).poll(cx) {
                Poll::Pending => {
                    this.inner = Inner::Spawned(join);
                    return Poll::Pending;
                }
                Poll::Ready(Ok(result)) => result,
                Poll::Ready(Err(err)) => Err(from_join_error(&this.handler, err)),
            },
            Inner::Rejected(err) => Err(err),
            // The outcome is yielded once; later polls stay pending.
            Inner::Done => return Poll::Pending,
        };
        this.observed = true;
        Poll::Ready(out)
    }
}

impl Drop for InvocationHandle {
    fn drop(&mut self) {
        if !self.observed {
            self.watch.detach(&self.handler);
        }
    }
}

impl std::fmt::Debug for InvocationHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("InvocationHandle")
            .field("handler", &self.handler)
            .field("finished", &self.is_finished())
            .field("observed", &self.observed)
            .finish()
    }
}

/// Awaits every handle and returns the outcomes in handle order.
///
/// The caller-side counterpart of "wait for all, collect failures": the
/// dispatcher itself never aggregates.
pub async fn wait_all<I>(handles: I) -> Vec<Result<(), DispatchError>>
where
    I: IntoIterator<Item = InvocationHandle>,
{
    futures::future::join_all(handles).await
}

fn from_join_error(
    handler: &str,
    err: JoinError,
) -> DispatchError {
    let handler = handler.to_owned();
    if err.is_panic() {
        DispatchError::HandlerPanicked {
            handler,
            message: panic_message(err.into_panic()),
        }
    } else {
        DispatchError::Cancelled { handler }
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
