//! Handlers registered on a topic.
//!
//! A [`Handler`] is a reference-counted callable with a declared
//! [`Signature`] and a diagnostic name. Identity is the allocation: clones
//! of one `Handler` are the same handler, while two handlers built from
//! separately constructed closures are distinct even when they do the same
//! thing.
//!
//! ```text
//! Handler::new(f) ──► Arc<HandlerInner> ──┬─► clone() == original
//!                                         └─► Handler::new(f) != original
//! ```

mod signature;

use std::{
    any::type_name,
    fmt,
    future::Future,
    hash::{Hash, Hasher},
    sync::Arc,
};

use futures::future::{self, BoxFuture, FutureExt};

pub use signature::{Param, Signature};

use crate::{Arguments, DispatchError};

type CallFn = dyn Fn(Arguments) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// Value a handler body may resolve to.
///
/// `()` and `Option<T>` always count as success; `Result<T, E>` maps `Err`
/// to a handler failure.
pub trait HandlerOutput {
    fn into_outcome(self) -> anyhow::Result<()>;
}

impl HandlerOutput for () {
    fn into_outcome(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<T> HandlerOutput for Option<T> {
    fn into_outcome(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<T, E> HandlerOutput for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn into_outcome(self) -> anyhow::Result<()> {
        self.map(drop).map_err(Into::into)
    }
}

struct HandlerInner {
    name: String,
    signature: Signature,
    call: Arc<CallFn>,
}

/// Callable registered on a topic.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerInner>,
}

impl Handler {
    /// Wraps an async callable. The handler accepts any arguments until a
    /// narrower signature is set with [`Self::with_signature`].
    ///
    /// Every call allocates a new identity, even for the same `fn` item:
    /// `Handler::new(on_event)` twice subscribes `on_event` twice. To
    /// re-register or unsubscribe, keep the `Handler` and pass clones of it.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: HandlerOutput,
    {
        let call: Arc<CallFn> = Arc::new(move |args| f(args).map(HandlerOutput::into_outcome).boxed());
        Self::from_parts(type_name::<F>().to_owned(), Signature::default(), call)
    }

    /// Wraps a synchronous callable. It still runs inside its own task, not
    /// in the publisher.
    pub fn from_sync<F, R>(f: F) -> Self
    where
        F: Fn(Arguments) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        let call: Arc<CallFn> = Arc::new(move |args| future::ready(f(args).into_outcome()).boxed());
        Self::from_parts(type_name::<F>().to_owned(), Signature::default(), call)
    }

    /// Sets the name used in logs and errors.
    ///
    /// Meant for use right after construction: the returned handler is a new
    /// identity, distinct from any clone taken before the call.
    pub fn named(
        self,
        name: impl Into<String>,
    ) -> Self {
        Self::from_parts(
            name.into(),
            self.inner.signature.clone(),
            Arc::clone(&self.inner.call),
        )
    }

    /// Restricts the named arguments this handler accepts.
    ///
    /// Same identity caveat as [`Self::named`].
    pub fn with_signature(
        self,
        signature: Signature,
    ) -> Self {
        Self::from_parts(
            self.inner.name.clone(),
            signature,
            Arc::clone(&self.inner.call),
        )
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    /// Binds `args` and runs the handler body.
    ///
    /// Argument binding happens when the returned future is first polled,
    /// so a mismatch surfaces at invocation time, inside the invocation's
    /// own task.
    pub(crate) fn invoke(
        &self,
        args: Arguments,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        async move {
            inner
                .signature
                .bind(&args)
                .map_err(|reason| DispatchError::ArgumentMismatch {
                    handler: inner.name.clone(),
                    reason,
                })?;

            (inner.call)(args)
                .await
                .map_err(|source| DispatchError::HandlerFailure {
                    handler: inner.name.clone(),
                    source,
                })
        }
    }

    fn from_parts(
        name: String,
        signature: Signature,
        call: Arc<CallFn>,
    ) -> Self {
        Self {
            inner: Arc::new(HandlerInner {
                name,
                signature,
                call,
            }),
        }
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl PartialEq for Handler {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Handler {}

impl Hash for Handler {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for Handler {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.inner.name)
            .field("addr", &format_args!("{:#x}", self.addr()))
            .finish()
    }
}
