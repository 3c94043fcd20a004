//! Suppress-and-log adapters.
//!
//! Wrap a callable so that an error (or panic) it raises is reported to a
//! [`DiagnosticSink`] and turned into `None` instead of propagating. The
//! dispatcher never applies this on its own; a subscriber opts in before
//! calling `subscribe`:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use eventdispatch::{suppress, Arguments, EventDispatcher, Handler, TracingSink};
//!
//! # async fn run() {
//! let dispatcher = EventDispatcher::<String>::new();
//! let quiet = suppress(Arc::new(TracingSink), |args: Arguments| async move {
//!     let id: u64 = args.require("id")?;
//!     anyhow::ensure!(id != 0, "id must be non-zero");
//!     Ok::<_, anyhow::Error>(())
//! });
//! dispatcher.subscribe("orders", Handler::new(quiet).named("orders"));
//! # }
//! ```

mod sink;

use std::{any::type_name, future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::future::{BoxFuture, FutureExt};

pub use sink::{CollectingSink, DiagnosticSink, TracingSink};

use crate::invocation::panic_message;

/// Builder for suppressing wrappers sharing one sink and context label.
#[derive(Clone)]
pub struct Suppressor {
    sink: Arc<dyn DiagnosticSink>,
    context: Option<Arc<str>>,
}

impl Suppressor {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            sink,
            context: None,
        }
    }

    /// Label passed to the sink with every report. Defaults to the wrapped
    /// callable's type name.
    pub fn named(
        mut self,
        context: impl Into<Arc<str>>,
    ) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Wraps an async callable.
    pub fn wrap<A, F, Fut, T, E>(
        &self,
        f: F,
    ) -> impl Fn(A) -> BoxFuture<'static, Option<T>> + Send + Sync + 'static
    where
        A: Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        let sink = Arc::clone(&self.sink);
        let context = self.context_for::<F>();
        let f = Arc::new(f);

        move |arg: A| {
            let sink = Arc::clone(&sink);
            let context = Arc::clone(&context);
            let f = Arc::clone(&f);

            async move {
                let outcome = AssertUnwindSafe(async move { (*f)(arg).await })
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(Ok(value)) => Some(value),
                    Ok(Err(err)) => {
                        sink.report(&context, &err.into());
                        None
                    }
                    Err(payload) => {
                        report_panic(sink.as_ref(), &context, payload);
                        None
                    }
                }
            }
            .boxed()
        }
    }

    /// Wraps a synchronous callable.
    pub fn wrap_sync<A, F, T, E>(
        &self,
        f: F,
    ) -> impl Fn(A) -> Option<T> + Send + Sync + 'static
    where
        A: 'static,
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        T: 'static,
        E: Into<anyhow::Error> + 'static,
    {
        let sink = Arc::clone(&self.sink);
        let context = self.context_for::<F>();

        move |arg: A| match std::panic::catch_unwind(AssertUnwindSafe(|| f(arg))) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                sink.report(&context, &err.into());
                None
            }
            Err(payload) => {
                report_panic(sink.as_ref(), &context, payload);
                None
            }
        }
    }

    fn context_for<F>(&self) -> Arc<str> {
        self.context
            .clone()
            .unwrap_or_else(|| Arc::from(type_name::<F>()))
    }
}

impl std::fmt::Debug for Suppressor {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Suppressor")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Async adapter: errors and panics go to `sink`, the call yields `None`.
pub fn suppress<A, F, Fut, T, E>(
    sink: Arc<dyn DiagnosticSink>,
    f: F,
) -> impl Fn(A) -> BoxFuture<'static, Option<T>> + Send + Sync + 'static
where
    A: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Into<anyhow::Error> + 'static,
{
    Suppressor::new(sink).wrap(f)
}

/// Sync adapter: errors and panics go to `sink`, the call yields `None`.
pub fn suppress_sync<A, F, T, E>(
    sink: Arc<dyn DiagnosticSink>,
    f: F,
) -> impl Fn(A) -> Option<T> + Send + Sync + 'static
where
    A: 'static,
    F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    T: 'static,
    E: Into<anyhow::Error> + 'static,
{
    Suppressor::new(sink).wrap_sync(f)
}

fn report_panic(
    sink: &dyn DiagnosticSink,
    context: &str,
    payload: Box<dyn std::any::Any + Send>,
) {
    let err = anyhow::anyhow!("panicked: {}", panic_message(payload));
    sink.report(context, &err);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collecting() -> (Arc<CollectingSink>, Arc<dyn DiagnosticSink>) {
        let sink = Arc::new(CollectingSink::new());
        let dyn_sink: Arc<dyn DiagnosticSink> = sink.clone();
        (sink, dyn_sink)
    }

    /// Тест проверяет, что успешный результат проходит без изменений.
    #[tokio::test]
    async fn test_async_success_passes_through() {
        let (sink, dyn_sink) = collecting();
        let wrapped = suppress(dyn_sink, |x: u32| async move { Ok::<_, anyhow::Error>(x * 2) });

        assert_eq!(wrapped(21).await, Some(42));
        assert!(sink.is_empty());
    }

    /// Тест проверяет, что ошибка логируется и превращается в None.
    #[tokio::test]
    async fn test_async_error_is_reported_once() {
        let (sink, dyn_sink) = collecting();
        let wrapped = Suppressor::new(dyn_sink)
            .named("loader")
            .wrap(|_: ()| async { Err::<u8, _>(anyhow::anyhow!("no data")) });

        assert_eq!(wrapped(()).await, None);
        assert_eq!(
            sink.entries(),
            vec![("loader".to_string(), "no data".to_string())]
        );
    }

    #[tokio::test]
    async fn test_async_panic_is_reported() {
        let (sink, dyn_sink) = collecting();
        let wrapped = Suppressor::new(dyn_sink)
            .named("boom")
            .wrap(|_: ()| async {
                if true {
                    panic!("exploded");
                }
                Ok::<(), anyhow::Error>(())
            });

        assert_eq!(wrapped(()).await, None);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.entries()[0].1, "panicked: exploded");
    }

    #[test]
    fn test_sync_success_and_error() {
        let (sink, dyn_sink) = collecting();
        let parse = suppress_sync(dyn_sink, |s: String| s.parse::<i32>());

        assert_eq!(parse("12".to_string()), Some(12));
        assert_eq!(parse("twelve".to_string()), None);
        assert_eq!(sink.len(), 1);
        assert!(sink.entries()[0].0.contains("closure"));
    }

    #[test]
    fn test_sync_panic_is_reported() {
        let (sink, dyn_sink) = collecting();
        let div = Suppressor::new(dyn_sink)
            .named("div")
            .wrap_sync(|(a, b): (i32, i32)| -> anyhow::Result<i32> {
                if b == 0 {
                    panic!("division by zero");
                }
                Ok(a / b)
            });

        assert_eq!(div((6, 3)), Some(2));
        assert_eq!(div((1, 0)), None);
        assert_eq!(
            sink.entries(),
            vec![("div".to_string(), "panicked: division by zero".to_string())]
        );
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_in_sink = Arc::clone(&seen);
        let sink: Arc<dyn DiagnosticSink> = Arc::new(move |ctx: &str, err: &anyhow::Error| {
            seen_in_sink.lock().push(format!("{ctx}: {err}"));
        });

        let f = Suppressor::new(sink)
            .named("ctx")
            .wrap_sync(|_: ()| Err::<(), _>(anyhow::anyhow!("bad")));
        assert_eq!(f(()), None);
        assert_eq!(*seen.lock(), vec!["ctx: bad".to_string()]);
    }
}
