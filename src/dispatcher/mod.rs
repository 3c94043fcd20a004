//! # EventDispatcher: topic registry with concurrent fan-out
//!
//! ```text
//!   publish(topic, args)
//!        │   snapshot under shard lock, lock released
//!        ├──► spawn ─► handler A(args) ─► InvocationHandle A
//!        ├──► spawn ─► handler B(args) ─► InvocationHandle B
//!        └──► spawn ─► handler N(args) ─► InvocationHandle N
//! ```
//!
//! ## What it guarantees
//! - `publish` never waits for a handler and never fails because of one.
//! - Each invocation is its own task: errors and panics stay in its handle.
//! - The handler set is captured when `publish` is called; later
//!   subscribe/unsubscribe calls do not change who gets invoked.
//! - Lookups for `publish`/`unsubscribe` never create registry entries.
//!
//! ## What it does **not** guarantee
//! - Any order between handlers, for start or completion.
//! - Delivery to handlers subscribed after the snapshot.

mod stats;

use std::{
    borrow::Borrow,
    collections::HashSet,
    fmt::Debug,
    hash::Hash,
    panic::AssertUnwindSafe,
    sync::Arc,
};

use dashmap::DashMap;
use futures::FutureExt;
use tokio::runtime::Handle;
use tracing::{debug, trace, Instrument, Span};

pub use stats::DispatchStats;

use self::stats::StatsCounters;
use crate::{
    invocation::{panic_message, FailureWatch},
    Arguments, DispatchError, DispatcherConfig, Handler, InvocationHandle,
};

/// Anything usable as a topic key.
pub trait Topic: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> Topic for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// In-process publish/subscribe dispatcher.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct EventDispatcher<T: Topic = String> {
    /// Topic → set of handlers (identity-keyed).
    subscribers: DashMap<T, HashSet<Handler>>,
    /// Runtime to spawn on; falls back to the current one at publish time.
    runtime: Option<Handle>,
    config: DispatcherConfig,
    stats: Arc<StatsCounters>,
}

impl<T: Topic> EventDispatcher<T> {
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            subscribers: DashMap::new(),
            runtime: None,
            config,
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// Pins invocations to a specific runtime instead of whichever runtime
    /// is current when `publish` is called.
    pub fn with_runtime(
        mut self,
        runtime: Handle,
    ) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Registers `handler` for `topic`. Subscribing the same handler twice
    /// is a no-op.
    pub fn subscribe(
        &self,
        topic: impl Into<T>,
        handler: Handler,
    ) {
        let topic = topic.into();
        debug!(?topic, handler = handler.name(), "subscribe");
        self.subscribers.entry(topic).or_default().insert(handler);
    }

    /// Removes `handler` from `topic`. Unknown topics and handlers are
    /// ignored.
    pub fn unsubscribe<Q>(
        &self,
        topic: &Q,
        handler: &Handler,
    ) where
        T: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        if let Some(mut handlers) = self.subscribers.get_mut(topic) {
            if handlers.remove(handler) {
                debug!(?topic, handler = handler.name(), "unsubscribe");
            }
        }
    }

    /// Removes every handler of `topic` and returns how many there were.
    pub fn unsubscribe_all<Q>(
        &self,
        topic: &Q,
    ) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let removed = match self.subscribers.get_mut(topic) {
            Some(mut handlers) => {
                let n = handlers.len();
                handlers.clear();
                n
            }
            None => 0,
        };
        debug!(?topic, removed, "unsubscribe all");
        removed
    }

    /// Schedules every handler currently subscribed to `topic` and returns
    /// one handle per scheduled invocation, without waiting for any of them.
    ///
    /// Returns an empty `Vec` when nobody is subscribed.
    pub fn publish<Q>(
        &self,
        topic: &Q,
        args: Arguments,
    ) -> Vec<InvocationHandle>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.stats.record_publish();

        let snapshot: Vec<Handler> = match self.subscribers.get(topic) {
            Some(handlers) => handlers.iter().cloned().collect(),
            None => Vec::new(),
        };

        if snapshot.is_empty() {
            trace!(?topic, "publish: no subscribers");
            return Vec::new();
        }

        trace!(?topic, handlers = snapshot.len(), "publish");

        let runtime = self.runtime.clone().or_else(|| Handle::try_current().ok());
        snapshot
            .into_iter()
            .map(|handler| self.schedule(runtime.as_ref(), topic, handler, args.clone()))
            .collect()
    }

    /// [`Self::publish`] without arguments.
    pub fn publish_empty<Q>(
        &self,
        topic: &Q,
    ) -> Vec<InvocationHandle>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.publish(topic, Arguments::new())
    }

    pub fn is_subscribed<Q>(
        &self,
        topic: &Q,
        handler: &Handler,
    ) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.subscribers
            .get(topic)
            .is_some_and(|handlers| handlers.contains(handler))
    }

    pub fn subscriber_count<Q>(
        &self,
        topic: &Q,
    ) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.subscribers
            .get(topic)
            .map_or(0, |handlers| handlers.len())
    }

    /// Number of topics ever subscribed to, including ones that are empty now.
    pub fn topic_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn topics(&self) -> Vec<T> {
        self.subscribers.iter().map(|e| e.key().clone()).collect()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats.snapshot()
    }

    fn schedule<Q>(
        &self,
        runtime: Option<&Handle>,
        topic: &Q,
        handler: Handler,
        args: Arguments,
    ) -> InvocationHandle
    where
        Q: Debug + ?Sized,
    {
        let watch = FailureWatch::new(self.config.warn_unobserved);

        let Some(runtime) = runtime else {
            self.stats.record_failure();
            let err = DispatchError::NoRuntime {
                handler: handler.name().to_owned(),
            };
            debug!(?topic, error = %err, "invocation rejected");
            return InvocationHandle::rejected(err, watch);
        };

        let span = if self.config.trace_invocations {
            tracing::debug_span!(
                "invoke",
                dispatcher = %self.config.name,
                topic = ?topic,
                handler = handler.name()
            )
        } else {
            Span::none()
        };

        let name = handler.name().to_owned();
        let stats = Arc::clone(&self.stats);
        let task_watch = watch.clone();

        let task = async move {
            let result = match AssertUnwindSafe(handler.invoke(args)).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(DispatchError::HandlerPanicked {
                    handler: handler.name().to_owned(),
                    message: panic_message(payload),
                }),
            };

            match &result {
                Ok(()) => {
                    stats.record_success();
                    trace!("handler completed");
                }
                Err(err) => {
                    stats.record_failure();
                    debug!(error = %err, "handler failed");
                    task_watch.record_failure(err);
                }
            }
            result
        };

        self.stats.record_scheduled();
        let join = runtime.spawn(task.instrument(span));
        InvocationHandle::spawned(name, join, watch)
    }
}

impl<T: Topic> Default for EventDispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Topic> Debug for EventDispatcher<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("name", &self.config.name)
            .field("topics", &self.subscribers.len())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
