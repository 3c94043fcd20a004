use parking_lot::Mutex;

/// Destination for errors swallowed by the suppress adapters.
///
/// Passed explicitly to [`Suppressor`](super::Suppressor); nothing in this
/// crate reaches for a process-wide logger on its own.
pub trait DiagnosticSink: Send + Sync {
    fn report(
        &self,
        context: &str,
        error: &anyhow::Error,
    );
}

/// Reports through `tracing` at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(
        &self,
        context: &str,
        error: &anyhow::Error,
    ) {
        tracing::error!(context, error = ?error, "suppressed error");
    }
}

/// Keeps every report in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<(String, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(context, error message)` pairs reported so far.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(
        &self,
        context: &str,
        error: &anyhow::Error,
    ) {
        self.entries
            .lock()
            .push((context.to_owned(), format!("{error:#}")));
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str, &anyhow::Error) + Send + Sync,
{
    fn report(
        &self,
        context: &str,
        error: &anyhow::Error,
    ) {
        self(context, error)
    }
}
