use tracing_appender::non_blocking::WorkerGuard;

/// Keeps the background log writer alive.
///
/// Dropping the handle flushes and stops the writer; keep it for the life
/// of the program.
#[must_use = "dropping the LoggingHandle stops the background log writer"]
pub struct LoggingHandle {
    _guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(guard: Option<WorkerGuard>) -> Self {
        Self { _guard: guard }
    }

    /// `true` if logs go through a background worker.
    pub fn is_non_blocking(&self) -> bool {
        self._guard.is_some()
    }

    /// Flushes pending records and stops the background writer.
    pub fn shutdown(mut self) {
        tracing::info!("Logging shutdown");
        drop(self._guard.take());
    }
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoggingHandle")
            .field("non_blocking", &self.is_non_blocking())
            .finish()
    }
}
