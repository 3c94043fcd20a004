use std::fmt;

use thiserror::Error;

/// Why a handler's signature rejected the named arguments of a publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchReason {
    /// A required parameter was not supplied.
    Missing(String),
    /// An argument was supplied that the handler does not declare.
    Unexpected(String),
}

/// Outcome of a single handler invocation that did not succeed.
///
/// Every variant is reported only through the
/// [`InvocationHandle`](crate::InvocationHandle) of the invocation it belongs
/// to; `publish` itself never returns an error.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("handler '{handler}' rejected arguments: {reason}")]
    ArgumentMismatch {
        handler: String,
        reason: MismatchReason,
    },

    #[error("handler '{handler}' failed: {source}")]
    HandlerFailure {
        handler: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("handler '{handler}' panicked: {message}")]
    HandlerPanicked { handler: String, message: String },

    #[error("invocation of handler '{handler}' was cancelled")]
    Cancelled { handler: String },

    #[error("no tokio runtime available to schedule handler '{handler}'")]
    NoRuntime { handler: String },
}

impl fmt::Display for MismatchReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing required argument '{name}'"),
            Self::Unexpected(name) => write!(f, "unexpected keyword argument '{name}'"),
        }
    }
}

impl DispatchError {
    /// Name of the handler whose invocation produced this error.
    pub fn handler(&self) -> &str {
        match self {
            Self::ArgumentMismatch { handler, .. }
            | Self::HandlerFailure { handler, .. }
            | Self::HandlerPanicked { handler, .. }
            | Self::Cancelled { handler }
            | Self::NoRuntime { handler } => handler,
        }
    }

    /// `true` for errors raised from inside the handler body (returned
    /// errors and panics alike).
    pub fn is_handler_failure(&self) -> bool {
        matches!(
            self,
            Self::HandlerFailure { .. } | Self::HandlerPanicked { .. }
        )
    }

    pub fn is_argument_mismatch(&self) -> bool {
        matches!(self, Self::ArgumentMismatch { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display() {
        let err = DispatchError::ArgumentMismatch {
            handler: "set_value".into(),
            reason: MismatchReason::Unexpected("colour".into()),
        };
        assert_eq!(
            err.to_string(),
            "handler 'set_value' rejected arguments: unexpected keyword argument 'colour'"
        );
        assert!(err.is_argument_mismatch());
        assert!(!err.is_handler_failure());
    }

    #[test]
    fn test_handler_failure_keeps_source() {
        let err = DispatchError::HandlerFailure {
            handler: "audit".into(),
            source: anyhow::anyhow!("disk full"),
        };
        assert_eq!(err.handler(), "audit");
        assert!(err.is_handler_failure());
        assert_eq!(
            std::error::Error::source(&err).map(|s| s.to_string()),
            Some("disk full".to_string())
        );
    }

    #[test]
    fn test_panicked_counts_as_handler_failure() {
        let err = DispatchError::HandlerPanicked {
            handler: "h".into(),
            message: "boom".into(),
        };
        assert!(err.is_handler_failure());
        assert_eq!(err.to_string(), "handler 'h' panicked: boom");
    }

    #[test]
    fn test_cancelled_and_no_runtime() {
        let cancelled = DispatchError::Cancelled {
            handler: "slow".into(),
        };
        assert!(cancelled.is_cancelled());

        let no_rt = DispatchError::NoRuntime {
            handler: "fast".into(),
        };
        assert_eq!(no_rt.handler(), "fast");
        assert!(!no_rt.is_handler_failure());
    }
}
