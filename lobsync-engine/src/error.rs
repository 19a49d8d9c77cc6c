//! Error types for change listeners.

use thiserror::Error;

/// Error returned by a change listener.
///
/// Listener failures are logged by the notifier and never reach the engine.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// IO error while rendering or forwarding the book.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Listener-specific failure.
    #[error("listener error: {message}")]
    Failed {
        /// Error message.
        message: String,
    },
}

impl ListenerError {
    /// Creates a listener failure with the given message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_error_display() {
        let err = ListenerError::failed("terminal gone");
        let msg = err.to_string();
        assert!(msg.contains("listener error"));
        assert!(msg.contains("terminal gone"));
    }

    #[test]
    fn test_listener_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: ListenerError = io.into();
        assert!(matches!(err, ListenerError::Io(_)));
        assert!(err.to_string().contains("pipe closed"));
    }
}
