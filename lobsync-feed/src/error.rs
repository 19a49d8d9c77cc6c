//! Error types for feed operations.

use thiserror::Error;

/// Error type for feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed before a response arrived.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body, if readable.
        body: String,
    },

    /// WebSocket protocol or IO error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Malformed JSON payload.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error object sent by the JSON-RPC server.
    #[error("remote error (code {code}): {message}")]
    Remote {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// Connection timeout.
    #[error("connection timeout")]
    ConnectTimeout,

    /// Connection closed by server.
    #[error("connection closed")]
    ConnectionClosed,

    /// Maximum reconnect attempts reached.
    #[error("maximum reconnect attempts reached")]
    MaxReconnectAttempts,

    /// The background snapshot fetch panicked or was cancelled.
    #[error("snapshot task failed: {message}")]
    SnapshotTask {
        /// Error message.
        message: String,
    },
}
