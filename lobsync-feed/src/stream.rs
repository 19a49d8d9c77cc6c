//! Reconnecting board stream.

use crate::error::FeedError;
use crate::handler::FeedHandler;
use crate::reconnect::{ReconnectConfig, ReconnectState};
use crate::router::{ChannelRouter, FeedEvent};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// Default lightstream JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "wss://ws.lightstream.bitflyer.com/json-rpc";

/// Board stream configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket endpoint.
    pub rpc_url: String,
    /// Timeout for the WebSocket handshake.
    pub connect_timeout: Duration,
    /// Backoff between sessions.
    pub reconnect: ReconnectConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl StreamConfig {
    /// Creates a configuration for `rpc_url` with default timeouts.
    #[must_use]
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Self::default()
        }
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the reconnection behavior.
    #[must_use]
    pub fn reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }
}

/// Subscribes to a board channel and feeds the engine until stopped.
///
/// Each session connects, subscribes, and waits for the acknowledgement,
/// which starts a snapshot fetch in the background. Diffs that arrive before
/// the snapshot lands are buffered by the engine. A failed fetch, a
/// malformed frame or a dropped connection ends the session; the next
/// session resubscribes and fetches a fresh snapshot. The backoff only resets
/// once a session has applied its snapshot.
#[derive(Debug)]
pub struct BoardStream {
    config: StreamConfig,
    router: ChannelRouter,
    handler: FeedHandler,
    reconnect_state: ReconnectState,
}

impl BoardStream {
    /// Creates a stream.
    #[must_use]
    pub fn new(config: StreamConfig, router: ChannelRouter, handler: FeedHandler) -> Self {
        let reconnect_state = ReconnectState::new(config.reconnect.clone());
        Self {
            config,
            router,
            handler,
            reconnect_state,
        }
    }

    /// Returns the feed handler.
    #[must_use]
    pub fn handler(&self) -> &FeedHandler {
        &self.handler
    }

    /// Runs sessions until reconnect attempts are exhausted.
    ///
    /// # Errors
    /// Returns `FeedError::MaxReconnectAttempts` once the backoff gives up.
    pub async fn run(&mut self) -> Result<(), FeedError> {
        loop {
            match self.connect_and_run().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::error!("Session error: {}", e);

                    if let Some(delay) = self.reconnect_state.on_failure() {
                        tracing::info!("Reconnecting in {:?}...", delay);
                        tokio::time::sleep(delay).await;
                    } else {
                        tracing::error!("Max reconnect attempts reached");
                        return Err(FeedError::MaxReconnectAttempts);
                    }
                }
            }
        }
    }

    async fn connect_and_run(&mut self) -> Result<(), FeedError> {
        let (socket, _) = tokio::time::timeout(
            self.config.connect_timeout,
            tokio_tungstenite::connect_async(self.config.rpc_url.as_str()),
        )
        .await
        .map_err(|_| FeedError::ConnectTimeout)??;

        tracing::info!("Connected to {}", self.config.rpc_url);

        let (mut write, mut read) = socket.split();

        for request in self.router.subscriptions() {
            write.send(Message::Text(request.to_json()?)).await?;
            tracing::debug!("Sent subscribe for {}", request.params.channel);
        }

        let mut snapshot_task: Option<JoinHandle<Result<(), FeedError>>> = None;

        let result = loop {
            tokio::select! {
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            match self.router.parse_and_route(&text) {
                                Ok(Some(FeedEvent::InitTrigger)) => {
                                    if let Some(task) = snapshot_task.take() {
                                        task.abort();
                                    }
                                    snapshot_task = Some(self.handler.spawn_snapshot());
                                }
                                Ok(Some(FeedEvent::Diff(diff))) => {
                                    self.handler.apply(diff);
                                }
                                Ok(None) => {}
                                Err(FeedError::Remote { code, message }) => {
                                    tracing::error!("Remote error {}: {}", code, message);
                                }
                                Err(e) => break Err(e),
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            if let Err(e) = write.send(Message::Pong(payload)).await {
                                break Err(e.into());
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            break Err(FeedError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => break Err(e.into()),
                    }
                }

                outcome = join_snapshot(&mut snapshot_task) => {
                    snapshot_task = None;
                    match outcome {
                        Ok(Ok(())) => self.reconnect_state.on_healthy(),
                        Ok(Err(e)) => break Err(e),
                        Err(e) => break Err(FeedError::SnapshotTask { message: e.to_string() }),
                    }
                }
            }
        };

        if let Some(task) = snapshot_task.take() {
            task.abort();
        }
        result
    }
}

/// Waits on the running snapshot task, or forever if there is none.
async fn join_snapshot(
    task: &mut Option<JoinHandle<Result<(), FeedError>>>,
) -> Result<Result<(), FeedError>, tokio::task::JoinError> {
    match task {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
