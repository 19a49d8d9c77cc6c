//! Routes inbound frames to engine-level events.

use crate::error::FeedError;
use crate::message::{BoardMessage, CHANNEL_MESSAGE_METHOD, InboundMessage, SubscribeRequest};
use lobsync_engine::DiffEvent;
use serde_json::Value;

/// Event produced by routing one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The board subscription was acknowledged; fetch a snapshot now.
    InitTrigger,
    /// Board diff to hand to the engine.
    Diff(DiffEvent),
}

/// Maps frames on a product's board channel to [`FeedEvent`]s.
#[derive(Debug, Clone)]
pub struct ChannelRouter {
    product_code: String,
    board_channel: String,
    subscribe_id: String,
}

impl ChannelRouter {
    /// Creates a router for `lightning_board_<product_code>`.
    #[must_use]
    pub fn for_product(product_code: impl Into<String>) -> Self {
        let product_code = product_code.into();
        let board_channel = format!("lightning_board_{product_code}");
        let subscribe_id = SubscribeRequest::new(board_channel.as_str()).id;
        Self {
            product_code,
            board_channel,
            subscribe_id,
        }
    }

    /// Returns the product code.
    #[must_use]
    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    /// Returns the board channel name.
    #[must_use]
    pub fn board_channel(&self) -> &str {
        &self.board_channel
    }

    /// Requests to send after every (re)connect.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<SubscribeRequest> {
        vec![SubscribeRequest::new(self.board_channel.as_str())]
    }

    /// Routes one parsed frame.
    ///
    /// Returns `Ok(None)` for frames that carry nothing for the engine.
    ///
    /// # Errors
    /// Returns `FeedError::Remote` for JSON-RPC error objects and
    /// `FeedError::Json` if a board payload is malformed.
    pub fn route(&self, message: InboundMessage) -> Result<Option<FeedEvent>, FeedError> {
        match message {
            InboundMessage::ChannelMessage { method, params } => {
                if method != CHANNEL_MESSAGE_METHOD || params.channel != self.board_channel {
                    tracing::debug!("Ignoring {} on channel {}", method, params.channel);
                    return Ok(None);
                }
                let board: BoardMessage = serde_json::from_value(params.message)?;
                Ok(Some(FeedEvent::Diff(board.into())))
            }
            InboundMessage::Response { id, result } => {
                if id != self.subscribe_id {
                    tracing::debug!("Ignoring response to {}", id);
                    return Ok(None);
                }
                if result == Value::Bool(true) {
                    tracing::info!("Subscribed to {}", self.board_channel);
                    Ok(Some(FeedEvent::InitTrigger))
                } else {
                    tracing::warn!("Subscription to {} rejected: {}", self.board_channel, result);
                    Ok(None)
                }
            }
            InboundMessage::Error { error, .. } => Err(FeedError::Remote {
                code: error.code,
                message: error.message,
            }),
            InboundMessage::Other(value) => {
                tracing::debug!("Ignoring unrecognized frame: {}", value);
                Ok(None)
            }
        }
    }

    /// Parses and routes one text frame.
    ///
    /// # Errors
    /// Returns `FeedError::Json` for malformed frames, otherwise as
    /// [`route`](Self::route).
    pub fn parse_and_route(&self, text: &str) -> Result<Option<FeedEvent>, FeedError> {
        self.route(InboundMessage::parse(text)?)
    }
}
