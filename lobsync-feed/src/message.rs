//! Lightstream JSON-RPC message model.
//!
//! Outbound subscribe requests and the inbound frames the board stream can
//! produce: channel messages carrying board diffs, responses acknowledging a
//! subscription, and error objects.

use lobsync_core::PriceLevel;
use lobsync_engine::{BookSnapshot, DiffEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol version sent on every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name of a subscription request.
pub const SUBSCRIBE_METHOD: &str = "subscribe";

/// Method name of a pushed channel message.
pub const CHANNEL_MESSAGE_METHOD: &str = "channelMessage";

/// Channel parameter of a subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSubscription {
    /// Channel name.
    pub channel: String,
}

/// JSON-RPC `subscribe` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeRequest {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Request id, echoed back in the response.
    pub id: String,
    /// Always `"subscribe"`.
    pub method: &'static str,
    /// Channel to subscribe to.
    pub params: ChannelSubscription,
}

impl SubscribeRequest {
    /// Creates a subscription request whose id is derived from the channel.
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        let channel = channel.into();
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: format!("subscribe_{channel}"),
            method: SUBSCRIBE_METHOD,
            params: ChannelSubscription { channel },
        }
    }

    /// Serializes the request to a JSON text frame.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Parameters of a pushed channel message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelParams {
    /// Channel the message was published on.
    pub channel: String,
    /// Channel-specific payload.
    #[serde(default)]
    pub message: Value,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcError {
    /// Error code.
    pub code: i64,
    /// Human readable message.
    pub message: String,
}

/// Any frame received on the board stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InboundMessage {
    /// Server-pushed notification.
    ChannelMessage {
        /// Notification method, `channelMessage` for channel data.
        method: String,
        /// Notification parameters.
        params: ChannelParams,
    },
    /// Response to a request we sent.
    Response {
        /// Id of the request being answered.
        id: String,
        /// Result value; `true` acknowledges a subscription.
        result: Value,
    },
    /// Error response.
    Error {
        /// Id of the failed request, if known.
        #[serde(default)]
        id: Option<String>,
        /// Error details.
        error: RpcError,
    },
    /// Anything else that is valid JSON.
    Other(Value),
}

impl InboundMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if the frame is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Board diff payload of a `lightning_board_*` channel message.
///
/// Every field may be absent; an absent `mid_price` means the reference
/// price is unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BoardMessage {
    /// New reference price.
    #[serde(default)]
    pub mid_price: Option<f64>,
    /// Bid level changes.
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    /// Ask level changes.
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
}

impl From<BoardMessage> for DiffEvent {
    fn from(msg: BoardMessage) -> Self {
        Self {
            bids: msg.bids,
            asks: msg.asks,
            reference_price: msg.mid_price,
        }
    }
}

/// Body of the `getboard` HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoardResponse {
    /// Reference price at snapshot time.
    pub mid_price: f64,
    /// Bid levels.
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    /// Ask levels.
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
    /// Exchange-computed spread. Ignored; the engine derives its own.
    #[serde(default)]
    pub spread: Option<f64>,
}

impl From<BoardResponse> for BookSnapshot {
    fn from(board: BoardResponse) -> Self {
        Self {
            bids: board.bids,
            asks: board.asks,
            reference_price: board.mid_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_request_json() {
        let request = SubscribeRequest::new("lightning_board_BTC_JPY");
        let json: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();

        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], "subscribe_lightning_board_BTC_JPY");
        assert_eq!(json["method"], "subscribe");
        assert_eq!(json["params"]["channel"], "lightning_board_BTC_JPY");
    }

    #[test]
    fn test_parse_channel_message() {
        let text = r#"{"jsonrpc":"2.0","method":"channelMessage","params":{"channel":"lightning_board_BTC_JPY","message":{"mid_price":96.0,"bids":[],"asks":[{"price":94.0,"size":1.5}]}}}"#;

        match InboundMessage::parse(text).unwrap() {
            InboundMessage::ChannelMessage { method, params } => {
                assert_eq!(method, CHANNEL_MESSAGE_METHOD);
                assert_eq!(params.channel, "lightning_board_BTC_JPY");
                let board: BoardMessage = serde_json::from_value(params.message).unwrap();
                assert_eq!(board.mid_price, Some(96.0));
                assert_eq!(board.asks, vec![PriceLevel::new(94.0, 1.5)]);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_parse_response() {
        let text = r#"{"jsonrpc":"2.0","id":"subscribe_lightning_board_BTC_JPY","result":true}"#;

        assert_eq!(
            InboundMessage::parse(text).unwrap(),
            InboundMessage::Response {
                id: "subscribe_lightning_board_BTC_JPY".to_string(),
                result: Value::Bool(true),
            }
        );
    }

    #[test]
    fn test_parse_error() {
        let text = r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32600,"message":"Invalid Request"}}"#;

        match InboundMessage::parse(text).unwrap() {
            InboundMessage::Error { id, error } => {
                assert!(id.is_none());
                assert_eq!(error.code, -32600);
                assert_eq!(error.message, "Invalid Request");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_parse_other_and_invalid() {
        assert!(matches!(
            InboundMessage::parse(r#"{"hello":"world"}"#).unwrap(),
            InboundMessage::Other(_)
        ));
        assert!(InboundMessage::parse("not json").is_err());
    }

    #[test]
    fn test_board_message_defaults() {
        let board: BoardMessage = serde_json::from_str("{}").unwrap();
        let diff = DiffEvent::from(board);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_board_response_into_snapshot() {
        let text = r#"{"mid_price":97.0,"bids":[{"price":95.0,"size":1.0}],"asks":[{"price":100.0,"size":2.0}],"spread":5.0}"#;
        let board: BoardResponse = serde_json::from_str(text).unwrap();
        let snapshot = BookSnapshot::from(board);

        assert_eq!(snapshot.reference_price, 97.0);
        assert_eq!(snapshot.bids, vec![PriceLevel::new(95.0, 1.0)]);
        assert_eq!(snapshot.asks, vec![PriceLevel::new(100.0, 2.0)]);
    }
}
