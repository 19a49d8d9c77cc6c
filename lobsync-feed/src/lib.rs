//! # lobsync Feed
//!
//! Collaborators that drive the reconciliation engine from a live exchange.
//!
//! This crate provides:
//! - The lightstream JSON-RPC message model and channel routing
//! - A snapshot source trait with an HTTP implementation
//! - A reconnecting WebSocket stream with exponential backoff
//! - A feed handler that turns routed events into engine calls

pub mod error;
pub mod handler;
pub mod message;
pub mod reconnect;
pub mod router;
pub mod snapshot;
pub mod stream;

pub use error::FeedError;
pub use handler::FeedHandler;
pub use message::{BoardMessage, BoardResponse, InboundMessage, SubscribeRequest};
pub use reconnect::{ReconnectConfig, ReconnectState};
pub use router::{ChannelRouter, FeedEvent};
pub use snapshot::{HttpSnapshotSource, SnapshotSource};
pub use stream::{BoardStream, StreamConfig};
