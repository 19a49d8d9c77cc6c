//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};
use lobsync_engine::{EngineConfig, GateConfig, OverflowPolicy};
use lobsync_feed::stream::DEFAULT_RPC_URL;
use lobsync_feed::{ReconnectConfig, StreamConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Default REST base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.bitflyer.com/v1";

/// Pending-buffer overflow policy as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Overflow {
    /// Evict the oldest buffered diff.
    DropOldest,
    /// Discard the incoming diff.
    DropNewest,
}

impl From<Overflow> for OverflowPolicy {
    fn from(value: Overflow) -> Self {
        match value {
            Overflow::DropOldest => Self::DropOldest,
            Overflow::DropNewest => Self::DropNewest,
        }
    }
}

/// Realtime limit order book for a bitFlyer product.
#[derive(Debug, Clone, Parser)]
#[command(name = "lobsync", version, about)]
pub struct Config {
    /// REST API base URL used for board snapshots.
    #[arg(long, env = "BITFLYER_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// JSON-RPC WebSocket endpoint.
    #[arg(long, env = "BITFLYER_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Product code, e.g. BTC_JPY.
    #[arg(long, env = "BITFLYER_CRYPTO_CURRENCY_CODE", default_value = "BTC_JPY")]
    pub product_code: String,

    /// Write logs to `<dir>/lobsync.log` instead of stderr.
    #[arg(long, env = "LOG_OUTPUT_DIRECTORY")]
    pub log_dir: Option<PathBuf>,

    /// Levels shown per side.
    #[arg(long, default_value_t = 25)]
    pub depth: usize,

    /// Maximum diffs buffered before the first snapshot (0 = unbounded).
    #[arg(long, default_value_t = 65_536)]
    pub max_pending: usize,

    /// What to drop when the pending buffer is full.
    #[arg(long, value_enum, default_value_t = Overflow::DropOldest)]
    pub overflow: Overflow,

    /// WebSocket connect timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Snapshot request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub snapshot_timeout_secs: u64,
}

impl Config {
    /// Engine configuration derived from the buffer options.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().gate(
            GateConfig::default()
                .max_pending(self.max_pending)
                .overflow(self.overflow.into()),
        )
    }

    /// Stream configuration with unlimited reconnects.
    #[must_use]
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig::new(self.rpc_url.as_str())
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .reconnect(ReconnectConfig::default())
    }

    /// Timeout applied to each snapshot request.
    #[must_use]
    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_secs(self.snapshot_timeout_secs)
    }
}
