//! Canonical market-data channels and their typed callbacks.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::protocol::FeedProtocol;
use super::router::TopicHandler;
use crate::domain::{Candle, Depth, Trade};
use crate::error::Result;

/// A canonical market-data channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Depth,
    Trades,
    /// Candlesticks; `period` is the exchange-native period literal
    /// (`1min`, `M1`, ...).
    Candles { period: String },
}

impl Channel {
    pub fn candles(period: impl Into<String>) -> Self {
        Channel::Candles {
            period: period.into(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Depth => f.write_str("depth"),
            Channel::Trades => f.write_str("trades"),
            Channel::Candles { period } => write!(f, "candles({period})"),
        }
    }
}

pub type DepthCallback = Arc<dyn Fn(&str, Depth) + Send + Sync>;
pub type TradeCallback = Arc<dyn Fn(&str, Vec<Trade>) + Send + Sync>;
/// Called with the symbol, the native period and the bar.
pub type CandleCallback = Arc<dyn Fn(&str, &str, Candle) + Send + Sync>;

/// User callbacks for canonical channels. Unset callbacks drop messages.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) depth: RwLock<Option<DepthCallback>>,
    pub(crate) trades: RwLock<Option<TradeCallback>>,
    pub(crate) candles: RwLock<Option<CandleCallback>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChannelKind {
    Depth,
    Trades,
    Candles { period: String },
}

/// Decodes native payloads with the exchange protocol and forwards the
/// canonical value to the current callback.
pub(crate) struct ChannelHandler {
    kind: ChannelKind,
    protocol: Arc<dyn FeedProtocol>,
    callbacks: Arc<Callbacks>,
}

impl ChannelHandler {
    pub(crate) fn new(
        channel: &Channel,
        protocol: Arc<dyn FeedProtocol>,
        callbacks: Arc<Callbacks>,
    ) -> Self {
        let kind = match channel {
            Channel::Depth => ChannelKind::Depth,
            Channel::Trades => ChannelKind::Trades,
            Channel::Candles { period } => ChannelKind::Candles {
                period: period.clone(),
            },
        };
        Self {
            kind,
            protocol,
            callbacks,
        }
    }
}

impl TopicHandler for ChannelHandler {
    fn handle(&self, symbol: &str, payload: &Value) -> Result<()> {
        match &self.kind {
            ChannelKind::Depth => {
                let depth = self.protocol.decode_depth(payload)?;
                let callback = self.callbacks.depth.read().clone();
                if let Some(callback) = callback {
                    callback(symbol, depth);
                }
            }
            ChannelKind::Trades => {
                let trades = self.protocol.decode_trades(payload)?;
                let callback = self.callbacks.trades.read().clone();
                if let Some(callback) = callback {
                    callback(symbol, trades);
                }
            }
            ChannelKind::Candles { period } => {
                let candle = self.protocol.decode_candle(payload)?;
                let callback = self.callbacks.candles.read().clone();
                if let Some(callback) = callback {
                    callback(symbol, period, candle);
                }
            }
        }
        Ok(())
    }
}
