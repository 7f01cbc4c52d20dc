//! Per-exchange streaming protocol.

use std::time::Duration;

use serde_json::Value;

use super::channel::Channel;
use super::topic::TopicLayout;
use crate::domain::{Candle, Depth, Trade};
use crate::error::Result;
use crate::port::Frame;

/// A control frame sent to the exchange.
///
/// Some exchanges take the bare topic string, others a structured JSON
/// request; both are supported.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFrame {
    Topic(String),
    Structured(Value),
}

impl ControlFrame {
    #[must_use]
    pub fn into_frame(self) -> Frame {
        match self {
            ControlFrame::Topic(topic) => Frame::Text(topic),
            ControlFrame::Structured(value) => Frame::Text(value.to_string()),
        }
    }
}

/// What one decoded inbound message means to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Market data for a topic.
    Data { topic: String, payload: Value },
    /// Must be answered on the same stream (server ping).
    Reply(ControlFrame),
    /// Subscription acknowledged.
    Ack { topic: Option<String> },
    /// Subscription or request refused by the exchange.
    Rejected { code: String, message: String },
    /// Nothing of local interest (hello, pong, ...).
    Ignored,
}

/// Wire protocol of one exchange's market-data stream.
pub trait FeedProtocol: Send + Sync {
    fn exchange_name(&self) -> &'static str;

    fn layout(&self) -> TopicLayout;

    /// Native topic for a canonical channel and exchange-native symbol.
    fn topic(&self, channel: &Channel, symbol: &str) -> String;

    fn subscribe_frame(&self, topic: &str) -> ControlFrame;

    /// `None` when the exchange has no unsubscribe request.
    fn unsubscribe_frame(&self, topic: &str) -> Option<ControlFrame>;

    /// Decode one frame into zero or more messages.
    ///
    /// # Errors
    ///
    /// Returns a decode error for malformed frames; the dispatcher logs it and
    /// keeps reading.
    fn decode(&self, frame: Frame) -> Result<Vec<Inbound>>;

    /// Period of client-initiated keepalives, if the exchange needs them.
    fn heartbeat_interval(&self) -> Option<Duration> {
        None
    }

    fn heartbeat(&self, _now_ms: i64) -> Option<ControlFrame> {
        None
    }

    /// # Errors
    ///
    /// Returns a decode error when the payload is not a depth message.
    fn decode_depth(&self, payload: &Value) -> Result<Depth>;

    /// # Errors
    ///
    /// Returns a decode error when the payload is not a trade message.
    fn decode_trades(&self, payload: &Value) -> Result<Vec<Trade>>;

    /// # Errors
    ///
    /// Returns a decode error when the payload is not a candle message.
    fn decode_candle(&self, payload: &Value) -> Result<Candle>;
}
