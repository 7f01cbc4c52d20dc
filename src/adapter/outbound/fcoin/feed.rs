//! FCoin market stream protocol.
//!
//! Every message names itself in `type`; data messages use the topic there
//! (`depth.L20.btcusdt`). Clients must ping within the server's idle window.

use std::time::Duration;

use serde_json::{json, Value};
use uuid::Uuid;

use super::vocabulary::ORDER_SIDES;
use super::EXCHANGE;
use crate::adapter::outbound::rest::scalar_text;
use crate::domain::{Candle, Depth, PriceLevel, Trade};
use crate::error::{Error, Result};
use crate::feed::{Channel, ControlFrame, FeedProtocol, Inbound, SymbolPosition, TopicLayout};
use crate::normalize::{decimal_from_json, millis_to_datetime, seconds_to_datetime};
use crate::port::Frame;

const LAYOUT: TopicLayout = TopicLayout::new('.', SymbolPosition::Last);
const HEARTBEAT: Duration = Duration::from_secs(30);
const DEPTH_LEVEL: &str = "L20";

#[derive(Debug, Clone, Copy, Default)]
pub struct FcoinFeedProtocol;

impl FcoinFeedProtocol {
    fn command(cmd: &str, arg: Value) -> ControlFrame {
        ControlFrame::Structured(json!({
            "cmd": cmd,
            "args": [arg],
            "id": Uuid::new_v4().to_string(),
        }))
    }
}

impl FeedProtocol for FcoinFeedProtocol {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    fn layout(&self) -> TopicLayout {
        LAYOUT
    }

    fn topic(&self, channel: &Channel, symbol: &str) -> String {
        match channel {
            Channel::Depth => format!("depth.{DEPTH_LEVEL}.{symbol}"),
            Channel::Trades => format!("trade.{symbol}"),
            Channel::Candles { period } => format!("candle.{period}.{symbol}"),
        }
    }

    fn subscribe_frame(&self, topic: &str) -> ControlFrame {
        Self::command("sub", json!(topic))
    }

    fn unsubscribe_frame(&self, topic: &str) -> Option<ControlFrame> {
        Some(Self::command("unsub", json!(topic)))
    }

    fn decode(&self, frame: Frame) -> Result<Vec<Inbound>> {
        let message: Value = match frame {
            Frame::Text(text) => serde_json::from_str(&text),
            Frame::Binary(bytes) => serde_json::from_slice(&bytes),
        }
        .map_err(|e| Error::decode("fcoin frame", e))?;

        if let Some(status) = message.get("status").and_then(scalar_text) {
            if status != "0" {
                return Ok(vec![Inbound::Rejected {
                    code: status,
                    message: message["msg"].as_str().unwrap_or_default().to_string(),
                }]);
            }
        }

        let Some(kind) = message["type"].as_str() else {
            return Ok(vec![Inbound::Ignored]);
        };
        let inbound = match kind {
            "hello" | "ping" => Inbound::Ignored,
            "topics" => Inbound::Ack {
                topic: message["topics"][0].as_str().map(str::to_string),
            },
            topic => Inbound::Data {
                topic: topic.to_string(),
                payload: message.clone(),
            },
        };
        Ok(vec![inbound])
    }

    fn heartbeat_interval(&self) -> Option<Duration> {
        Some(HEARTBEAT)
    }

    fn heartbeat(&self, now_ms: i64) -> Option<ControlFrame> {
        Some(Self::command("ping", json!(now_ms)))
    }

    fn decode_depth(&self, payload: &Value) -> Result<Depth> {
        Ok(Depth {
            bids: flat_levels(&payload["bids"])?,
            asks: flat_levels(&payload["asks"])?,
            timestamp: payload["ts"].as_i64().and_then(millis_to_datetime),
        })
    }

    fn decode_trades(&self, payload: &Value) -> Result<Vec<Trade>> {
        let side = match payload["side"].as_str() {
            Some(side) => Some(ORDER_SIDES.decode(side)?),
            None => None,
        };
        Ok(vec![Trade {
            price: decimal_from_json("price", &payload["price"])?,
            amount: decimal_from_json("amount", &payload["amount"])?,
            side,
            timestamp: payload["ts"].as_i64().and_then(millis_to_datetime),
        }])
    }

    fn decode_candle(&self, payload: &Value) -> Result<Candle> {
        Ok(Candle {
            open: decimal_from_json("open", &payload["open"])?,
            high: decimal_from_json("high", &payload["high"])?,
            low: decimal_from_json("low", &payload["low"])?,
            close: decimal_from_json("close", &payload["close"])?,
            volume: decimal_from_json("base_vol", &payload["base_vol"])?,
            opened_at: payload["id"].as_i64().and_then(seconds_to_datetime),
        })
    }
}

/// `[price, amount, price, amount, ...]`.
pub(crate) fn flat_levels(value: &Value) -> Result<Vec<PriceLevel>> {
    let flat = value
        .as_array()
        .ok_or_else(|| Error::decode("depth levels", format!("expected array, got {value}")))?;
    if flat.len() % 2 != 0 {
        return Err(Error::decode("depth levels", "odd number of entries"));
    }
    flat.chunks_exact(2)
        .map(|pair| -> Result<PriceLevel> {
            Ok(PriceLevel::new(
                decimal_from_json("price", &pair[0])?,
                decimal_from_json("amount", &pair[1])?,
            ))
        })
        .collect()
}
