//! Bibox-family market stream protocol.
//!
//! Pushes are JSON arrays of `{"channel", "binary", "data"}`. With
//! `binary == "1"`, `data` is base64 over a gzip-compressed JSON document.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use tracing::warn;

use super::vocabulary::{decode_code, ORDER_SIDES};
use crate::adapter::outbound::rest::{gunzip, scalar_text};
use crate::domain::{Candle, Depth, PriceLevel, Trade};
use crate::error::{Error, Result};
use crate::feed::{Channel, ControlFrame, FeedProtocol, Inbound, SymbolPosition, TopicLayout};
use crate::normalize::{decimal_from_json, millis_to_datetime};
use crate::port::Frame;

const LAYOUT: TopicLayout = TopicLayout::new('_', SymbolPosition::Segments { start: 3, len: 2 });
const PREFIX: &str = "bibox_sub_spot";

/// Same protocol for every Bibox-family venue; only the name differs.
#[derive(Debug, Clone, Copy)]
pub struct BiboxFeedProtocol {
    name: &'static str,
}

impl BiboxFeedProtocol {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn payload(item: &Value) -> Result<Value> {
        let data = &item["data"];
        let binary = item.get("binary").and_then(scalar_text).as_deref() == Some("1");
        match data {
            Value::String(encoded) if binary => {
                let compressed = BASE64
                    .decode(encoded)
                    .map_err(|e| Error::decode("bibox push", e))?;
                let text = gunzip(&compressed)?;
                serde_json::from_str(&text).map_err(|e| Error::decode("bibox push", e))
            }
            Value::String(text) => {
                serde_json::from_str(text).map_err(|e| Error::decode("bibox push", e))
            }
            other => Ok(other.clone()),
        }
    }
}

impl Default for BiboxFeedProtocol {
    fn default() -> Self {
        Self::new(super::EXCHANGE)
    }
}

impl FeedProtocol for BiboxFeedProtocol {
    fn exchange_name(&self) -> &'static str {
        self.name
    }

    fn layout(&self) -> TopicLayout {
        LAYOUT
    }

    fn topic(&self, channel: &Channel, symbol: &str) -> String {
        match channel {
            Channel::Depth => format!("{PREFIX}_{symbol}_depth"),
            Channel::Trades => format!("{PREFIX}_{symbol}_deals"),
            Channel::Candles { period } => format!("{PREFIX}_{symbol}_kline_{period}"),
        }
    }

    fn subscribe_frame(&self, topic: &str) -> ControlFrame {
        ControlFrame::Structured(json!({ "event": "addChannel", "channel": topic }))
    }

    fn unsubscribe_frame(&self, topic: &str) -> Option<ControlFrame> {
        Some(ControlFrame::Structured(
            json!({ "event": "removeChannel", "channel": topic }),
        ))
    }

    fn decode(&self, frame: Frame) -> Result<Vec<Inbound>> {
        let message: Value = match frame {
            Frame::Text(text) => serde_json::from_str(&text),
            Frame::Binary(bytes) => serde_json::from_slice(&bytes),
        }
        .map_err(|e| Error::decode("bibox frame", e))?;

        match &message {
            Value::Object(fields) => {
                if let Some(nonce) = fields.get("ping") {
                    return Ok(vec![Inbound::Reply(ControlFrame::Structured(
                        json!({ "pong": nonce }),
                    ))]);
                }
                if let Some(error) = fields.get("error") {
                    return Ok(vec![Inbound::Rejected {
                        code: scalar_text(&error["code"]).unwrap_or_default(),
                        message: error["msg"].as_str().unwrap_or_default().to_string(),
                    }]);
                }
                Ok(vec![Inbound::Ignored])
            }
            // A bad item is skipped; its siblings are still delivered.
            Value::Array(items) => Ok(items
                .iter()
                .map(|item| match item["channel"].as_str() {
                    Some(channel) => match Self::payload(item) {
                        Ok(payload) => Inbound::Data {
                            topic: channel.to_string(),
                            payload,
                        },
                        Err(e) => {
                            warn!(
                                exchange = self.name,
                                channel,
                                error = %e,
                                "Skipping undecodable push item"
                            );
                            Inbound::Ignored
                        }
                    },
                    None => Inbound::Ignored,
                })
                .collect()),
            _ => Ok(vec![Inbound::Ignored]),
        }
    }

    fn decode_depth(&self, payload: &Value) -> Result<Depth> {
        Ok(Depth {
            bids: object_levels(&payload["bids"])?,
            asks: object_levels(&payload["asks"])?,
            timestamp: payload["update_time"].as_i64().and_then(millis_to_datetime),
        })
    }

    fn decode_trades(&self, payload: &Value) -> Result<Vec<Trade>> {
        let deals = payload
            .as_array()
            .ok_or_else(|| Error::decode("bibox deals", "expected array"))?;
        deals
            .iter()
            .map(|deal| -> Result<Trade> {
                let side = match &deal["side"] {
                    Value::Null => None,
                    raw => Some(decode_code(&ORDER_SIDES.named(self.name), raw)?),
                };
                Ok(Trade {
                    price: decimal_from_json("price", &deal["price"])?,
                    amount: decimal_from_json("amount", &deal["amount"])?,
                    side,
                    timestamp: deal["time"].as_i64().and_then(millis_to_datetime),
                })
            })
            .collect()
    }

    /// Kline pushes carry recent bars oldest first; the last one is current.
    fn decode_candle(&self, payload: &Value) -> Result<Candle> {
        let bar = match payload {
            Value::Array(bars) => bars
                .last()
                .ok_or_else(|| Error::decode("bibox kline", "empty push"))?,
            bar => bar,
        };
        Ok(Candle {
            open: decimal_from_json("open", &bar["open"])?,
            high: decimal_from_json("high", &bar["high"])?,
            low: decimal_from_json("low", &bar["low"])?,
            close: decimal_from_json("close", &bar["close"])?,
            volume: decimal_from_json("vol", &bar["vol"])?,
            opened_at: bar["time"].as_i64().and_then(millis_to_datetime),
        })
    }
}

/// `[{"price": .., "volume": ..}, ...]`.
fn object_levels(value: &Value) -> Result<Vec<PriceLevel>> {
    let rows = value
        .as_array()
        .ok_or_else(|| Error::decode("depth levels", format!("expected array, got {value}")))?;
    rows.iter()
        .map(|row| -> Result<PriceLevel> {
            Ok(PriceLevel::new(
                decimal_from_json("price", &row["price"])?,
                decimal_from_json("volume", &row["volume"])?,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::rest::gzip;
    use crate::domain::OrderSide;
    use rust_decimal_macros::dec;

    fn push(channel: &str, data: &Value) -> Frame {
        let encoded = BASE64.encode(gzip(&data.to_string()));
        Frame::Text(json!([{ "channel": channel, "binary": "1", "data_type": 1, "data": encoded }]).to_string())
    }

    #[test]
    fn bad_item_does_not_drop_its_siblings() {
        let p = BiboxFeedProtocol::new("coinpark");
        let deals = json!([{"pair": "BTC_USDT", "price": "7500", "amount": "0.1",
            "side": 1, "time": 1_527_757_812_000_i64}]);
        let good = BASE64.encode(gzip(&deals.to_string()));
        let frame = Frame::Text(
            json!([
                { "channel": "bibox_sub_spot_ETH_USDT_deals", "binary": "1", "data": "!!notbase64!!" },
                { "channel": "bibox_sub_spot_BTC_USDT_deals", "binary": "1", "data": good },
            ])
            .to_string(),
        );

        let inbound = p.decode(frame).unwrap();
        let [Inbound::Ignored, Inbound::Data { topic, payload }] = inbound.as_slice() else {
            panic!("expected the good item to survive, got {inbound:?}");
        };
        assert_eq!(topic, "bibox_sub_spot_BTC_USDT_deals");
        assert_eq!(p.decode_trades(payload).unwrap()[0].price, dec!(7500));
    }

    #[test]
    fn symbol_spans_two_segments() {
        let p = BiboxFeedProtocol::default();
        let topic = p.topic(&Channel::candles("1min"), "BTC_USDT");
        assert_eq!(topic, "bibox_sub_spot_BTC_USDT_kline_1min");
        let parsed = p.layout().parse(&topic).unwrap();
        assert_eq!(parsed.symbol, "BTC_USDT");
    }

    #[test]
    fn compressed_depth_push_decodes() {
        let p = BiboxFeedProtocol::default();
        let data = json!({"pair": "BTC_USDT", "update_time": 1_527_757_812_000_i64,
            "asks": [{"price": "7500.1", "volume": "0.3"}],
            "bids": [{"price": "7499.9", "volume": "1.2"}, {"price": "7499.0", "volume": "2"}]});
        let inbound = p.decode(push("bibox_sub_spot_BTC_USDT_depth", &data)).unwrap();
        let [Inbound::Data { topic, payload }] = inbound.as_slice() else {
            panic!("expected one data message, got {inbound:?}");
        };
        assert_eq!(topic, "bibox_sub_spot_BTC_USDT_depth");
        let depth = p.decode_depth(payload).unwrap();
        assert_eq!(depth.best_bid().unwrap().amount, dec!(1.2));
        assert_eq!(depth.best_ask().unwrap().price, dec!(7500.1));
    }

    #[test]
    fn deals_map_numeric_side() {
        let p = BiboxFeedProtocol::default();
        let deals = json!([{"pair": "BTC_USDT", "price": "7500", "amount": "0.1", "time": 1, "side": 2}]);
        let trades = p.decode_trades(&deals).unwrap();
        assert_eq!(trades[0].side, Some(OrderSide::Sell));
    }

    #[test]
    fn kline_uses_latest_bar() {
        let p = BiboxFeedProtocol::default();
        let bars = json!([
            {"time": 1_000, "open": "1", "high": "2", "low": "1", "close": "2", "vol": "5"},
            {"time": 61_000, "open": "2", "high": "3", "low": "2", "close": "3", "vol": "7"}
        ]);
        let candle = p.decode_candle(&bars).unwrap();
        assert_eq!(candle.close, dec!(3));
        assert_eq!(candle.volume, dec!(7));
    }

    #[test]
    fn ping_is_answered() {
        let p = BiboxFeedProtocol::new("coinpark");
        let inbound = p.decode(Frame::Text(r#"{"ping":1527757812000}"#.into())).unwrap();
        assert_eq!(
            inbound,
            vec![Inbound::Reply(ControlFrame::Structured(json!({"pong": 1_527_757_812_000_i64})))]
        );
        assert_eq!(p.exchange_name(), "coinpark");
    }
}
