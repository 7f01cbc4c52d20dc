//! Huobi market stream protocol.
//!
//! Frames arrive gzip-compressed. The server pings with `{"ping": n}` and
//! drops clients that do not answer `{"pong": n}`. Data frames carry the
//! topic in `ch` and the payload in `tick`.

use serde_json::{json, Value};
use uuid::Uuid;

use super::vocabulary::TRADE_DIRECTIONS;
use super::EXCHANGE;
use crate::adapter::outbound::rest::{gunzip, scalar_text};
use crate::domain::{Candle, Depth, PriceLevel, Trade};
use crate::error::{Error, Result};
use crate::feed::{Channel, ControlFrame, FeedProtocol, Inbound, SymbolPosition, TopicLayout};
use crate::normalize::{decimal_from_json, millis_to_datetime, seconds_to_datetime};
use crate::port::Frame;

const LAYOUT: TopicLayout = TopicLayout::new('.', SymbolPosition::Segments { start: 1, len: 1 });

#[derive(Debug, Clone, Copy, Default)]
pub struct HuobiFeedProtocol;

impl FeedProtocol for HuobiFeedProtocol {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    fn layout(&self) -> TopicLayout {
        LAYOUT
    }

    fn topic(&self, channel: &Channel, symbol: &str) -> String {
        match channel {
            Channel::Depth => format!("market.{symbol}.depth.step0"),
            Channel::Trades => format!("market.{symbol}.trade.detail"),
            Channel::Candles { period } => format!("market.{symbol}.kline.{period}"),
        }
    }

    fn subscribe_frame(&self, topic: &str) -> ControlFrame {
        ControlFrame::Structured(json!({ "sub": topic, "id": Uuid::new_v4().to_string() }))
    }

    fn unsubscribe_frame(&self, topic: &str) -> Option<ControlFrame> {
        Some(ControlFrame::Structured(
            json!({ "unsub": topic, "id": Uuid::new_v4().to_string() }),
        ))
    }

    fn decode(&self, frame: Frame) -> Result<Vec<Inbound>> {
        let text = match frame {
            Frame::Binary(bytes) => gunzip(&bytes)?,
            Frame::Text(text) => text,
        };
        let message: Value =
            serde_json::from_str(&text).map_err(|e| Error::decode("huobi frame", e))?;

        if let Some(nonce) = message.get("ping") {
            return Ok(vec![Inbound::Reply(ControlFrame::Structured(
                json!({ "pong": nonce }),
            ))]);
        }
        if let (Some(topic), Some(tick)) = (message["ch"].as_str(), message.get("tick")) {
            return Ok(vec![Inbound::Data {
                topic: topic.to_string(),
                payload: tick.clone(),
            }]);
        }
        if message["status"] == "error" {
            return Ok(vec![Inbound::Rejected {
                code: message["err-code"].as_str().unwrap_or_default().to_string(),
                message: message["err-msg"].as_str().unwrap_or_default().to_string(),
            }]);
        }
        if let Some(topic) = message.get("subbed").or_else(|| message.get("unsubbed")) {
            return Ok(vec![Inbound::Ack {
                topic: topic.as_str().map(str::to_string),
            }]);
        }
        Ok(vec![Inbound::Ignored])
    }

    fn decode_depth(&self, tick: &Value) -> Result<Depth> {
        Ok(Depth {
            bids: levels(&tick["bids"])?,
            asks: levels(&tick["asks"])?,
            timestamp: tick["ts"].as_i64().and_then(millis_to_datetime),
        })
    }

    fn decode_trades(&self, tick: &Value) -> Result<Vec<Trade>> {
        let prints = tick["data"]
            .as_array()
            .ok_or_else(|| Error::decode("huobi trade", "missing data array"))?;
        prints
            .iter()
            .map(|print| -> Result<Trade> {
                let side = match print["direction"].as_str() {
                    Some(direction) => Some(TRADE_DIRECTIONS.decode(direction)?),
                    None => None,
                };
                Ok(Trade {
                    price: decimal_from_json("price", &print["price"])?,
                    amount: decimal_from_json("amount", &print["amount"])?,
                    side,
                    timestamp: print["ts"].as_i64().and_then(millis_to_datetime),
                })
            })
            .collect()
    }

    fn decode_candle(&self, tick: &Value) -> Result<Candle> {
        Ok(Candle {
            open: decimal_from_json("open", &tick["open"])?,
            high: decimal_from_json("high", &tick["high"])?,
            low: decimal_from_json("low", &tick["low"])?,
            close: decimal_from_json("close", &tick["close"])?,
            volume: decimal_from_json("amount", &tick["amount"])?,
            opened_at: tick["id"].as_i64().and_then(seconds_to_datetime),
        })
    }
}

/// `[[price, amount], ...]`.
pub(crate) fn levels(value: &Value) -> Result<Vec<PriceLevel>> {
    let rows = value
        .as_array()
        .ok_or_else(|| Error::decode("depth levels", format!("expected array, got {value}")))?;
    rows.iter()
        .map(|row| match row.as_array().map(Vec::as_slice) {
            Some([price, amount, ..]) => Ok(PriceLevel::new(
                decimal_from_json("price", price)?,
                decimal_from_json("amount", amount)?,
            )),
            _ => Err(Error::decode(
                "depth level",
                scalar_text(row).unwrap_or_else(|| row.to_string()),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::rest::gzip;
    use crate::domain::OrderSide;
    use rust_decimal_macros::dec;

    #[test]
    fn topics_follow_native_naming() {
        let p = HuobiFeedProtocol;
        assert_eq!(p.topic(&Channel::Depth, "btcusdt"), "market.btcusdt.depth.step0");
        assert_eq!(p.topic(&Channel::Trades, "btcusdt"), "market.btcusdt.trade.detail");
        assert_eq!(p.topic(&Channel::candles("1min"), "btcusdt"), "market.btcusdt.kline.1min");
    }

    #[test]
    fn compressed_ping_gets_pong() {
        let inbound = HuobiFeedProtocol
            .decode(Frame::Binary(gzip(r#"{"ping":1492420473027}"#)))
            .unwrap();
        assert_eq!(
            inbound,
            vec![Inbound::Reply(ControlFrame::Structured(json!({"pong": 1492420473027_i64})))]
        );
    }

    #[test]
    fn data_frame_yields_topic_and_tick() {
        let raw = r#"{"ch":"market.btcusdt.depth.step0","ts":1489474082831,
            "tick":{"bids":[[9999.3900,0.0098],[9992.5947,0.3000]],
                    "asks":[[10010.9800,0.0099]],"ts":1489474082831}}"#;
        let inbound = HuobiFeedProtocol.decode(Frame::Binary(gzip(raw))).unwrap();
        let [Inbound::Data { topic, payload }] = inbound.as_slice() else {
            panic!("expected one data message, got {inbound:?}");
        };
        assert_eq!(topic, "market.btcusdt.depth.step0");

        let depth = HuobiFeedProtocol.decode_depth(payload).unwrap();
        assert_eq!(depth.bids.len(), 2);
        assert_eq!(depth.best_bid().unwrap().price, dec!(9999.39));
        assert_eq!(depth.best_ask().unwrap().amount, dec!(0.0099));
        assert!(depth.timestamp.is_some());
    }

    #[test]
    fn sub_ack_and_error_are_recognized() {
        let ack = HuobiFeedProtocol
            .decode(Frame::Text(r#"{"id":"1","status":"ok","subbed":"market.btcusdt.kline.1min","ts":1}"#.into()))
            .unwrap();
        assert_eq!(
            ack,
            vec![Inbound::Ack { topic: Some("market.btcusdt.kline.1min".into()) }]
        );

        let rejected = HuobiFeedProtocol
            .decode(Frame::Text(r#"{"status":"error","err-code":"bad-request","err-msg":"invalid topic"}"#.into()))
            .unwrap();
        assert!(matches!(&rejected[0], Inbound::Rejected { code, .. } if code == "bad-request"));
    }

    #[test]
    fn trade_detail_decodes_direction() {
        let tick = json!({"id": 1, "ts": 1, "data": [
            {"id": 1, "price": 6500.5, "amount": 0.01, "direction": "sell", "ts": 1_530_000_000_000_i64}
        ]});
        let trades = HuobiFeedProtocol.decode_trades(&tick).unwrap();
        assert_eq!(trades[0].side, Some(OrderSide::Sell));
        assert_eq!(trades[0].price, dec!(6500.5));
    }

    #[test]
    fn kline_decodes_base_volume() {
        let tick = json!({"id": 1_489_464_480_i64, "amount": 0.5, "count": 2, "open": 7962.62,
            "close": 7962.62, "low": 7962.62, "high": 7962.62, "vol": 3981.31});
        let candle = HuobiFeedProtocol.decode_candle(&tick).unwrap();
        assert_eq!(candle.volume, dec!(0.5));
        assert_eq!(candle.opened_at.unwrap().timestamp(), 1_489_464_480);
    }
}
