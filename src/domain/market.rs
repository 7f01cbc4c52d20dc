//! Canonical market-data payloads delivered to feed callbacks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::OrderSide;

/// A single price level (price and amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

impl PriceLevel {
    #[must_use]
    pub const fn new(price: Decimal, amount: Decimal) -> Self {
        Self { price, amount }
    }
}

/// Order book depth snapshot. Bids best-first (descending), asks best-first
/// (ascending), as the exchange sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Depth {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Depth {
    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }
}

/// A public trade print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub price: Decimal,
    pub amount: Decimal,
    /// Taker side, when the exchange reports it.
    pub side: Option<OrderSide>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// One candlestick bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Base-currency volume.
    pub volume: Decimal,
    pub opened_at: Option<DateTime<Utc>>,
}
