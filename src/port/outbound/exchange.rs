//! Exchange port for balances, orders and market data.
//!
//! This is the single capability interface callers program against. Each
//! supported exchange implements it with its own signing scheme and
//! vocabulary tables.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Balance, Order, OrderFilter, OrderId, OrderPlacement, Pair};
use crate::error::Result;
use crate::feed::{Channel, MarketFeed};

/// Supported exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Huobi,
    Fcoin,
    Bibox,
    Coinpark,
}

impl Exchange {
    pub const ALL: [Exchange; 4] = [
        Exchange::Huobi,
        Exchange::Fcoin,
        Exchange::Bibox,
        Exchange::Coinpark,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Exchange::Huobi => "huobi",
            Exchange::Fcoin => "fcoin",
            Exchange::Bibox => "bibox",
            Exchange::Coinpark => "coinpark",
        }
    }

    /// The pair as this exchange spells it in orders and stream topics.
    #[must_use]
    pub fn native_symbol(&self, pair: &Pair) -> String {
        match self {
            Exchange::Huobi | Exchange::Fcoin => pair.joined_lower(),
            Exchange::Bibox | Exchange::Coinpark => pair.underscored_upper(),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Exchange::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported exchange '{s}'"))
    }
}

/// Uniform trading interface over one exchange account.
///
/// Every method is safe to call concurrently on a shared instance.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    fn exchange(&self) -> Exchange;

    /// Available and frozen balances, one entry per currency and role.
    async fn balances(&self) -> Result<Vec<Balance>>;

    /// Submit an order. Invalid placements are rejected before any request.
    async fn place_order(&self, placement: &OrderPlacement) -> Result<OrderId>;

    /// Request cancellation. Success means the exchange accepted the request.
    async fn cancel_order(&self, order_id: &OrderId) -> Result<()>;

    async fn order(&self, order_id: &OrderId) -> Result<Order>;

    async fn orders(&self, filter: &OrderFilter) -> Result<Vec<Order>>;

    /// The exchange's market-data dispatcher.
    fn feed(&self) -> &MarketFeed;

    /// Subscribe `channel` for each symbol. Delivery goes to the callback set
    /// with the matching `MarketFeed::on_*` setter.
    fn subscribe(&self, channel: &Channel, symbols: &[&str]) -> Result<()> {
        self.feed().subscribe_channel(channel, symbols)
    }

    fn unsubscribe(&self, channel: &Channel, symbols: &[&str]) -> Result<()> {
        self.feed().unsubscribe_channel(channel, symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_parses_case_insensitively() {
        assert_eq!("Huobi".parse::<Exchange>().unwrap(), Exchange::Huobi);
        assert_eq!("COINPARK".parse::<Exchange>().unwrap(), Exchange::Coinpark);
        assert!("okex".parse::<Exchange>().is_err());
    }

    #[test]
    fn native_symbol_follows_exchange_family() {
        let pair = Pair::new("btc", "usdt");
        assert_eq!(Exchange::Fcoin.native_symbol(&pair), "btcusdt");
        assert_eq!(Exchange::Coinpark.native_symbol(&pair), "BTC_USDT");
    }
}
