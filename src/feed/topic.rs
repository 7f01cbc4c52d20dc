//! Topic string structure.
//!
//! Topics are separator-delimited segments with the trading symbol at a fixed
//! position, e.g. `market.btcusdt.depth.step0` (Huobi, segment 1),
//! `depth.L20.btcusdt` (FCoin, last segment) or
//! `bibox_sub_spot_BTC_USDT_depth` (Bibox, segments 3 and 4). Replacing the
//! symbol with `*` yields the channel key that handlers are registered under,
//! so one handler serves every symbol of a channel.

use crate::error::ValidationError;

/// Where the symbol sits in a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `len` consecutive segments starting at `start`.
    Segments { start: usize, len: usize },
    /// The final segment.
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicLayout {
    separator: char,
    symbol: SymbolPosition,
}

/// A topic split into its channel key and symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTopic {
    pub channel_key: String,
    pub symbol: String,
}

impl TopicLayout {
    #[must_use]
    pub const fn new(separator: char, symbol: SymbolPosition) -> Self {
        Self { separator, symbol }
    }

    /// Split a topic into channel key and symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTopic`] when the topic has too few
    /// segments or an empty symbol.
    pub fn parse(&self, topic: &str) -> Result<ParsedTopic, ValidationError> {
        let segments: Vec<&str> = topic.split(self.separator).collect();
        let (start, len) = match self.symbol {
            SymbolPosition::Segments { start, len } => (start, len),
            SymbolPosition::Last => (segments.len().saturating_sub(1), 1),
        };
        if segments.len() < 2 || start + len > segments.len() {
            return Err(ValidationError::InvalidTopic {
                topic: topic.to_string(),
                reason: "too few segments",
            });
        }

        let sep = self.separator.to_string();
        let symbol = segments[start..start + len].join(&sep);
        if segments[start..start + len].iter().any(|s| s.is_empty()) {
            return Err(ValidationError::InvalidTopic {
                topic: topic.to_string(),
                reason: "empty symbol",
            });
        }

        let mut key: Vec<&str> = Vec::with_capacity(segments.len() - len + 1);
        key.extend_from_slice(&segments[..start]);
        key.push("*");
        key.extend_from_slice(&segments[start + len..]);

        Ok(ParsedTopic {
            channel_key: key.join(&sep),
            symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUOBI: TopicLayout = TopicLayout::new('.', SymbolPosition::Segments { start: 1, len: 1 });
    const FCOIN: TopicLayout = TopicLayout::new('.', SymbolPosition::Last);
    const BIBOX: TopicLayout = TopicLayout::new('_', SymbolPosition::Segments { start: 3, len: 2 });

    #[test]
    fn huobi_symbol_is_second_segment() {
        let parsed = HUOBI.parse("market.btcusdt.depth.step0").unwrap();
        assert_eq!(parsed.symbol, "btcusdt");
        assert_eq!(parsed.channel_key, "market.*.depth.step0");
    }

    #[test]
    fn symbols_share_a_channel_key() {
        let a = HUOBI.parse("market.btcusdt.kline.1min").unwrap();
        let b = HUOBI.parse("market.ethusdt.kline.1min").unwrap();
        assert_eq!(a.channel_key, b.channel_key);
        assert_ne!(a.symbol, b.symbol);
    }

    #[test]
    fn fcoin_symbol_is_last_segment() {
        let parsed = FCOIN.parse("depth.L20.btcusdt").unwrap();
        assert_eq!(parsed.symbol, "btcusdt");
        assert_eq!(parsed.channel_key, "depth.L20.*");
        assert_eq!(FCOIN.parse("trade.ethbtc").unwrap().channel_key, "trade.*");
    }

    #[test]
    fn bibox_symbol_spans_two_segments() {
        let parsed = BIBOX.parse("bibox_sub_spot_BTC_USDT_kline_1min").unwrap();
        assert_eq!(parsed.symbol, "BTC_USDT");
        assert_eq!(parsed.channel_key, "bibox_sub_spot_*_kline_1min");
    }

    #[test]
    fn short_topics_are_rejected() {
        assert!(HUOBI.parse("market").is_err());
        assert!(FCOIN.parse("ticker").is_err());
        assert!(BIBOX.parse("bibox_sub_spot_BTC").is_err());
        assert!(HUOBI.parse("market..depth").is_err());
    }
}
