//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exchange-assigned order identifier.
///
/// Opaque: Huobi and Bibox hand out integers, FCoin hex strings. All are
/// carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new `OrderId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the order ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A trading pair split into base and quote currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    base: String,
    quote: String,
}

impl Pair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// `btcusdt` form used by Huobi and FCoin.
    #[must_use]
    pub fn joined_lower(&self) -> String {
        format!(
            "{}{}",
            self.base.to_ascii_lowercase(),
            self.quote.to_ascii_lowercase()
        )
    }

    /// `BTC_USDT` form used by Bibox and CoinPark.
    #[must_use]
    pub fn underscored_upper(&self) -> String {
        format!(
            "{}_{}",
            self.base.to_ascii_uppercase(),
            self.quote.to_ascii_uppercase()
        )
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl std::str::FromStr for Pair {
    type Err = String;

    /// Parses `BTC/USDT`, `BTC_USDT` or `BTC-USDT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once(|c: char| matches!(c, '/' | '_' | '-'))
            .ok_or_else(|| format!("pair '{s}' must look like BASE/QUOTE"))?;
        if base.is_empty() || quote.is_empty() {
            return Err(format!("pair '{s}' has an empty currency"));
        }
        Ok(Self::new(base, quote))
    }
}
