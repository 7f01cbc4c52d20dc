//! Canonical order model shared by every exchange adapter.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, Pair};
use crate::error::ValidationError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub const ALL: [OrderSide; 2] = [OrderSide::Buy, OrderSide::Sell];
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        })
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Limit,
    Market,
}

impl OrderKind {
    pub const ALL: [OrderKind; 2] = [OrderKind::Limit, OrderKind::Market];
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderKind::Limit => "limit",
            OrderKind::Market => "market",
        })
    }
}

/// Lifecycle state of an order as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Submitted,
    PartiallyFilled,
    Filled,
    PartiallyCanceled,
    Canceled,
    PendingCancel,
}

impl OrderState {
    pub const ALL: [OrderState; 6] = [
        OrderState::Submitted,
        OrderState::PartiallyFilled,
        OrderState::Filled,
        OrderState::PartiallyCanceled,
        OrderState::Canceled,
        OrderState::PendingCancel,
    ];

    /// Whether the order can still trade.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(
            self,
            OrderState::Submitted | OrderState::PartiallyFilled | OrderState::PendingCancel
        )
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderState::Submitted => "submitted",
            OrderState::PartiallyFilled => "partially_filled",
            OrderState::Filled => "filled",
            OrderState::PartiallyCanceled => "partially_canceled",
            OrderState::Canceled => "canceled",
            OrderState::PendingCancel => "pending_cancel",
        })
    }
}

/// An order as reported by an exchange.
///
/// Transient: created per response and handed to the caller. `filled_amount`
/// and `state` are propagated exactly as the exchange reports them, even when
/// rounding makes them disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Exchange-native pair identifier (`btcusdt`, `BTC_USDT`, ...).
    pub symbol: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub state: OrderState,
    /// Absent for market orders.
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub filled_amount: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters for placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlacement {
    pub pair: Pair,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub price: Option<Decimal>,
    pub amount: Decimal,
    /// Decimal places the exchange accepts for price.
    pub price_precision: Option<u32>,
    /// Decimal places the exchange accepts for amount.
    pub amount_precision: Option<u32>,
}

impl OrderPlacement {
    pub fn limit(pair: Pair, side: OrderSide, price: Decimal, amount: Decimal) -> Self {
        Self {
            pair,
            side,
            kind: OrderKind::Limit,
            price: Some(price),
            amount,
            price_precision: None,
            amount_precision: None,
        }
    }

    pub fn market(pair: Pair, side: OrderSide, amount: Decimal) -> Self {
        Self {
            pair,
            side,
            kind: OrderKind::Market,
            price: None,
            amount,
            price_precision: None,
            amount_precision: None,
        }
    }

    #[must_use]
    pub fn with_precision(mut self, price: u32, amount: u32) -> Self {
        self.price_precision = Some(price);
        self.amount_precision = Some(amount);
        self
    }

    /// Local checks run before anything touches the network.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a limit order has no price or a
    /// quantity is not positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount {
                amount: self.amount,
            });
        }
        match (self.kind, self.price) {
            (OrderKind::Limit, None) => Err(ValidationError::MissingLimitPrice),
            (_, Some(price)) if price <= Decimal::ZERO => {
                Err(ValidationError::NonPositivePrice { price })
            }
            _ => Ok(()),
        }
    }

    /// Amount rendered for the wire, truncated to the precision hint.
    #[must_use]
    pub fn amount_text(&self) -> String {
        render_decimal(self.amount, self.amount_precision)
    }

    /// Price rendered for the wire, rounded to the precision hint.
    ///
    /// Market orders carry no price.
    #[must_use]
    pub fn price_text(&self) -> Option<String> {
        match self.kind {
            OrderKind::Market => None,
            OrderKind::Limit => self.price.map(|p| render_decimal(p, self.price_precision)),
        }
    }
}

fn render_decimal(value: Decimal, precision: Option<u32>) -> String {
    let value = match precision {
        Some(dp) => value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::ToZero),
        None => value,
    };
    value.normalize().to_string()
}

/// Filter for order listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilter {
    pub pair: Pair,
    /// Empty means every state the exchange can list.
    pub states: Vec<OrderState>,
    pub limit: Option<u32>,
}

impl OrderFilter {
    pub fn new(pair: Pair) -> Self {
        Self {
            pair,
            states: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn with_states(mut self, states: impl IntoIterator<Item = OrderState>) -> Self {
        self.states = states.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// States to query, defaulting to all of them.
    #[must_use]
    pub fn effective_states(&self) -> Vec<OrderState> {
        if self.states.is_empty() {
            OrderState::ALL.to_vec()
        } else {
            self.states.clone()
        }
    }
}
