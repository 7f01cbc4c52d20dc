//! Huobi REST payloads, field names as sent on the wire.

use serde::{Deserialize, Serialize};

use super::vocabulary::{BALANCE_ROLES, ORDER_STATES, ORDER_TYPES};
use crate::domain::{Balance, Order, OrderId, OrderKind};
use crate::error::Result;
use crate::normalize::{millis_to_datetime, optional_decimal, required_decimal};

#[derive(Debug, Clone, Deserialize)]
pub struct HuobiAccount {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HuobiBalanceSheet {
    pub list: Vec<HuobiBalanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HuobiBalanceEntry {
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub balance: String,
}

impl HuobiBalanceEntry {
    /// # Errors
    ///
    /// Fails on an unknown balance type or a non-numeric balance.
    pub fn to_balance(&self) -> Result<Balance> {
        let role = BALANCE_ROLES.decode(self.kind.as_str())?;
        let amount = required_decimal("balance", Some(self.balance.as_str()))?;
        Ok(Balance::new(self.currency.to_ascii_uppercase(), amount, role))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HuobiPlaceOrder<'a> {
    #[serde(rename = "account-id")]
    pub account_id: &'a str,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub source: &'static str,
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HuobiOrder {
    pub id: u64,
    pub symbol: String,
    pub amount: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(rename = "created-at", default)]
    pub created_at: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "field-amount", alias = "filled-amount", default)]
    pub filled_amount: Option<String>,
    pub state: String,
}

impl HuobiOrder {
    /// # Errors
    ///
    /// Fails when the type or state is outside the vocabulary or a quantity
    /// does not parse.
    pub fn to_order(&self) -> Result<Order> {
        let (side, kind) = ORDER_TYPES.decode(self.kind.as_str())?;
        let state = ORDER_STATES.decode(self.state.as_str())?;
        let price = match kind {
            OrderKind::Market => None,
            OrderKind::Limit => optional_decimal("price", self.price.as_deref())?,
        };
        Ok(Order {
            id: OrderId::new(self.id.to_string()),
            symbol: self.symbol.clone(),
            side,
            kind,
            state,
            price,
            amount: required_decimal("amount", Some(self.amount.as_str()))?,
            filled_amount: optional_decimal("field-amount", self.filled_amount.as_deref())?
                .unwrap_or_default(),
            created_at: millis_to_datetime(self.created_at),
        })
    }
}
