//! FCoin REST payloads.

use serde::Deserialize;

use super::vocabulary::{ORDER_KINDS, ORDER_SIDES, ORDER_STATES};
use crate::domain::{Balance, BalanceRole, Order, OrderId, OrderKind};
use crate::error::Result;
use crate::normalize::{millis_to_datetime, optional_decimal, required_decimal};

#[derive(Debug, Clone, Deserialize)]
pub struct FcoinBalance {
    pub currency: String,
    pub available: String,
    pub frozen: String,
}

impl FcoinBalance {
    /// One available and one frozen entry.
    ///
    /// # Errors
    ///
    /// Fails on non-numeric amounts.
    pub fn to_balances(&self) -> Result<[Balance; 2]> {
        let currency = self.currency.to_ascii_uppercase();
        Ok([
            Balance::new(
                currency.clone(),
                required_decimal("available", Some(self.available.as_str()))?,
                BalanceRole::Available,
            ),
            Balance::new(
                currency,
                required_decimal("frozen", Some(self.frozen.as_str()))?,
                BalanceRole::Frozen,
            ),
        ])
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcoinOrder {
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub side: String,
    #[serde(default)]
    pub price: Option<String>,
    pub amount: String,
    pub state: String,
    #[serde(default)]
    pub filled_amount: Option<String>,
    /// Unix milliseconds.
    #[serde(default)]
    pub created_at: i64,
}

impl FcoinOrder {
    /// # Errors
    ///
    /// Fails when a literal is outside the vocabulary or a quantity does not
    /// parse.
    pub fn to_order(&self) -> Result<Order> {
        let kind = ORDER_KINDS.decode(self.kind.as_str())?;
        let price = match kind {
            OrderKind::Market => None,
            OrderKind::Limit => optional_decimal("price", self.price.as_deref())?,
        };
        Ok(Order {
            id: OrderId::new(self.id.clone()),
            symbol: self.symbol.clone(),
            side: ORDER_SIDES.decode(self.side.as_str())?,
            kind,
            state: ORDER_STATES.decode(self.state.as_str())?,
            price,
            amount: required_decimal("amount", Some(self.amount.as_str()))?,
            filled_amount: optional_decimal("filled_amount", self.filled_amount.as_deref())?
                .unwrap_or_default(),
            created_at: millis_to_datetime(self.created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderSide, OrderState};
    use crate::error::Error;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn order(state: &str) -> FcoinOrder {
        serde_json::from_value(json!({
            "id": "9d17a03b852e48c0b3920c7412867623",
            "symbol": "btcusdt",
            "type": "limit",
            "side": "sell",
            "price": "6500.00",
            "amount": "0.0100",
            "state": state,
            "executed_value": "65.0",
            "fill_fees": "0.065",
            "filled_amount": "0.0100",
            "created_at": 1_531_734_000_000_i64,
            "source": "api"
        }))
        .unwrap()
    }

    #[test]
    fn fully_filled_order_is_filled() {
        let order = order("filled").to_order().unwrap();
        assert_eq!(order.state, OrderState::Filled);
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.filled_amount, order.amount);
        assert_eq!(order.price, Some(dec!(6500)));
        assert_eq!(order.created_at.unwrap().timestamp(), 1_531_734_000);
    }

    #[test]
    fn unknown_state_is_an_error() {
        assert!(matches!(
            order("weird_state").to_order(),
            Err(Error::UnknownVocabulary { exchange: "fcoin", .. })
        ));
    }

    #[test]
    fn balance_splits_into_roles() {
        let balance: FcoinBalance = serde_json::from_value(json!({
            "currency": "btc", "category": "spot", "available": "0.5",
            "frozen": "0.25", "balance": "0.75"
        }))
        .unwrap();
        let [available, frozen] = balance.to_balances().unwrap();
        assert_eq!(available.role, BalanceRole::Available);
        assert_eq!(available.amount, dec!(0.5));
        assert_eq!(frozen.amount, dec!(0.25));
        assert_eq!(frozen.currency, "BTC");
    }
}
