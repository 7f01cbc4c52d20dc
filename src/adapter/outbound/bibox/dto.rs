//! Bibox-family payloads. Quantities arrive as strings or numbers depending
//! on the endpoint, so they are kept as raw JSON until normalized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::vocabulary::{decode_code, ORDER_KINDS, ORDER_SIDES, ORDER_STATES};
use crate::adapter::outbound::rest::scalar_text;
use crate::domain::{Balance, BalanceRole, Order, OrderId, OrderKind};
use crate::error::{Error, Result};
use crate::normalize::{decimal_from_json, millis_to_datetime};

/// One entry of the `cmds` array.
#[derive(Debug, Clone, Serialize)]
pub struct BiboxCommand<'a> {
    pub cmd: &'a str,
    pub body: Value,
}

/// Signed envelope posted to `/v1/<group>`.
#[derive(Debug, Clone, Serialize)]
pub struct BiboxSignedRequest<'a> {
    pub cmds: &'a str,
    pub apikey: &'a str,
    pub sign: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiboxAssets {
    pub assets_list: Vec<BiboxAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiboxAsset {
    pub coin_symbol: String,
    pub balance: Value,
    pub freeze: Value,
}

impl BiboxAsset {
    /// # Errors
    ///
    /// Fails on non-numeric amounts.
    pub fn to_balances(&self) -> Result<[Balance; 2]> {
        let currency = self.coin_symbol.to_ascii_uppercase();
        Ok([
            Balance::new(
                currency.clone(),
                decimal_from_json("balance", &self.balance)?,
                BalanceRole::Available,
            ),
            Balance::new(
                currency,
                decimal_from_json("freeze", &self.freeze)?,
                BalanceRole::Frozen,
            ),
        ])
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiboxPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub items: Vec<BiboxOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiboxOrder {
    pub id: Value,
    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
    #[serde(default)]
    pub pair: Option<String>,
    pub coin_symbol: String,
    pub currency_symbol: String,
    pub order_side: Value,
    pub order_type: Value,
    pub price: Value,
    pub amount: Value,
    #[serde(default)]
    pub deal_amount: Value,
    pub status: Value,
}

impl BiboxOrder {
    /// `BTC_USDT`, preferring the explicit `pair` field.
    #[must_use]
    pub fn symbol(&self) -> String {
        self.pair
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.coin_symbol, self.currency_symbol))
    }

    /// Errors name `exchange`, the venue that returned the order.
    ///
    /// # Errors
    ///
    /// Fails when an enumeration is outside the vocabulary or a quantity does
    /// not parse.
    pub fn to_order(&self, exchange: &'static str) -> Result<Order> {
        let id = scalar_text(&self.id).ok_or_else(|| Error::decode("bibox order id", &self.id))?;
        let kind = decode_code(&ORDER_KINDS.named(exchange), &self.order_type)?;
        let price = match kind {
            OrderKind::Market => None,
            OrderKind::Limit => Some(decimal_from_json("price", &self.price)?),
        };
        let filled_amount = match &self.deal_amount {
            Value::Null => Default::default(),
            raw => decimal_from_json("deal_amount", raw)?,
        };
        Ok(Order {
            id: OrderId::new(id),
            symbol: self.symbol(),
            side: decode_code(&ORDER_SIDES.named(exchange), &self.order_side)?,
            kind,
            state: decode_code(&ORDER_STATES.named(exchange), &self.status)?,
            price,
            amount: decimal_from_json("amount", &self.amount)?,
            filled_amount,
            created_at: millis_to_datetime(self.created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderSide, OrderState};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn pending_item_normalizes() {
        let order: BiboxOrder = serde_json::from_value(json!({
            "id": 1_234_567, "createdAt": 1_512_756_997_000_i64, "account_type": 0,
            "coin_symbol": "LTC", "currency_symbol": "BTC", "order_side": 2, "order_type": 2,
            "price": "0.00900000", "amount": "1.00000000", "money": "0.00900000",
            "deal_amount": "0.50000000", "deal_percent": "50.00%", "unexecuted": "0.50000000",
            "status": 2
        }))
        .unwrap();
        let order = order.to_order("bibox").unwrap();
        assert_eq!(order.id.as_str(), "1234567");
        assert_eq!(order.symbol, "LTC_BTC");
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.state, OrderState::PartiallyFilled);
        assert_eq!(order.price, Some(dec!(0.009)));
        assert_eq!(order.filled_amount, dec!(0.5));
    }

    #[test]
    fn unknown_status_names_the_venue_and_raw_value() {
        let order: BiboxOrder = serde_json::from_value(json!({
            "id": "1", "coin_symbol": "BTC", "currency_symbol": "USDT", "order_side": 1,
            "order_type": 1, "price": 0, "amount": "1", "status": 700
        }))
        .unwrap();
        match order.to_order("coinpark") {
            Err(Error::UnknownVocabulary { exchange, value, .. }) => {
                assert_eq!(exchange, "coinpark");
                assert_eq!(value, "700");
            }
            other => panic!("expected UnknownVocabulary, got {other:?}"),
        }
    }

    #[test]
    fn asset_reports_balance_and_freeze() {
        let asset: BiboxAsset = serde_json::from_value(json!({
            "coin_symbol": "BIX", "balance": "100.5", "freeze": 2, "BTCValue": "0.1"
        }))
        .unwrap();
        let [available, frozen] = asset.to_balances().unwrap();
        assert_eq!(available.amount, dec!(100.5));
        assert_eq!(frozen.amount, dec!(2));
    }
}
