//! Operator-facing output: tables for people, JSON lines for scripts.

use serde::Serialize;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::domain::{Balance, Candle, Depth, Order, Trade};

/// How results are rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

impl Output {
    #[must_use]
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn balances(&self, balances: &[Balance]) {
        if self.json {
            return emit("balances", balances);
        }
        if balances.is_empty() {
            println!("No balances.");
            return;
        }
        let rows = balances.iter().map(|b| BalanceRow {
            currency: b.currency.clone(),
            role: b.role.as_str(),
            amount: b.amount.normalize().to_string(),
        });
        println!("{}", Table::new(rows));
    }

    pub fn orders(&self, orders: &[Order]) {
        if self.json {
            return emit("orders", orders);
        }
        if orders.is_empty() {
            println!("No orders.");
            return;
        }
        println!("{}", Table::new(orders.iter().map(OrderRow::from)));
    }

    pub fn order(&self, order: &Order) {
        if self.json {
            return emit("order", order);
        }
        println!("{}", Table::new([OrderRow::from(order)]));
    }

    pub fn placed(&self, order_id: &str) {
        if self.json {
            return emit("placed", json!({ "order_id": order_id }));
        }
        println!("Order placed: {order_id}");
    }

    pub fn cancel_requested(&self, order_id: &str) {
        if self.json {
            return emit("cancel_requested", json!({ "order_id": order_id }));
        }
        println!("Cancel requested: {order_id}");
    }

    pub fn depth(&self, symbol: &str, depth: &Depth) {
        if self.json {
            return emit("depth", json!({ "symbol": symbol, "depth": depth }));
        }
        let side = |level: Option<&crate::domain::PriceLevel>| {
            level.map_or_else(|| "-".to_string(), |l| format!("{} x {}", l.price, l.amount))
        };
        println!(
            "{symbol:<12} bid {:<28} ask {}",
            side(depth.best_bid()),
            side(depth.best_ask())
        );
    }

    pub fn trades(&self, symbol: &str, trades: &[Trade]) {
        if self.json {
            return emit("trades", json!({ "symbol": symbol, "trades": trades }));
        }
        for trade in trades {
            let side = trade.side.map_or_else(|| "-".to_string(), |s| s.to_string());
            println!("{symbol:<12} {side:<4} {} @ {}", trade.amount, trade.price);
        }
    }

    pub fn candle(&self, symbol: &str, period: &str, candle: &Candle) {
        if self.json {
            return emit("candle", json!({ "symbol": symbol, "period": period, "candle": candle }));
        }
        println!(
            "{symbol:<12} {period:<6} o {} h {} l {} c {} v {}",
            candle.open, candle.high, candle.low, candle.close, candle.volume
        );
    }
}

fn emit(kind: &str, payload: impl Serialize) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Role")]
    role: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Side")]
    side: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Filled")]
    filled: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            symbol: order.symbol.clone(),
            side: order.side.to_string(),
            kind: order.kind.to_string(),
            state: order.state.to_string(),
            price: order
                .price
                .map_or_else(|| "market".to_string(), |p| p.normalize().to_string()),
            amount: order.amount.normalize().to_string(),
            filled: order.filled_amount.normalize().to_string(),
            created: order
                .created_at
                .map_or_else(String::new, |t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}
