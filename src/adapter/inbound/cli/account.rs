//! Handlers for the account and order commands.

use crate::domain::{OrderFilter, OrderId, OrderPlacement};
use crate::error::Result;
use crate::port::ExchangeGateway;

use super::command::{OrdersArgs, PlaceArgs};
use super::output::Output;

pub async fn balances(gateway: &dyn ExchangeGateway, out: Output) -> Result<()> {
    let balances = gateway.balances().await?;
    out.balances(&balances);
    Ok(())
}

pub async fn order(gateway: &dyn ExchangeGateway, id: &str, out: Output) -> Result<()> {
    let order = gateway.order(&OrderId::new(id)).await?;
    out.order(&order);
    Ok(())
}

pub async fn orders(gateway: &dyn ExchangeGateway, args: OrdersArgs, out: Output) -> Result<()> {
    let mut filter = OrderFilter::new(args.pair).with_states(args.states.into_iter().map(Into::into));
    if let Some(limit) = args.limit {
        filter = filter.with_limit(limit);
    }
    let orders = gateway.orders(&filter).await?;
    out.orders(&orders);
    Ok(())
}

pub async fn place(gateway: &dyn ExchangeGateway, args: PlaceArgs, out: Output) -> Result<()> {
    let placement = build_placement(args);
    let order_id = gateway.place_order(&placement).await?;
    out.placed(order_id.as_str());
    Ok(())
}

pub async fn cancel(gateway: &dyn ExchangeGateway, id: &str, out: Output) -> Result<()> {
    let order_id = OrderId::new(id);
    gateway.cancel_order(&order_id).await?;
    out.cancel_requested(order_id.as_str());
    Ok(())
}

fn build_placement(args: PlaceArgs) -> OrderPlacement {
    OrderPlacement {
        pair: args.pair,
        side: args.side.into(),
        kind: args.kind.into(),
        price: args.price,
        amount: args.amount,
        price_precision: args.price_precision,
        amount_precision: args.amount_precision,
    }
}
