//! Exchange-agnostic domain types.

mod balance;
mod id;
mod market;
mod order;

pub use balance::{merge_balances, Balance, BalanceRole};
pub use id::{OrderId, Pair};
pub use market::{Candle, Depth, PriceLevel, Trade};
pub use order::{Order, OrderFilter, OrderKind, OrderPlacement, OrderSide, OrderState};
