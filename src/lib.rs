//! coinbridge - one trading and market-data interface over several
//! cryptocurrency exchanges.
//!
//! Each exchange adapter hides three things behind [`port::ExchangeGateway`]:
//! how requests are canonicalized and signed, how native field values map to
//! canonical ones, and how its market stream names and frames topics.
//!
//! # Modules
//!
//! - [`signing`] - HMAC signature schemes over canonical payloads
//! - [`codec`] - Canonical parameter ordering and escaping
//! - [`normalize`] - Vocabulary tables and numeric parsing
//! - [`feed`] - Market stream dispatcher and topic routing
//! - [`domain`] - Canonical orders, balances and market data
//! - [`port`] - The gateway trait and transport capabilities
//! - [`adapter`] - Exchange gateways, transports and the CLI
//! - [`infrastructure`] - Configuration and gateway construction
//!
//! # Example
//!
//! ```no_run
//! use coinbridge::domain::{OrderPlacement, OrderSide, Pair};
//! use coinbridge::infrastructure::{build_default_gateway, config::Config};
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> coinbridge::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let gateway = build_default_gateway(&config)?;
//! let placement = OrderPlacement::limit(
//!     Pair::new("BTC", "USDT"),
//!     OrderSide::Buy,
//!     Decimal::new(1000, 1),
//!     Decimal::new(15, 1),
//! );
//! let order_id = gateway.place_order(&placement).await?;
//! # let _ = order_id;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod codec;
pub mod domain;
pub mod error;
pub mod feed;
pub mod infrastructure;
pub mod normalize;
pub mod port;
pub mod signing;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
