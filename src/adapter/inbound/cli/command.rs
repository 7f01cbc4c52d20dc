//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::domain::{OrderKind, OrderSide, OrderState, Pair};
use crate::feed::Channel;

/// Trade and stream market data on Huobi, FCoin, Bibox and CoinPark
#[derive(Parser, Debug)]
#[command(name = "coinbridge")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show account balances
    Balances,

    /// Show one order
    Order(OrderIdArgs),

    /// List orders for a pair
    Orders(OrdersArgs),

    /// Place an order
    Place(PlaceArgs),

    /// Request cancellation of an order
    Cancel(OrderIdArgs),

    /// Stream market data until interrupted
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct OrderIdArgs {
    /// Exchange order id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct OrdersArgs {
    /// Trading pair, e.g. BTC/USDT
    #[arg(long)]
    pub pair: Pair,

    /// Only these states (repeatable); all states when omitted
    #[arg(long = "state", value_enum)]
    pub states: Vec<StateArg>,

    /// Maximum number of orders
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Debug)]
pub struct PlaceArgs {
    /// Trading pair, e.g. BTC/USDT
    #[arg(long)]
    pub pair: Pair,

    #[arg(long, value_enum)]
    pub side: SideArg,

    #[arg(long, value_enum, default_value = "limit")]
    pub kind: KindArg,

    /// Limit price; required for limit orders
    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long)]
    pub amount: Decimal,

    /// Decimal places accepted for price
    #[arg(long)]
    pub price_precision: Option<u32>,

    /// Decimal places accepted for amount
    #[arg(long)]
    pub amount_precision: Option<u32>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[arg(long, value_enum, default_value = "depth")]
    pub channel: ChannelArg,

    /// Candle period in the exchange's notation, e.g. 1min
    #[arg(long, default_value = "1min")]
    pub period: String,

    /// Pairs to watch, e.g. BTC/USDT
    #[arg(required = true)]
    pub pairs: Vec<Pair>,
}

impl WatchArgs {
    #[must_use]
    pub fn to_channel(&self) -> Channel {
        match self.channel {
            ChannelArg::Depth => Channel::Depth,
            ChannelArg::Trades => Channel::Trades,
            ChannelArg::Candles => Channel::candles(self.period.clone()),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for OrderSide {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Buy => OrderSide::Buy,
            SideArg::Sell => OrderSide::Sell,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Limit,
    Market,
}

impl From<KindArg> for OrderKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Limit => OrderKind::Limit,
            KindArg::Market => OrderKind::Market,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StateArg {
    Submitted,
    PartiallyFilled,
    Filled,
    PartiallyCanceled,
    Canceled,
    PendingCancel,
}

impl From<StateArg> for OrderState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Submitted => OrderState::Submitted,
            StateArg::PartiallyFilled => OrderState::PartiallyFilled,
            StateArg::Filled => OrderState::Filled,
            StateArg::PartiallyCanceled => OrderState::PartiallyCanceled,
            StateArg::Canceled => OrderState::Canceled,
            StateArg::PendingCancel => OrderState::PendingCancel,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ChannelArg {
    Depth,
    Trades,
    Candles,
}
