//! Handler for the `watch` command.

use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::error::Result;
use crate::feed::FeedEvent;
use crate::port::ExchangeGateway;

use super::command::WatchArgs;
use super::output::Output;

/// Subscribe, connect and print updates until Ctrl-C or the stream drops.
pub async fn execute(gateway: &dyn ExchangeGateway, args: WatchArgs, out: Output) -> Result<()> {
    let exchange = gateway.exchange();
    let feed = gateway.feed();
    feed.on_depth(move |symbol, depth| out.depth(symbol, &depth));
    feed.on_trades(move |symbol, trades| out.trades(symbol, &trades));
    feed.on_candles(move |symbol, period, candle| out.candle(symbol, period, &candle));

    let channel = args.to_channel();
    let symbols: Vec<String> = args.pairs.iter().map(|p| exchange.native_symbol(p)).collect();
    let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
    gateway.subscribe(&channel, &symbols)?;

    let mut events = feed.events();
    feed.connect().await?;
    info!(exchange = %exchange, channel = %channel, "Watching; press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            event = events.recv() => match event {
                Ok(FeedEvent::Disconnected { reason }) => {
                    warn!(exchange = %exchange, reason = %reason, "Market feed dropped");
                    break;
                }
                Ok(FeedEvent::Closed) | Err(RecvError::Closed) => break,
                Ok(FeedEvent::Connected) | Err(RecvError::Lagged(_)) => {}
            }
        }
    }

    feed.close().await;
    Ok(())
}
