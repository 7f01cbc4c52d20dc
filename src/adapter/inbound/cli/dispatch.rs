//! Routes a parsed command to its handler.

use crate::error::Result;
use crate::port::ExchangeGateway;

use super::command::Commands;
use super::output::Output;
use super::{account, watch};

/// Run a parsed command against `gateway`.
///
/// # Errors
///
/// Returns whatever the gateway or feed reports.
pub async fn execute(command: Commands, gateway: &dyn ExchangeGateway, json: bool) -> Result<()> {
    let out = Output::new(json);
    match command {
        Commands::Balances => account::balances(gateway, out).await,
        Commands::Order(args) => account::order(gateway, &args.id, out).await,
        Commands::Orders(args) => account::orders(gateway, args, out).await,
        Commands::Place(args) => account::place(gateway, args, out).await,
        Commands::Cancel(args) => account::cancel(gateway, &args.id, out).await,
        Commands::Watch(args) => watch::execute(gateway, args, out).await,
    }
}
