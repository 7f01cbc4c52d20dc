use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use coinbridge::adapter::inbound::cli::command::Cli;
use coinbridge::adapter::inbound::cli::dispatch;
use coinbridge::infrastructure::{build_default_gateway, config::Config};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "Fatal error");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // tokio-tungstenite and reqwest both pull in rustls; pin the ring provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.init_logging();
    info!(exchange = %config.exchange.kind, "coinbridge starting");

    let gateway = build_default_gateway(&config).context("failed to build gateway")?;
    dispatch::execute(cli.command, gateway.as_ref(), cli.json).await?;
    Ok(())
}
