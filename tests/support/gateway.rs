use std::sync::Arc;

use coinbridge::infrastructure::build_gateway;
use coinbridge::infrastructure::config::Config;
use coinbridge::port::{ExchangeGateway, StreamConnector};
use coinbridge::testkit::{ScriptedConnector, ScriptedTransport};

use super::config::exchange_toml;

/// Gateway for `kind` over scripted transports.
pub fn scripted_gateway(
    kind: &str,
    transport: &ScriptedTransport,
    connector: &Arc<ScriptedConnector>,
) -> Arc<dyn ExchangeGateway> {
    let config = Config::parse_toml(&exchange_toml(kind)).expect("parse config");
    let connector: Arc<dyn StreamConnector> = connector.clone();
    build_gateway(&config, Arc::new(transport.clone()), connector).expect("build gateway")
}
