//! Gateway factory.
//!
//! Maps the configured [`Exchange`] to its adapter. Transports are passed in
//! so tests and embedders can supply their own.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::{
    BiboxGateway, FcoinGateway, HuobiGateway, ReqwestTransport, TungsteniteConnector,
};
use crate::error::{ConfigError, Result};
use crate::port::{Exchange, ExchangeGateway, HttpTransport, StreamConnector};

use super::config::Config;

/// Build the gateway for `config.exchange.kind` over the given transports.
///
/// # Errors
///
/// Fails on invalid credentials or unusable endpoints.
pub fn build_gateway(
    config: &Config,
    http: Arc<dyn HttpTransport>,
    connector: Arc<dyn StreamConnector>,
) -> Result<Arc<dyn ExchangeGateway>> {
    let credentials = config.credentials();
    let kind = config.exchange.kind;
    let gateway: Arc<dyn ExchangeGateway> = match kind {
        Exchange::Huobi => Arc::new(HuobiGateway::new(
            config.huobi_settings(),
            credentials,
            http,
            connector,
        )?),
        Exchange::Fcoin => Arc::new(FcoinGateway::new(
            config.fcoin_settings(),
            credentials,
            http,
            connector,
        )?),
        Exchange::Bibox | Exchange::Coinpark => {
            let settings = config.bibox_settings().ok_or(ConfigError::InvalidValue {
                field: "exchange.kind",
                reason: format!("no bibox endpoints for {kind}"),
            })?;
            Arc::new(BiboxGateway::new(kind, settings, credentials, http, connector)?)
        }
    };
    info!(exchange = %kind, "Gateway ready");
    Ok(gateway)
}

/// Build the gateway over the production reqwest and tungstenite transports.
///
/// # Errors
///
/// Fails when the HTTP client cannot be built or [`build_gateway`] fails.
pub fn build_default_gateway(config: &Config) -> Result<Arc<dyn ExchangeGateway>> {
    let http = Arc::new(ReqwestTransport::new(&config.http)?);
    build_gateway(config, http, Arc::new(TungsteniteConnector))
}
