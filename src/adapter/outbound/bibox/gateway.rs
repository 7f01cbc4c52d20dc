//! Bibox-family REST gateway.
//!
//! Every private call posts `{"cmds": <json text>, "apikey", "sign"}` to
//! `<rest_url><group>`, where `sign` is HMAC-MD5 over the `cmds` text exactly
//! as sent. Replies wrap per-command results as
//! `{"result": [{"cmd": .., "result": ..}]}`; failures carry an `error`
//! object either at the top level or on the command entry.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use super::dto::{BiboxAssets, BiboxCommand, BiboxOrder, BiboxPage, BiboxSignedRequest};
use super::feed::BiboxFeedProtocol;
use super::settings::BiboxSettings;
use super::vocabulary::{ACCOUNT_TYPE_SPOT, AUTH_ERROR_CODES, ORDER_KINDS, ORDER_SIDES};
use crate::adapter::outbound::rest::{
    from_value, parse_json, rejection, scalar_text, to_placement_result,
};
use crate::codec::{canonicalize, to_query_string};
use crate::domain::{
    merge_balances, Balance, Order, OrderFilter, OrderId, OrderPlacement, OrderState,
};
use crate::error::{ConfigError, Error, Result, ValidationError};
use crate::feed::MarketFeed;
use crate::port::{Exchange, ExchangeGateway, HttpRequest, HttpTransport, StreamConnector};
use crate::signing::{sign, Credentials, HttpMethod, SignatureScheme, SigningContext};

const DEFAULT_PAGE_SIZE: u32 = 50;

pub struct BiboxGateway {
    exchange: Exchange,
    base_url: String,
    host: String,
    credentials: Credentials,
    http: Arc<dyn HttpTransport>,
    feed: MarketFeed,
}

impl BiboxGateway {
    /// # Errors
    ///
    /// Returns [`Error::CredentialsInvalid`] for an empty key or secret and a
    /// config error for an unusable REST URL or a non-Bibox exchange.
    pub fn new(
        exchange: Exchange,
        settings: BiboxSettings,
        credentials: Credentials,
        http: Arc<dyn HttpTransport>,
        connector: Arc<dyn StreamConnector>,
    ) -> Result<Self> {
        if !matches!(exchange, Exchange::Bibox | Exchange::Coinpark) {
            return Err(ConfigError::InvalidValue {
                field: "exchange.kind",
                reason: format!("{exchange} does not speak the bibox protocol"),
            }
            .into());
        }
        if credentials.access_key.is_empty() {
            return Err(Error::CredentialsInvalid("access key is empty"));
        }
        if credentials.secret.is_empty() {
            return Err(Error::CredentialsInvalid("secret key is empty"));
        }
        let url = Url::parse(&settings.rest_url).map_err(|e| ConfigError::InvalidValue {
            field: "endpoints.rest_url",
            reason: e.to_string(),
        })?;
        let host = url
            .host_str()
            .ok_or(ConfigError::InvalidValue {
                field: "endpoints.rest_url",
                reason: "URL has no host".into(),
            })?
            .to_string();

        let protocol = Arc::new(BiboxFeedProtocol::new(exchange.name()));
        let feed = MarketFeed::new(settings.ws_url, protocol, connector);
        let mut base_url = settings.rest_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            exchange,
            base_url,
            host,
            credentials,
            http,
            feed,
        })
    }

    fn name(&self) -> &'static str {
        self.exchange.name()
    }

    /// Public liveness check, `GET <rest_url>public?cmd=ping`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or an error reply.
    pub async fn ping(&self) -> Result<()> {
        let query = to_query_string(&canonicalize([("cmd", "ping")]));
        let url = format!("{}public?{}", self.base_url, query);
        let response = self.http.execute(HttpRequest::get(url)).await?;
        let reply = parse_json(&response)?;
        self.check_error(&reply)?;
        Ok(())
    }

    /// Run one command and return its `result` payload.
    async fn command<T: DeserializeOwned>(&self, cmd: &str, body: Value) -> Result<T> {
        let group = cmd.split_once('/').map_or(cmd, |(group, _)| group);
        let cmds = serde_json::to_string(&[BiboxCommand { cmd, body }])
            .map_err(|e| Error::decode("bibox cmds", e))?;

        let ctx = SigningContext {
            method: HttpMethod::Post,
            host: &self.host,
            path: group,
            query: "",
            body: &cmds,
            timestamp_ms: 0,
            secret: &self.credentials.secret,
        };
        let signed = BiboxSignedRequest {
            cmds: &cmds,
            apikey: &self.credentials.access_key,
            sign: sign(&ctx, SignatureScheme::KeyedBody)?,
        };
        let body = serde_json::to_string(&signed).map_err(|e| Error::decode("bibox request", e))?;
        let request = HttpRequest::post(format!("{}{}", self.base_url, group), body)
            .header("Content-Type", "application/json");

        let response = self.http.execute(request).await?;
        let reply = parse_json(&response)?;
        self.check_error(&reply)?;

        let entry = reply["result"]
            .as_array()
            .and_then(|results| results.iter().find(|r| r["cmd"] == cmd).or(results.first()))
            .ok_or_else(|| Error::decode("bibox reply", format!("no result for {cmd}")))?;
        self.check_error(entry)?;
        from_value("bibox result", entry["result"].clone())
    }

    fn check_error(&self, value: &Value) -> Result<()> {
        let Some(error) = value.get("error") else {
            return Ok(());
        };
        let code = scalar_text(&error["code"]).unwrap_or_else(|| "unknown".into());
        let message = error["msg"].as_str().unwrap_or_default().to_string();
        debug!(exchange = self.name(), code = %code, "Request rejected");
        Err(rejection(self.name(), AUTH_ERROR_CODES, code, message))
    }

    async fn page(&self, cmd: &str, filter: &OrderFilter) -> Result<Vec<BiboxOrder>> {
        let page: BiboxPage = self
            .command(
                cmd,
                json!({
                    "pair": filter.pair.underscored_upper(),
                    "account_type": ACCOUNT_TYPE_SPOT,
                    "page": 1,
                    "size": filter.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                }),
            )
            .await?;
        Ok(page.items)
    }
}

#[async_trait]
impl ExchangeGateway for BiboxGateway {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    async fn balances(&self) -> Result<Vec<Balance>> {
        let assets: BiboxAssets = self.command("transfer/assets", json!({ "select": 1 })).await?;
        let mut entries = Vec::with_capacity(assets.assets_list.len() * 2);
        for asset in &assets.assets_list {
            entries.extend(asset.to_balances()?);
        }
        Ok(merge_balances(entries))
    }

    async fn place_order(&self, placement: &OrderPlacement) -> Result<OrderId> {
        placement.validate()?;
        let body = json!({
            "pair": placement.pair.underscored_upper(),
            "account_type": ACCOUNT_TYPE_SPOT,
            "order_type": ORDER_KINDS.named(self.name()).try_encode(placement.kind)?,
            "order_side": ORDER_SIDES.named(self.name()).try_encode(placement.side)?,
            "price": placement.price_text().unwrap_or_else(|| "0".into()),
            "amount": placement.amount_text(),
        });
        let result: Value = self.command("orderpending/trade", body).await?;
        let id = to_placement_result("bibox order id", &result)?;
        info!(exchange = self.name(), order_id = %id, symbol = %placement.pair, "Order placed");
        Ok(id)
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        if order_id.is_empty() {
            return Err(ValidationError::EmptyOrderId.into());
        }
        let _: Value = self
            .command(
                "orderpending/cancelTrade",
                json!({ "orders_id": order_id.as_str() }),
            )
            .await?;
        info!(exchange = self.name(), order_id = %order_id, "Cancel accepted");
        Ok(())
    }

    async fn order(&self, order_id: &OrderId) -> Result<Order> {
        if order_id.is_empty() {
            return Err(ValidationError::EmptyOrderId.into());
        }
        let order: BiboxOrder = self
            .command("orderpending/order", json!({ "id": order_id.as_str() }))
            .await?;
        order.to_order(self.name())
    }

    /// Open states come from the pending list, the rest from history; both
    /// are filtered locally since neither endpoint takes a state.
    async fn orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let states = filter.effective_states();
        let (open, closed): (Vec<OrderState>, Vec<OrderState>) =
            states.iter().copied().partition(OrderState::is_open);

        let mut items = Vec::new();
        if !open.is_empty() {
            items.extend(self.page("orderpending/orderPendingList", filter).await?);
        }
        if !closed.is_empty() {
            items.extend(self.page("orderpending/pendingHistoryList", filter).await?);
        }

        let mut orders = Vec::with_capacity(items.len());
        for item in &items {
            let order = item.to_order(self.name())?;
            if states.contains(&order.state) && !orders.iter().any(|o: &Order| o.id == order.id) {
                orders.push(order);
            }
        }
        if let Some(limit) = filter.limit {
            orders.truncate(limit as usize);
        }
        Ok(orders)
    }

    fn feed(&self) -> &MarketFeed {
        &self.feed
    }
}
