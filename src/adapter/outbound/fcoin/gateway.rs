//! FCoin REST gateway.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use super::dto::{FcoinBalance, FcoinOrder};
use super::feed::FcoinFeedProtocol;
use super::settings::FcoinSettings;
use super::vocabulary::{AUTH_ERROR_CODES, ORDER_KINDS, ORDER_SIDES, ORDER_STATES};
use super::EXCHANGE;
use crate::adapter::outbound::rest::{
    from_value, parse_json, rejection, scalar_text, to_placement_result,
};
use crate::codec::{canonicalize, escape, to_query_string, Params};
use crate::domain::{
    merge_balances, Balance, Depth, Order, OrderFilter, OrderId, OrderPlacement,
};
use crate::error::{ConfigError, Error, Result, ValidationError};
use crate::feed::{FeedProtocol, MarketFeed};
use crate::port::{
    Clock, Exchange, ExchangeGateway, HttpRequest, HttpTransport, StreamConnector, SystemClock,
};
use crate::signing::{sign, Credentials, HttpMethod, SignatureScheme, SigningContext};

const HEADER_KEY: &str = "FC-ACCESS-KEY";
const HEADER_SIGNATURE: &str = "FC-ACCESS-SIGNATURE";
const HEADER_TIMESTAMP: &str = "FC-ACCESS-TIMESTAMP";

pub struct FcoinGateway {
    /// Always ends with `/`; signed verbatim.
    base_url: String,
    credentials: Credentials,
    http: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    feed: MarketFeed,
}

impl FcoinGateway {
    /// # Errors
    ///
    /// Returns [`Error::CredentialsInvalid`] for an empty key or secret and a
    /// config error for an unusable REST URL.
    pub fn new(
        settings: FcoinSettings,
        credentials: Credentials,
        http: Arc<dyn HttpTransport>,
        connector: Arc<dyn StreamConnector>,
    ) -> Result<Self> {
        if credentials.access_key.is_empty() {
            return Err(Error::CredentialsInvalid("access key is empty"));
        }
        if credentials.secret.is_empty() {
            return Err(Error::CredentialsInvalid("secret key is empty"));
        }
        Url::parse(&settings.rest_url).map_err(|e| ConfigError::InvalidValue {
            field: "endpoints.rest_url",
            reason: e.to_string(),
        })?;
        let mut base_url = settings.rest_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            base_url,
            credentials,
            http,
            clock: Arc::new(SystemClock),
            feed: MarketFeed::new(settings.ws_url, Arc::new(FcoinFeedProtocol), connector),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Public order book snapshot. `level` is `L20`, `L100` or `full`.
    ///
    /// # Errors
    ///
    /// Returns transport, exchange or decode errors.
    pub async fn depth_snapshot(&self, level: &str, symbol: &str) -> Result<Depth> {
        let url = format!(
            "{}market/depth/{}/{}",
            self.base_url,
            escape(level),
            escape(symbol)
        );
        let data: Value = self.call(HttpRequest::get(url)).await?;
        FcoinFeedProtocol.decode_depth(&data)
    }

    fn signed(&self, method: HttpMethod, path: &str, params: Params) -> Result<HttpRequest> {
        let params = canonicalize(params);
        let encoded = to_query_string(&params);
        let (query, body) = match method {
            HttpMethod::Get => (encoded.as_str(), ""),
            HttpMethod::Post => ("", encoded.as_str()),
        };
        let timestamp_ms = self.clock.now().timestamp_millis();
        let ctx = SigningContext {
            method,
            host: &self.base_url,
            path,
            query,
            body,
            timestamp_ms,
            secret: &self.credentials.secret,
        };
        let signature = sign(&ctx, SignatureScheme::TimestampPath)?;

        let request = match method {
            HttpMethod::Get if query.is_empty() => HttpRequest::get(format!("{}{path}", self.base_url)),
            HttpMethod::Get => HttpRequest::get(format!("{}{path}?{query}", self.base_url)),
            HttpMethod::Post => {
                let json: Map<String, Value> = params
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
                HttpRequest::post(format!("{}{path}", self.base_url), Value::Object(json).to_string())
                    .header("Content-Type", "application/json")
            }
        };
        Ok(request
            .header(HEADER_KEY, self.credentials.access_key.as_str())
            .header(HEADER_SIGNATURE, signature)
            .header(HEADER_TIMESTAMP, timestamp_ms.to_string()))
    }

    async fn call<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.http.execute(request).await?;
        let envelope = parse_json(&response)?;
        let status = envelope.get("status").and_then(scalar_text).unwrap_or_default();
        if status != "0" {
            let message = envelope["msg"].as_str().unwrap_or_default().to_string();
            debug!(exchange = EXCHANGE, code = %status, "Request rejected");
            return Err(rejection(EXCHANGE, AUTH_ERROR_CODES, status, message));
        }
        from_value("fcoin data", envelope["data"].clone())
    }
}

#[async_trait]
impl ExchangeGateway for FcoinGateway {
    fn exchange(&self) -> Exchange {
        Exchange::Fcoin
    }

    async fn balances(&self) -> Result<Vec<Balance>> {
        let request = self.signed(HttpMethod::Get, "accounts/balance", Vec::new())?;
        let rows: Vec<FcoinBalance> = self.call(request).await?;
        let mut entries = Vec::with_capacity(rows.len() * 2);
        for row in &rows {
            entries.extend(row.to_balances()?);
        }
        Ok(merge_balances(entries))
    }

    async fn place_order(&self, placement: &OrderPlacement) -> Result<OrderId> {
        placement.validate()?;
        let mut params = vec![
            ("symbol".to_string(), placement.pair.joined_lower()),
            ("side".to_string(), ORDER_SIDES.try_encode(placement.side)?.to_string()),
            ("type".to_string(), ORDER_KINDS.try_encode(placement.kind)?.to_string()),
            ("amount".to_string(), placement.amount_text()),
        ];
        if let Some(price) = placement.price_text() {
            params.push(("price".to_string(), price));
        }
        let request = self.signed(HttpMethod::Post, "orders", params)?;
        let data: Value = self.call(request).await?;
        let id = to_placement_result("fcoin order id", &data)?;
        info!(exchange = EXCHANGE, order_id = %id, symbol = %placement.pair, "Order placed");
        Ok(id)
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        if order_id.is_empty() {
            return Err(ValidationError::EmptyOrderId.into());
        }
        let path = format!("orders/{}/submit-cancel", escape(order_id.as_str()));
        let request = self.signed(HttpMethod::Post, &path, Vec::new())?;
        let _: Value = self.call(request).await?;
        info!(exchange = EXCHANGE, order_id = %order_id, "Cancel accepted");
        Ok(())
    }

    async fn order(&self, order_id: &OrderId) -> Result<Order> {
        if order_id.is_empty() {
            return Err(ValidationError::EmptyOrderId.into());
        }
        let path = format!("orders/{}", escape(order_id.as_str()));
        let request = self.signed(HttpMethod::Get, &path, Vec::new())?;
        let order: FcoinOrder = self.call(request).await?;
        order.to_order()
    }

    async fn orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let states = filter
            .effective_states()
            .into_iter()
            .map(|state| ORDER_STATES.try_encode(state))
            .collect::<Result<Vec<_>>>()?
            .join(",");
        let mut params = vec![
            ("symbol".to_string(), filter.pair.joined_lower()),
            ("states".to_string(), states),
        ];
        if let Some(limit) = filter.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        let request = self.signed(HttpMethod::Get, "orders", params)?;
        let orders: Vec<FcoinOrder> = self.call(request).await?;
        orders.iter().map(FcoinOrder::to_order).collect()
    }

    fn feed(&self) -> &MarketFeed {
        &self.feed
    }
}
