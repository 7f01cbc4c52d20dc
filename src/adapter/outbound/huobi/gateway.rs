//! Huobi REST gateway.
//!
//! Every private call carries `AccessKeyId`, `SignatureMethod`,
//! `SignatureVersion` and `Timestamp` in the query, signed over
//! `METHOD\nhost\npath\nsorted-query`. POST bodies are JSON and not signed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use super::dto::{HuobiAccount, HuobiBalanceSheet, HuobiOrder, HuobiPlaceOrder};
use super::feed::HuobiFeedProtocol;
use super::settings::HuobiSettings;
use super::vocabulary::{AUTH_ERROR_CODES, ORDER_STATES, ORDER_TYPES};
use super::EXCHANGE;
use crate::adapter::outbound::rest::{from_value, parse_json, rejection, to_placement_result};
use crate::codec::{canonicalize, escape, to_query_string};
use crate::domain::{
    merge_balances, Balance, Candle, Order, OrderFilter, OrderId, OrderPlacement,
};
use crate::error::{ConfigError, Error, Result, ValidationError};
use crate::feed::{FeedProtocol, MarketFeed};
use crate::port::{
    Clock, Exchange, ExchangeGateway, HttpRequest, HttpTransport, StreamConnector, SystemClock,
};
use crate::signing::{sign, Credentials, HttpMethod, SignatureScheme, SigningContext};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const SPOT_ACCOUNT: &str = "spot";
const ORDER_SOURCE: &str = "api";

pub struct HuobiGateway {
    base_url: String,
    host: String,
    credentials: Credentials,
    http: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    account_id: OnceCell<String>,
    feed: MarketFeed,
}

impl HuobiGateway {
    /// # Errors
    ///
    /// Returns [`Error::CredentialsInvalid`] for an empty key or secret and a
    /// config error for an unusable REST URL.
    pub fn new(
        settings: HuobiSettings,
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

        let account_id = OnceCell::new_with(settings.account_id.filter(|id| !id.is_empty()));
        let feed = MarketFeed::new(settings.ws_url, Arc::new(HuobiFeedProtocol), connector);

        Ok(Self {
            base_url: settings.rest_url.trim_end_matches('/').to_string(),
            host,
            credentials,
            http,
            clock: Arc::new(SystemClock),
            account_id,
            feed,
        })
    }

    /// Replace the timestamp source used for signing.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The spot account id, discovered once and cached.
    ///
    /// # Errors
    ///
    /// Fails when the account list cannot be fetched or has no spot account.
    pub async fn account_id(&self) -> Result<&str> {
        let id = self
            .account_id
            .get_or_try_init(|| async {
                let accounts: Vec<HuobiAccount> = self
                    .get("/v1/account/accounts", Vec::new())
                    .await?;
                let account = accounts
                    .into_iter()
                    .find(|a| a.kind == SPOT_ACCOUNT)
                    .ok_or_else(|| Error::decode("huobi accounts", "no spot account"))?;
                info!(exchange = EXCHANGE, account_id = account.id, "Resolved spot account");
                Ok::<_, Error>(account.id.to_string())
            })
            .await?;
        Ok(id.as_str())
    }

    /// Recent candlesticks for `symbol`, newest first. `period` is Huobi's
    /// notation (`1min`, `60min`, `1day`, ...); `size` is capped by the
    /// exchange at 2000.
    ///
    /// # Errors
    ///
    /// Returns transport, exchange or decode errors.
    pub async fn klines(&self, symbol: &str, period: &str, size: u32) -> Result<Vec<Candle>> {
        let params = vec![
            ("symbol".to_string(), symbol.to_string()),
            ("period".to_string(), period.to_string()),
            ("size".to_string(), size.to_string()),
        ];
        let bars: Vec<Value> = self.get("/market/history/kline", params).await?;
        bars.iter().map(|bar| HuobiFeedProtocol.decode_candle(bar)).collect()
    }

    /// Signed request URL: base, path and the signed, escaped query.
    fn signed_url(&self, method: HttpMethod, path: &str, params: Vec<(String, String)>) -> Result<String> {
        let now = self.clock.now();
        let mut all = vec![
            ("AccessKeyId".to_string(), self.credentials.access_key.clone()),
            ("SignatureMethod".to_string(), "HmacSHA256".to_string()),
            ("SignatureVersion".to_string(), "2".to_string()),
            ("Timestamp".to_string(), now.format(TIMESTAMP_FORMAT).to_string()),
        ];
        all.extend(params);
        let query = to_query_string(&canonicalize(all));

        let ctx = SigningContext {
            method,
            host: &self.host,
            path,
            query: &query,
            body: "",
            timestamp_ms: now.timestamp_millis(),
            secret: &self.credentials.secret,
        };
        let signature = sign(&ctx, SignatureScheme::SortedQuery)?;
        Ok(format!(
            "{}{}?{}&Signature={}",
            self.base_url,
            path,
            query,
            escape(&signature)
        ))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: Vec<(String, String)>) -> Result<T> {
        let url = self.signed_url(HttpMethod::Get, path, params)?;
        self.call(HttpRequest::get(url)).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = self.signed_url(HttpMethod::Post, path, Vec::new())?;
        let request = HttpRequest::post(url, body.to_string())
            .header("Content-Type", "application/json");
        self.call(request).await
    }

    async fn call<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.http.execute(request).await?;
        let envelope = parse_json(&response)?;
        if envelope["status"] != "ok" {
            let code = envelope["err-code"].as_str().unwrap_or("unknown").to_string();
            let message = envelope["err-msg"].as_str().unwrap_or_default().to_string();
            debug!(exchange = EXCHANGE, code = %code, "Request rejected");
            return Err(rejection(EXCHANGE, AUTH_ERROR_CODES, code, message));
        }
        from_value("huobi data", envelope["data"].clone())
    }
}

#[async_trait]
impl ExchangeGateway for HuobiGateway {
    fn exchange(&self) -> Exchange {
        Exchange::Huobi
    }

    async fn balances(&self) -> Result<Vec<Balance>> {
        let account_id = self.account_id().await?;
        let sheet: HuobiBalanceSheet = self
            .get(&format!("/v1/account/accounts/{account_id}/balance"), Vec::new())
            .await?;
        let entries = sheet
            .list
            .iter()
            .map(|entry| entry.to_balance())
            .collect::<Result<Vec<_>>>()?;
        Ok(merge_balances(entries))
    }

    async fn place_order(&self, placement: &OrderPlacement) -> Result<OrderId> {
        placement.validate()?;
        let kind = ORDER_TYPES.try_encode((placement.side, placement.kind))?;
        let account_id = self.account_id().await?;
        let body = HuobiPlaceOrder {
            account_id,
            amount: placement.amount_text(),
            price: placement.price_text(),
            source: ORDER_SOURCE,
            symbol: placement.pair.joined_lower(),
            kind,
        };
        let body = serde_json::to_value(&body).map_err(|e| Error::decode("huobi order", e))?;
        let data: Value = self.post("/v1/order/orders/place", &body).await?;
        let id = to_placement_result("huobi order id", &data)?;
        info!(exchange = EXCHANGE, order_id = %id, symbol = %placement.pair, "Order placed");
        Ok(id)
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        if order_id.is_empty() {
            return Err(ValidationError::EmptyOrderId.into());
        }
        let _: Value = self
            .post(
                &format!("/v1/order/orders/{}/submitcancel", escape(order_id.as_str())),
                &Value::Object(Default::default()),
            )
            .await?;
        info!(exchange = EXCHANGE, order_id = %order_id, "Cancel accepted");
        Ok(())
    }

    async fn order(&self, order_id: &OrderId) -> Result<Order> {
        if order_id.is_empty() {
            return Err(ValidationError::EmptyOrderId.into());
        }
        let order: HuobiOrder = self
            .get(
                &format!("/v1/order/orders/{}", escape(order_id.as_str())),
                Vec::new(),
            )
            .await?;
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
            params.push(("size".to_string(), limit.to_string()));
        }
        let orders: Vec<HuobiOrder> = self.get("/v1/order/orders", params).await?;
        orders.iter().map(HuobiOrder::to_order).collect()
    }

    fn feed(&self) -> &MarketFeed {
        &self.feed
    }
}
