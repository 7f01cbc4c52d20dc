//! Request/response behaviour of each gateway against canned responses.

mod support;

use std::sync::Arc;

use serde_json::Value;

use coinbridge::adapter::outbound::{HuobiGateway, HuobiSettings};
use coinbridge::codec::{canonicalize, parse_query_string, to_query_string};
use coinbridge::domain::{OrderFilter, OrderId, OrderPlacement, OrderSide, OrderState, Pair};
use coinbridge::error::Error;
use coinbridge::port::{Exchange, ExchangeGateway};
use coinbridge::signing::{sign, Credentials, HttpMethod, Secret, SignatureScheme, SigningContext};
use coinbridge::testkit::{FixedClock, ScriptedConnector, ScriptedTransport};
use rust_decimal_macros::dec;

use support::gateway::scripted_gateway;

const FIXED_MS: i64 = 1_523_069_544_000;

fn huobi(transport: &ScriptedTransport) -> HuobiGateway {
    let settings = HuobiSettings {
        account_id: Some("100009".into()),
        ..HuobiSettings::default()
    };
    HuobiGateway::new(
        settings,
        Credentials::new("access", "secret"),
        Arc::new(transport.clone()),
        Arc::new(ScriptedConnector::new()),
    )
    .unwrap()
    .with_clock(Arc::new(FixedClock::at_millis(FIXED_MS)))
}

fn limit_buy() -> OrderPlacement {
    OrderPlacement::limit(Pair::new("BTC", "USDT"), OrderSide::Buy, dec!(100.0), dec!(1.5))
}

#[tokio::test]
async fn limit_buy_is_signed_deterministically() {
    let first = ScriptedTransport::new().with_ok(r#"{"status":"ok","data":"12345"}"#);
    let second = ScriptedTransport::new().with_ok(r#"{"status":"ok","data":"12345"}"#);

    let order_id = huobi(&first).place_order(&limit_buy()).await.unwrap();
    huobi(&second).place_order(&limit_buy()).await.unwrap();
    assert_eq!(order_id, OrderId::new("12345"));

    let request = first.last_request();
    assert_eq!(request, second.last_request());
    assert_eq!(request.method, HttpMethod::Post);

    let (path, query) = request.url.split_once('?').unwrap();
    assert_eq!(path, "https://api.huobi.pro/v1/order/orders/place");
    let mut params = parse_query_string(query).unwrap();
    let (name, signature) = params.pop().unwrap();
    assert_eq!(name, "Signature");

    let canonical = to_query_string(&canonicalize(params));
    let secret = Secret::new("secret");
    let expected = sign(
        &SigningContext {
            method: HttpMethod::Post,
            host: "api.huobi.pro",
            path: "/v1/order/orders/place",
            query: &canonical,
            body: "",
            timestamp_ms: FIXED_MS,
            secret: &secret,
        },
        SignatureScheme::SortedQuery,
    )
    .unwrap();
    assert_eq!(signature, expected);

    let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["type"], "buy-limit");
    assert_eq!(body["price"], "100");
    assert_eq!(body["amount"], "1.5");
}

#[tokio::test]
async fn cancel_rejection_carries_exchange_message() {
    let transport = ScriptedTransport::new().with_ok(
        r#"{"status":"error","err-code":"order-orderstate-error","err-msg":"the order state is error"}"#,
    );
    let err = huobi(&transport)
        .cancel_order(&OrderId::new("59378"))
        .await
        .unwrap_err();
    match err {
        Error::Exchange {
            exchange, message, ..
        } => {
            assert_eq!(exchange, "huobi");
            assert_eq!(message, "the order state is error");
        }
        other => panic!("expected exchange error, got {other:?}"),
    }
}

#[tokio::test]
async fn fully_filled_order_normalizes_to_filled() {
    let transport = ScriptedTransport::new().with_ok(
        r#"{"status":"ok","data":{"id":59378,"symbol":"ethusdt","account-id":100009,
            "amount":"10.1000000000","price":"100.1000000000","created-at":1494901162595,
            "type":"buy-limit","field-amount":"10.1000000000","field-cash-amount":"1011.0100000000",
            "field-fees":"0.0202000000","finished-at":1494901400468,"source":"api",
            "state":"filled","canceled-at":0}}"#,
    );
    let order = huobi(&transport).order(&OrderId::new("59378")).await.unwrap();
    assert_eq!(order.state, OrderState::Filled);
    assert_eq!(order.filled_amount, order.amount);
    assert_eq!(order.symbol, "ethusdt");
}

#[tokio::test]
async fn unknown_native_state_is_reported_not_masked() {
    let transport = ScriptedTransport::new().with_ok(
        r#"{"status":"ok","data":{"id":1,"symbol":"ethusdt","amount":"1","price":"1",
            "created-at":1494901162595,"type":"buy-limit","field-amount":"0","state":"weird_state"}}"#,
    );
    let err = huobi(&transport).order(&OrderId::new("1")).await.unwrap_err();
    match err {
        Error::UnknownVocabulary { value, .. } => assert_eq!(value, "weird_state"),
        other => panic!("expected unknown vocabulary, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failures_are_surfaced_unchanged() {
    let transport = ScriptedTransport::new();
    let err = huobi(&transport).balances().await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn fcoin_order_listing_encodes_states() {
    let transport = ScriptedTransport::new().with_ok(r#"{"status":0,"data":[]}"#);
    let connector = Arc::new(ScriptedConnector::new());
    let gateway = scripted_gateway("fcoin", &transport, &connector);
    let filter = OrderFilter::new(Pair::new("BTC", "USDT"))
        .with_states([OrderState::Submitted, OrderState::PartiallyFilled])
        .with_limit(20);
    let orders = gateway.orders(&filter).await.unwrap();
    assert!(orders.is_empty());

    let request = transport.last_request();
    assert!(request.header_value("FC-ACCESS-SIGNATURE").is_some());
    let query = request.url.split_once('?').unwrap().1;
    let params = parse_query_string(query).unwrap();
    assert!(params.contains(&("symbol".to_string(), "btcusdt".to_string())));
    assert!(params.contains(&("states".to_string(), "submitted,partial_filled".to_string())));
}

#[tokio::test]
async fn every_gateway_validates_before_the_network() {
    for exchange in Exchange::ALL {
        let transport = ScriptedTransport::new();
        let connector = Arc::new(ScriptedConnector::new());
        let gateway = scripted_gateway(exchange.name(), &transport, &connector);
        let mut placement = limit_buy();
        placement.amount = dec!(0);
        assert!(matches!(
            gateway.place_order(&placement).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            gateway.cancel_order(&OrderId::new("")).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(transport.request_count(), 0, "{exchange} hit the network");
    }
}

#[tokio::test]
async fn bibox_balances_merge_assets() {
    let transport = ScriptedTransport::new().with_ok(
        r#"{"result":[{"cmd":"transfer/assets","result":{"total_btc":"1","assets_list":[
            {"coin_symbol":"BTC","balance":"0.5","freeze":"0.1"},
            {"coin_symbol":"btc","balance":"0.25","freeze":"0"}]}}]}"#,
    );
    let connector = Arc::new(ScriptedConnector::new());
    let gateway = scripted_gateway("bibox", &transport, &connector);
    let balances = gateway.balances().await.unwrap();
    assert_eq!(balances.len(), 2);
    assert_eq!(balances[0].amount, dec!(0.75));
    assert_eq!(balances[1].amount, dec!(0.1));
}
