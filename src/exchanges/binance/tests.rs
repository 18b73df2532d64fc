//! Tests for the Binance futures gateway against a mock HTTP server.

use super::*;
use crate::config::{ExchangeConfig, ExchangeCredentials};
use crate::domain::{
    ClientOrderId, ConditionalOrder, OrderSide, OrderStatus, OrderType, TimeInForce,
};
use crate::exchanges::{Exchange, ExchangeError};
use mockito::Matcher;
use rust_decimal_macros::dec;

fn gateway(server: &mockito::ServerGuard) -> BinanceFutures {
    let config = ClientConfig::new("test-key".into(), "test-secret".into()).with_base_url(server.url());
    BinanceFutures::new(Client::new(config).unwrap())
}

fn stop_order() -> ConditionalOrder {
    ConditionalOrder {
        symbol: "BTC/USDT".into(),
        side: OrderSide::Sell,
        order_type: OrderType::StopMarket,
        stop_price: dec!(49000.00),
        close_position: true,
        time_in_force: TimeInForce::GoodTillCancel,
        client_order_id: ClientOrderId::new("x-40PTWbMIAB12CD3".into()),
    }
}

// ==================== Signing tests ====================

#[test]
fn test_sign_matches_documented_vector() {
    let config = ClientConfig::new(
        "key".into(),
        "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j".into(),
    );
    let client = Client::new(config).unwrap();

    let signature = client
        .sign("symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559")
        .unwrap();

    assert_eq!(
        signature,
        "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
    );
}

#[test]
fn test_client_from_config_selects_testnet() {
    let config = ExchangeConfig::default();
    let credentials = ExchangeCredentials {
        api_key: "k".into(),
        api_secret: "s".into(),
        testnet: true,
    };

    let client = Client::from_config(&config, &credentials).unwrap();
    assert_eq!(client.base_url(), TESTNET_HTTP_API_URL);

    let live = ExchangeCredentials {
        testnet: false,
        ..credentials
    };
    let client = Client::from_config(&config, &live).unwrap();
    assert_eq!(client.base_url(), BASE_HTTP_API_URL);
}

// ==================== Market data tests ====================

#[tokio::test]
async fn test_ticker_price() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/fapi/v1/ticker/price")
        .match_query(Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"symbol":"BTCUSDT","price":"50000.10","time":1700000000000}"#)
        .create_async()
        .await;

    let price = gateway(&server).ticker_price("BTC/USDT").await.unwrap();

    assert_eq!(price, dec!(50000.10));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_market_reads_price_filter() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/exchangeInfo")
        .with_status(200)
        .with_body(
            r#"{"symbols":[
                {"symbol":"ETHUSDT","pricePrecision":2,"filters":[]},
                {"symbol":"BTCUSDT","pricePrecision":2,"filters":[
                    {"filterType":"LOT_SIZE","stepSize":"0.001"},
                    {"filterType":"PRICE_FILTER","tickSize":"0.10","minPrice":"556.80"}
                ]}
            ]}"#,
        )
        .create_async()
        .await;

    let market = gateway(&server).market("BTC/USDT:USDT").await.unwrap();

    assert_eq!(market.symbol, "BTCUSDT");
    assert_eq!(market.tick_size, Some(dec!(0.10)));
    assert_eq!(market.price_precision, Some(2));
}

#[tokio::test]
async fn test_market_unknown_symbol() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/exchangeInfo")
        .with_status(200)
        .with_body(r#"{"symbols":[]}"#)
        .create_async()
        .await;

    let err = gateway(&server).market("DOGE/USDT").await.unwrap_err();
    assert!(matches!(err, ExchangeError::SymbolNotSupported(s) if s == "DOGEUSDT"));
}

// ==================== Signed request tests ====================

#[tokio::test]
async fn test_set_leverage_is_signed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/fapi/v1/leverage")
        .match_header("X-MBX-APIKEY", "test-key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
            Matcher::UrlEncoded("leverage".into(), "10".into()),
            Matcher::UrlEncoded("recvWindow".into(), "5000".into()),
            Matcher::Regex("signature=[0-9a-f]{64}".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"leverage":10,"maxNotionalValue":"1000000","symbol":"BTCUSDT"}"#)
        .create_async()
        .await;

    let applied = gateway(&server).set_leverage("BTC/USDT", 10).await.unwrap();

    assert_eq!(applied, 10);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_place_order_sends_close_position_params() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/fapi/v1/order")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
            Matcher::UrlEncoded("side".into(), "SELL".into()),
            Matcher::UrlEncoded("type".into(), "STOP_MARKET".into()),
            Matcher::UrlEncoded("stopPrice".into(), "49000.00".into()),
            Matcher::UrlEncoded("closePosition".into(), "true".into()),
            Matcher::UrlEncoded("timeInForce".into(), "GTC".into()),
            Matcher::UrlEncoded("newClientOrderId".into(), "x-40PTWbMIAB12CD3".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"orderId":283194212,"clientOrderId":"x-40PTWbMIAB12CD3","status":"NEW","type":"STOP_MARKET"}"#)
        .create_async()
        .await;

    let placed = gateway(&server).place_order(&stop_order()).await.unwrap();

    assert_eq!(placed.order_id, "283194212");
    assert_eq!(placed.client_order_id, "x-40PTWbMIAB12CD3");
    assert_eq!(placed.status, OrderStatus::New);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_place_order_insufficient_margin() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/fapi/v1/order")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":-2019,"msg":"Margin is insufficient."}"#)
        .create_async()
        .await;

    let err = gateway(&server).place_order(&stop_order()).await.unwrap_err();
    assert!(matches!(err, ExchangeError::InsufficientMargin(m) if m == "Margin is insufficient."));
}

#[tokio::test]
async fn test_rejected_api_key_maps_to_auth() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/fapi/v1/leverage")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"code":-2015,"msg":"Invalid API-key, IP, or permissions for action."}"#)
        .create_async()
        .await;

    let err = gateway(&server).set_leverage("BTCUSDT", 5).await.unwrap_err();
    assert!(matches!(err, ExchangeError::Auth(_)));
}

#[tokio::test]
async fn test_rate_limit_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/ticker/price")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body("Too many requests")
        .create_async()
        .await;

    let err = gateway(&server).ticker_price("BTCUSDT").await.unwrap_err();
    assert!(matches!(err, ExchangeError::RateLimited(_)));
}

#[tokio::test]
async fn test_order_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/order")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
            Matcher::UrlEncoded("orderId".into(), "42".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"orderId":42,"clientOrderId":"abc","status":"FILLED"}"#)
        .create_async()
        .await;

    let status = gateway(&server).order_status("BTC/USDT", "42").await.unwrap();
    assert_eq!(status, OrderStatus::Filled);
}

#[tokio::test]
async fn test_order_status_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/order")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":-2013,"msg":"Order does not exist."}"#)
        .create_async()
        .await;

    let err = gateway(&server).order_status("BTCUSDT", "7").await.unwrap_err();
    assert!(matches!(err, ExchangeError::OrderNotFound(id) if id == "7"));
}
