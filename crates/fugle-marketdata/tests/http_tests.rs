/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for REST factory and clients
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use std::sync::Arc;

use common::setup_mock_server;
use fugle_marketdata::error::UNEXPECTED_DATA_MESSAGE;
use fugle_marketdata::{ClientConfig, ClientOptions, FugleError, RestClientFactory};
use tokio_test::assert_ok;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_factory_creation() {
    let _factory = assert_ok!(RestClientFactory::new(ClientOptions::with_api_key("api-key")));
    let _factory = assert_ok!(RestClientFactory::new(ClientOptions::with_bearer_token("bearer-token")));
}

#[test]
fn test_factory_requires_exactly_one_credential() {
    assert!(matches!(
        RestClientFactory::new(ClientOptions::default()),
        Err(FugleError::Config(_))
    ));

    let options = ClientOptions {
        api_key: Some("api-key".into()),
        sdk_token: Some("sdk-token".into()),
        ..ClientOptions::default()
    };
    assert!(matches!(RestClientFactory::new(options), Err(FugleError::Config(_))));
}

#[test]
fn test_factory_with_config() {
    let factory = assert_ok!(RestClientFactory::with_http_config(
        ClientOptions::with_sdk_token("sdk-token"),
        ClientConfig::default(),
    ));
    let first = assert_ok!(factory.futopt());
    let second = assert_ok!(factory.futopt());
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_stock_intraday_tickers_via_factory() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/stock/intraday/tickers"))
        .and(header("X-API-KEY", "api-key"))
        .and(query_param("type", "EQUITY"))
        .and(query_param("exchange", "TWSE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "date": "2023-05-29",
            "type": "EQUITY",
            "exchange": "TWSE",
            "data": [{ "symbol": "2330", "name": "台積電" }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = ClientOptions::with_api_key("api-key").base_url(format!("{}/v1.0/", server.uri()));
    let factory = assert_ok!(RestClientFactory::new(options));
    let stock = assert_ok!(factory.stock());

    let body = assert_ok!(
        stock
            .intraday()
            .tickers(&[("type", "EQUITY"), ("exchange", "TWSE")])
            .await
    );
    assert_eq!(body["data"][0]["symbol"], "2330");
}

#[tokio::test]
async fn test_futopt_quote_with_bearer_token() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/futopt/intraday/quote/TXFA4"))
        .and(header("Authorization", "Bearer bearer-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "symbol": "TXFA4",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = ClientOptions::with_bearer_token("bearer-token").base_url(format!("{}/v1.0", server.uri()));
    let factory = assert_ok!(RestClientFactory::new(options));
    let futopt = assert_ok!(factory.futopt());

    let quote = assert_ok!(futopt.intraday().quote("TXFA4", &[]).await);
    assert_eq!(quote["symbol"], "TXFA4");
}

#[tokio::test]
async fn test_invalid_json_surfaces_unexpected_data() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/stock/intraday/quote/2330"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": {"price": 150.0, "volume":"#))
        .mount(&server)
        .await;

    let options = ClientOptions::with_api_key("api-key").base_url(format!("{}/v1.0", server.uri()));
    let factory = assert_ok!(RestClientFactory::new(options));
    let stock = assert_ok!(factory.stock());

    let err = stock.intraday().quote("2330", &[]).await.unwrap_err();
    assert!(err.to_string().contains(UNEXPECTED_DATA_MESSAGE));
}
