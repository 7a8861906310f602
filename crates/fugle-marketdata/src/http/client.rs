/*
[INPUT]:  Market base URL, credential, HTTP timeouts
[OUTPUT]: Authenticated GET requests decoded as JSON
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing request/response handling
*/

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::Credential;
use crate::error::{FugleError, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// REST client bound to one market's base URL
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: Client,
    base_url: String,
    credential: Credential,
}

impl RestClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>, credential: Credential) -> Result<Self> {
        Self::with_config(base_url, credential, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(
        base_url: impl Into<String>,
        credential: Credential,
        config: ClientConfig,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        let base_url = base_url.into();
        Url::parse(&base_url)?;

        Ok(Self {
            http_client,
            base_url,
            credential,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Build full URL for an endpoint path and query parameters
    pub fn endpoint_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = if path.starts_with('/') {
            Url::parse(&format!("{}{}", self.base_url, path))?
        } else {
            Url::parse(&format!("{}/{}", self.base_url, path))?
        };
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// GET `path` and decode the body as JSON
    pub async fn request(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.endpoint_url(path, params)?;
        let (header, value) = self.credential.header();

        debug!(url = %url, "rest request");
        let response = self
            .http_client
            .get(url.clone())
            .header(header, value)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let json: Value = match serde_json::from_str(&body) {
            Ok(json) => json,
            Err(_) => return Err(FugleError::unexpected_data(url.as_str(), status.as_u16(), body)),
        };

        if !status.is_success() {
            let message = json
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| status.canonical_reason())
                .unwrap_or("request failed")
                .to_string();
            return Err(FugleError::Api {
                message,
                url: url.as_str().to_string(),
                status: Some(status.as_u16()),
                params: (!params.is_empty()).then(|| format_params(params)),
                body: Some(body),
            });
        }

        Ok(json)
    }
}

fn format_params(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UNEXPECTED_DATA_MESSAGE;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, credential: Credential) -> RestClient {
        RestClient::new(format!("{}/v1.0/stock", server.uri()), credential).expect("client init")
    }

    #[tokio::test]
    async fn test_request_attaches_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/stock/test"))
            .and(header("X-API-KEY", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": [1, 2, 3],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::ApiKey("test-api-key".into()));
        let body = client.request("/test", &[]).await.expect("request");
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_request_bearer_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/stock/intraday/tickers"))
            .and(header("Authorization", "Bearer test-bearer-token"))
            .and(query_param("type", "EQUITY"))
            .and(query_param("exchange", "TWSE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::BearerToken("test-bearer-token".into()));
        let body = client
            .request("intraday/tickers", &[("type", "EQUITY"), ("exchange", "TWSE")])
            .await
            .expect("request");
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_non_json_body_is_unexpected_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/stock/test"))
            .respond_with(ResponseTemplate::new(500).set_body_string(
                "<!DOCTYPE html><html><body><h1>Internal Server Error</h1></body></html>",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::ApiKey("k".into()));
        let err = client.request("/test", &[]).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains(UNEXPECTED_DATA_MESSAGE));
        assert!(text.contains("Status: 500"));
    }

    #[tokio::test]
    async fn test_error_status_with_json_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/stock/intraday/quote/9999"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "statusCode": 404,
                "message": "Resource Not Found",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Credential::SdkToken("sdk".into()));
        match client.request("intraday/quote/9999", &[]).await {
            Err(FugleError::Api { message, status, .. }) => {
                assert_eq!(message, "Resource Not Found");
                assert_eq!(status, Some(404));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_url_adds_leading_slash() {
        let client = RestClient::new(
            "https://api.fugle.tw/marketdata/v1.0/stock",
            Credential::ApiKey("k".into()),
        )
        .unwrap();
        assert_eq!(
            client.endpoint_url("intraday/ticker/2330", &[]).unwrap().as_str(),
            "https://api.fugle.tw/marketdata/v1.0/stock/intraday/ticker/2330"
        );
        assert_eq!(
            client.endpoint_url("/historical/candles/2330", &[("from", "2023-01-01")]).unwrap().as_str(),
            "https://api.fugle.tw/marketdata/v1.0/stock/historical/candles/2330?from=2023-01-01"
        );
    }
}
