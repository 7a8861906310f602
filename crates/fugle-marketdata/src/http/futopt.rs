/*
[INPUT]:  Futures/options symbols and query parameters
[OUTPUT]: Futures and options market data (intraday, historical)
[POS]:    HTTP layer - futopt endpoints
[UPDATE]: When adding new futopt endpoints
*/

use serde_json::Value;

use crate::error::Result;
use crate::http::RestClient;

#[derive(Debug, Clone)]
pub struct RestFutOptClient {
    client: RestClient,
}

impl RestFutOptClient {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub fn intraday(&self) -> Intraday<'_> {
        Intraday { client: &self.client }
    }

    pub fn historical(&self) -> Historical<'_> {
        Historical { client: &self.client }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Intraday<'a> {
    client: &'a RestClient,
}

impl Intraday<'_> {
    /// GET /intraday/contracts
    pub async fn contracts(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request("intraday/contracts", params).await
    }

    /// GET /intraday/products
    pub async fn products(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request("intraday/products", params).await
    }

    /// GET /intraday/ticker/{symbol}
    pub async fn ticker(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("intraday/ticker/{symbol}"), params).await
    }

    /// GET /intraday/quote/{symbol}
    pub async fn quote(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("intraday/quote/{symbol}"), params).await
    }

    /// GET /intraday/candles/{symbol}
    pub async fn candles(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("intraday/candles/{symbol}"), params).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Historical<'a> {
    client: &'a RestClient,
}

impl Historical<'_> {
    /// GET /historical/daily/{symbol}
    pub async fn daily(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("historical/daily/{symbol}"), params).await
    }

    /// GET /historical/candles/{symbol}
    pub async fn candles(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("historical/candles/{symbol}"), params).await
    }
}
