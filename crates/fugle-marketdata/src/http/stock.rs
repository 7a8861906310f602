/*
[INPUT]:  Symbols, market codes and query parameters
[OUTPUT]: Stock market data (intraday, historical, snapshot, technical, corporate actions)
[POS]:    HTTP layer - stock endpoints
[UPDATE]: When adding new stock endpoints
*/

use serde_json::Value;

use crate::error::Result;
use crate::http::RestClient;

/// Stock endpoints grouped by resource
#[derive(Debug, Clone)]
pub struct RestStockClient {
    client: RestClient,
}

impl RestStockClient {
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

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot { client: &self.client }
    }

    pub fn technical(&self) -> Technical<'_> {
        Technical { client: &self.client }
    }

    pub fn corporate_actions(&self) -> CorporateActions<'_> {
        CorporateActions { client: &self.client }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Intraday<'a> {
    client: &'a RestClient,
}

impl Intraday<'_> {
    /// GET /intraday/tickers
    pub async fn tickers(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request("intraday/tickers", params).await
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

    /// GET /intraday/trades/{symbol}
    pub async fn trades(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("intraday/trades/{symbol}"), params).await
    }

    /// GET /intraday/volumes/{symbol}
    pub async fn volumes(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("intraday/volumes/{symbol}"), params).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Historical<'a> {
    client: &'a RestClient,
}

impl Historical<'_> {
    /// GET /historical/candles/{symbol}
    pub async fn candles(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("historical/candles/{symbol}"), params).await
    }

    /// GET /historical/stats/{symbol}
    pub async fn stats(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("historical/stats/{symbol}"), params).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    client: &'a RestClient,
}

impl Snapshot<'_> {
    /// GET /snapshot/quotes/{market}
    pub async fn quotes(&self, market: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("snapshot/quotes/{market}"), params).await
    }

    /// GET /snapshot/movers/{market}
    pub async fn movers(&self, market: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("snapshot/movers/{market}"), params).await
    }

    /// GET /snapshot/actives/{market}
    pub async fn actives(&self, market: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("snapshot/actives/{market}"), params).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Technical<'a> {
    client: &'a RestClient,
}

impl Technical<'_> {
    pub async fn sma(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.indicator("sma", symbol, params).await
    }

    pub async fn rsi(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.indicator("rsi", symbol, params).await
    }

    pub async fn kdj(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.indicator("kdj", symbol, params).await
    }

    pub async fn macd(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.indicator("macd", symbol, params).await
    }

    /// Bollinger bands
    pub async fn bb(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.indicator("bb", symbol, params).await
    }

    async fn indicator(&self, name: &str, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request(&format!("technical/{name}/{symbol}"), params).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CorporateActions<'a> {
    client: &'a RestClient,
}

impl CorporateActions<'_> {
    pub async fn capital_changes(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request("corporate-actions/capital-changes", params).await
    }

    pub async fn dividends(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request("corporate-actions/dividends", params).await
    }

    pub async fn listing_applicants(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client.request("corporate-actions/listing-applicants", params).await
    }
}
