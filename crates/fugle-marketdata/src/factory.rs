/*
[INPUT]:  Client options (one credential, optional base URL and health check)
[OUTPUT]: One cached REST / WebSocket client per market
[POS]:    Crate root - entry points for applications
[UPDATE]: When adding markets or changing URL composition
*/

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::{ClientOptions, ConnectionConfig, Credential, Market};
use crate::constants::{REST_BASE_URL, WEBSOCKET_BASE_URL};
use crate::error::Result;
use crate::http::{ClientConfig, RestClient, RestFutOptClient, RestStockClient};
use crate::ws::WebSocketClient;

/// Builds REST clients for each market, once
#[derive(Debug)]
pub struct RestClientFactory {
    options: ClientOptions,
    credential: Credential,
    http_config: ClientConfig,
    stock: Mutex<Option<Arc<RestStockClient>>>,
    futopt: Mutex<Option<Arc<RestFutOptClient>>>,
}

impl RestClientFactory {
    /// Fails unless exactly one credential is set
    pub fn new(options: ClientOptions) -> Result<Self> {
        Self::with_http_config(options, ClientConfig::default())
    }

    pub fn with_http_config(options: ClientOptions, http_config: ClientConfig) -> Result<Self> {
        let credential = options.credential()?;
        Ok(Self {
            options,
            credential,
            http_config,
            stock: Mutex::new(None),
            futopt: Mutex::new(None),
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn base_url(&self, market: Market) -> String {
        self.options.market_url(REST_BASE_URL, market)
    }

    pub fn stock(&self) -> Result<Arc<RestStockClient>> {
        let mut slot = self.stock.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Arc::new(RestStockClient::new(self.build(Market::Stock)?));
        *slot = Some(client.clone());
        Ok(client)
    }

    pub fn futopt(&self) -> Result<Arc<RestFutOptClient>> {
        let mut slot = self.futopt.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Arc::new(RestFutOptClient::new(self.build(Market::FutOpt)?));
        *slot = Some(client.clone());
        Ok(client)
    }

    fn build(&self, market: Market) -> Result<RestClient> {
        RestClient::with_config(
            self.base_url(market),
            self.credential.clone(),
            self.http_config.clone(),
        )
    }
}

/// Builds streaming clients for each market, once
#[derive(Debug)]
pub struct WebSocketClientFactory {
    options: ClientOptions,
    credential: Credential,
    clients: Mutex<HashMap<Market, Arc<WebSocketClient>>>,
}

impl WebSocketClientFactory {
    /// Fails unless exactly one credential is set
    pub fn new(options: ClientOptions) -> Result<Self> {
        let credential = options.credential()?;
        Ok(Self {
            options,
            credential,
            clients: Mutex::new(HashMap::new()),
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// `{base}/{market}/streaming`
    pub fn url(&self, market: Market) -> String {
        format!("{}/streaming", self.options.market_url(WEBSOCKET_BASE_URL, market))
    }

    pub fn stock(&self) -> Arc<WebSocketClient> {
        self.client(Market::Stock)
    }

    pub fn futopt(&self) -> Arc<WebSocketClient> {
        self.client(Market::FutOpt)
    }

    pub fn client(&self, market: Market) -> Arc<WebSocketClient> {
        let mut clients = self.clients.lock().unwrap_or_else(|p| p.into_inner());
        clients
            .entry(market)
            .or_insert_with(|| {
                let config = ConnectionConfig::new(self.url(market), self.credential.clone())
                    .with_health_check(self.options.health_check.clone());
                Arc::new(WebSocketClient::new(config))
            })
            .clone()
    }
}
