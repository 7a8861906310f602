/*
[INPUT]:  Caller options (credentials, base URL override, health check), YAML files, env vars
[OUTPUT]: Validated credential selection and per-client connection configuration
[POS]:    Configuration layer - shared by REST and WebSocket clients
[UPDATE]: When adding options or changing URL composition
*/

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{API_KEY_HEADER, API_VERSION, SDK_TOKEN_HEADER};
use crate::error::{FugleError, Result};

pub const ENV_API_KEY: &str = "FUGLE_API_KEY";
pub const ENV_BEARER_TOKEN: &str = "FUGLE_BEARER_TOKEN";
pub const ENV_SDK_TOKEN: &str = "FUGLE_SDK_TOKEN";
pub const ENV_BASE_URL: &str = "FUGLE_BASE_URL";

const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Product family served by the vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    Stock,
    FutOpt,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Stock => "stock",
            Market::FutOpt => "futopt",
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Market {
    type Err = FugleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stock" => Ok(Market::Stock),
            "futopt" => Ok(Market::FutOpt),
            other => Err(FugleError::Config(format!("unknown market: {other}"))),
        }
    }
}

/// The single credential used for a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    ApiKey(String),
    BearerToken(String),
    SdkToken(String),
}

impl Credential {
    /// `data` object of the WebSocket `auth` frame
    pub fn auth_payload(&self) -> serde_json::Value {
        match self {
            Credential::ApiKey(key) => serde_json::json!({ "apikey": key }),
            Credential::BearerToken(token) => serde_json::json!({ "token": token }),
            Credential::SdkToken(token) => serde_json::json!({ "sdkToken": token }),
        }
    }

    /// Header name and value attached to REST requests
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Credential::ApiKey(key) => (API_KEY_HEADER, key.clone()),
            Credential::BearerToken(token) => ("Authorization", format!("Bearer {token}")),
            Credential::SdkToken(token) => (SDK_TOKEN_HEADER, token.clone()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api_key",
            Credential::BearerToken(_) => "bearer_token",
            Credential::SdkToken(_) => "sdk_token",
        }
    }
}

/// Heartbeat settings for streaming clients
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthCheckConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Delay between pings in milliseconds
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    /// Consecutive unanswered pings tolerated before disconnecting
    #[serde(default = "default_max_missed_pongs")]
    pub max_missed_pongs: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ping_interval: default_ping_interval(),
            max_missed_pongs: default_max_missed_pongs(),
        }
    }
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval)
    }
}

fn default_ping_interval() -> u64 {
    30_000
}

fn default_max_missed_pongs() -> u32 {
    2
}

/// Options shared by the REST and WebSocket factories
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_token: Option<String>,
    /// Replaces vendor host and API version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub health_check: HealthCheckConfig,
}

impl ClientOptions {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn with_bearer_token(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn with_sdk_token(token: impl Into<String>) -> Self {
        Self {
            sdk_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn health_check(mut self, health_check: HealthCheckConfig) -> Self {
        self.health_check = health_check;
        self
    }

    /// Load options from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|err| FugleError::Config(format!("read {}: {err}", path.display())))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|err| FugleError::Config(err.to_string()))
    }

    /// Read credentials and base URL from `FUGLE_*` environment variables
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|value| !value.is_empty());
        Self {
            api_key: read(ENV_API_KEY),
            bearer_token: read(ENV_BEARER_TOKEN),
            sdk_token: read(ENV_SDK_TOKEN),
            base_url: read(ENV_BASE_URL),
            health_check: HealthCheckConfig::default(),
        }
    }

    /// Fill unset fields from `other`. Credentials move as one group:
    /// `other`'s are taken only when `self` carries none.
    pub fn merge(mut self, other: ClientOptions) -> Self {
        if !self.has_credential() {
            self.api_key = other.api_key;
            self.bearer_token = other.bearer_token;
            self.sdk_token = other.sdk_token;
        }
        self.base_url = self.base_url.or(other.base_url);
        self
    }

    fn has_credential(&self) -> bool {
        [&self.api_key, &self.bearer_token, &self.sdk_token]
            .into_iter()
            .any(|value| value.as_deref().is_some_and(|v| !v.is_empty()))
    }

    /// Resolve the exactly-one-credential rule. Empty strings count as unset.
    pub fn credential(&self) -> Result<Credential> {
        let present = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_string);
        let mut found: Vec<Credential> = [
            present(&self.api_key).map(Credential::ApiKey),
            present(&self.bearer_token).map(Credential::BearerToken),
            present(&self.sdk_token).map(Credential::SdkToken),
        ]
        .into_iter()
        .flatten()
        .collect();

        match found.len() {
            0 => Err(FugleError::Config(
                r#"One of the "apiKey", "bearerToken", or "sdkToken" options must be specified"#
                    .to_string(),
            )),
            1 => Ok(found.remove(0)),
            _ => Err(FugleError::Config(
                r#"Only one of the "apiKey", "bearerToken", or "sdkToken" options must be specified"#
                    .to_string(),
            )),
        }
    }

    /// Base URL for a market: override (trailing slash trimmed) or vendor default
    pub fn market_url(&self, default_base: &str, market: Market) -> String {
        match self.base_url.as_deref().filter(|url| !url.is_empty()) {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), market),
            None => format!("{default_base}/{API_VERSION}/{market}"),
        }
    }
}

/// Immutable configuration of one streaming client
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub url: String,
    pub credential: Option<Credential>,
    pub health_check: HealthCheckConfig,
    /// Bound on the wait for the server's auth verdict
    pub auth_timeout: Duration,
    /// Bound on opening the transport
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>, credential: Credential) -> Self {
        Self {
            url: url.into(),
            credential: Some(credential),
            health_check: HealthCheckConfig::default(),
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Configuration with no credential; `connect` fails before any I/O
    pub fn without_credential(url: impl Into<String>) -> Self {
        Self {
            credential: None,
            ..Self::new(url, Credential::ApiKey(String::new()))
        }
    }

    pub fn with_health_check(mut self, health_check: HealthCheckConfig) -> Self {
        self.health_check = health_check;
        self
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
