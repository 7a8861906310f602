/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Fugle market data crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod config;
pub mod constants;
pub mod error;
pub mod factory;
pub mod http;
pub mod ws;

pub use config::{ClientOptions, ConnectionConfig, Credential, HealthCheckConfig, Market};
pub use error::{AuthError, FugleError, Result};

// Re-export commonly used types from factory
pub use factory::{RestClientFactory, WebSocketClientFactory};

// Re-export commonly used types from http
pub use http::{ClientConfig, RestClient, RestFutOptClient, RestStockClient};

// Re-export commonly used types from ws
pub use ws::{AuthState, Event, EventKind, ListenerId, WebSocketClient};
