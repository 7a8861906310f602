/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: JSON responses from the market data REST API
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod futopt;
pub mod stock;

pub use client::{ClientConfig, RestClient};
pub use futopt::RestFutOptClient;
pub use stock::RestStockClient;
