/*
[INPUT]:  Connection configuration and caller subscriptions
[OUTPUT]: Authenticated real-time market data via event listeners
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new events or changing connection logic
*/

pub mod auth;
pub mod client;
pub mod event;
mod health;
pub mod message;
mod transport;

pub use auth::AuthState;
pub use client::WebSocketClient;
pub use event::{Event, EventHub, EventKind, ListenerId};
pub use message::{Inbound, Outbound};
