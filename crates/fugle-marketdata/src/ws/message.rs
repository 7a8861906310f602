/*
[INPUT]:  Raw WebSocket text frames and caller-supplied subscription params
[OUTPUT]: Typed inbound frames and serialized outbound envelopes
[POS]:    WebSocket layer - wire format
[UPDATE]: When adding new message types or changing format
*/

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound `{event, data}` envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outbound {
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Outbound {
    pub fn auth(payload: Value) -> Self {
        Self { event: "auth", data: Some(payload) }
    }

    pub fn subscribe(params: Value) -> Self {
        Self { event: "subscribe", data: Some(params) }
    }

    pub fn unsubscribe(params: Value) -> Self {
        Self { event: "unsubscribe", data: Some(params) }
    }

    pub fn ping(state: Value) -> Self {
        Self {
            event: "ping",
            data: Some(serde_json::json!({ "state": state })),
        }
    }

    pub fn subscriptions() -> Self {
        Self { event: "subscriptions", data: None }
    }

    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Inbound frame; only `event` is required
#[derive(Debug, Clone, Deserialize)]
pub struct Inbound {
    pub event: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Events the client reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Authenticated,
    Error,
    Pong,
    Other,
}

impl Inbound {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn kind(&self) -> InboundKind {
        match self.event.as_str() {
            "authenticated" => InboundKind::Authenticated,
            "error" => InboundKind::Error,
            "pong" => InboundKind::Pong,
            _ => InboundKind::Other,
        }
    }

    /// `data.message` of an error frame
    pub fn error_message(&self) -> Option<&str> {
        self.data.as_ref()?.get("message")?.as_str()
    }

    /// Whole frame as JSON, for event payloads
    pub fn to_value(&self) -> Value {
        let mut object = self.extra.clone();
        object.insert("event".to_string(), Value::String(self.event.clone()));
        if let Some(data) = &self.data {
            object.insert("data".to_string(), data.clone());
        }
        Value::Object(object)
    }
}
