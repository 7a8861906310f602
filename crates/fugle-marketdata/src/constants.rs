/*
[INPUT]:  None
[OUTPUT]: Vendor hosts, API version and protocol string constants
[POS]:    Crate root - shared constants
[UPDATE]: When the vendor changes hosts, versions or event names
*/

pub const REST_BASE_URL: &str = "https://api.fugle.tw/marketdata";
pub const WEBSOCKET_BASE_URL: &str = "wss://api.fugle.tw/marketdata";
pub const API_VERSION: &str = "v1.0";

/// `data.message` of an `error` event that rejects the handshake
pub const UNAUTHENTICATED_MESSAGE: &str = "Invalid authentication credentials";

pub const API_KEY_HEADER: &str = "X-API-KEY";
pub const SDK_TOKEN_HEADER: &str = "X-SDK-TOKEN";
