use serde::Deserialize;

/// Signed payloads embed this base verbatim, trailing slash included.
pub const DEFAULT_REST_URL: &str = "https://api.fcoin.com/v2/";
pub const DEFAULT_WS_URL: &str = "wss://api.fcoin.com/v2/ws";

#[derive(Debug, Clone, Deserialize)]
pub struct FcoinSettings {
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

fn default_rest_url() -> String {
    DEFAULT_REST_URL.into()
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.into()
}

impl Default for FcoinSettings {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            ws_url: default_ws_url(),
        }
    }
}
