//! Huobi endpoint settings.

use serde::Deserialize;

pub const DEFAULT_REST_URL: &str = "https://api.huobi.pro";
pub const DEFAULT_WS_URL: &str = "wss://api.huobi.pro/ws";

#[derive(Debug, Clone, Deserialize)]
pub struct HuobiSettings {
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Spot account id. Discovered with `/v1/account/accounts` when absent.
    #[serde(default)]
    pub account_id: Option<String>,
}

fn default_rest_url() -> String {
    DEFAULT_REST_URL.into()
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.into()
}

impl Default for HuobiSettings {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            ws_url: default_ws_url(),
            account_id: None,
        }
    }
}
