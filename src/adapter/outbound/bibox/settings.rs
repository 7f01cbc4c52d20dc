use serde::Deserialize;

use crate::port::Exchange;

pub const BIBOX_REST_URL: &str = "https://api.bibox.com/v1/";
pub const BIBOX_WS_URL: &str = "wss://push.bibox.com/";
pub const COINPARK_REST_URL: &str = "https://api.coinpark.cc/v1/";
pub const COINPARK_WS_URL: &str = "wss://push.coinpark.cc/";

/// Endpoints for one Bibox-family venue.
#[derive(Debug, Clone, Deserialize)]
pub struct BiboxSettings {
    pub rest_url: String,
    pub ws_url: String,
}

impl BiboxSettings {
    /// Default endpoints for `exchange`; `None` outside the Bibox family.
    #[must_use]
    pub fn for_exchange(exchange: Exchange) -> Option<Self> {
        let (rest_url, ws_url) = match exchange {
            Exchange::Bibox => (BIBOX_REST_URL, BIBOX_WS_URL),
            Exchange::Coinpark => (COINPARK_REST_URL, COINPARK_WS_URL),
            Exchange::Huobi | Exchange::Fcoin => return None,
        };
        Some(Self {
            rest_url: rest_url.into(),
            ws_url: ws_url.into(),
        })
    }
}

impl Default for BiboxSettings {
    fn default() -> Self {
        Self {
            rest_url: BIBOX_REST_URL.into(),
            ws_url: BIBOX_WS_URL.into(),
        }
    }
}
