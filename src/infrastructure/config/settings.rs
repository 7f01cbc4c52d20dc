//! Application configuration loading and validation.
//!
//! Configuration is a TOML file with environment overrides for the API
//! credentials (`COINBRIDGE_ACCESS_KEY`, `COINBRIDGE_SECRET_KEY`).
//!
//! ```toml
//! [exchange]
//! kind = "huobi"
//! access_key = "..."
//! account_id = "100009"
//!
//! [endpoints]
//! rest_url = "https://api.huobi.pro"
//!
//! [http]
//! timeout_ms = 10000
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use coinbridge::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use crate::adapter::outbound::{BiboxSettings, FcoinSettings, HttpSettings, HuobiSettings};
use crate::error::{ConfigError, Result};
use crate::port::Exchange;
use crate::signing::Credentials;

pub const ACCESS_KEY_ENV: &str = "COINBRIDGE_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "COINBRIDGE_SECRET_KEY";

/// Which exchange to talk to and with which account.
#[derive(Clone, Deserialize)]
pub struct ExchangeConfig {
    pub kind: Exchange,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    /// Huobi spot account id. Discovered on first use when absent.
    #[serde(default)]
    pub account_id: Option<String>,
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("kind", &self.kind)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Endpoint overrides. Unset fields use the exchange's public endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointsConfig {
    pub rest_url: Option<String>,
    pub ws_url: Option<String>,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub exchange: ExchangeConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// HTTP client timeouts and user agent.
    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content, then apply credential
    /// overrides from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(key) = env_value(ACCESS_KEY_ENV) {
            config.exchange.access_key = key;
        }
        if let Some(secret) = env_value(SECRET_KEY_ENV) {
            config.exchange.secret_key = secret;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.exchange.access_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "exchange.access_key",
            }
            .into());
        }
        if self.exchange.secret_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "exchange.secret_key",
            }
            .into());
        }
        if let Some(url) = &self.endpoints.rest_url {
            validate_url("endpoints.rest_url", url, &["http", "https"])?;
        }
        if let Some(url) = &self.endpoints.ws_url {
            validate_url("endpoints.ws_url", url, &["ws", "wss"])?;
        }
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.http.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.connect_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected 'json' or 'pretty', got '{}'", self.logging.format),
            }
            .into());
        }
        Ok(())
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.exchange.access_key, &self.exchange.secret_key)
    }

    #[must_use]
    pub fn huobi_settings(&self) -> HuobiSettings {
        let mut settings = HuobiSettings::default();
        self.override_endpoints(&mut settings.rest_url, &mut settings.ws_url);
        settings.account_id = self.exchange.account_id.clone();
        settings
    }

    #[must_use]
    pub fn fcoin_settings(&self) -> FcoinSettings {
        let mut settings = FcoinSettings::default();
        self.override_endpoints(&mut settings.rest_url, &mut settings.ws_url);
        settings
    }

    /// Settings for the configured Bibox-family venue; `None` for any other
    /// exchange.
    #[must_use]
    pub fn bibox_settings(&self) -> Option<BiboxSettings> {
        let mut settings = BiboxSettings::for_exchange(self.exchange.kind)?;
        self.override_endpoints(&mut settings.rest_url, &mut settings.ws_url);
        Some(settings)
    }

    fn override_endpoints(&self, rest_url: &mut String, ws_url: &mut String) {
        if let Some(url) = &self.endpoints.rest_url {
            rest_url.clone_from(url);
        }
        if let Some(url) = &self.endpoints.ws_url {
            ws_url.clone_from(url);
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn validate_url(field: &'static str, raw: &str, schemes: &[&str]) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }
        .into());
    }
    Ok(())
}
