//! Bibox-family integration, shared by Bibox and CoinPark.
//!
//! Private calls are batched `cmds` JSON posted with an HMAC-MD5 over the
//! exact `cmds` text. Market streams deliver base64-encoded gzip payloads.

pub mod dto;
pub mod feed;
pub mod gateway;
pub mod settings;
pub mod vocabulary;

pub use feed::BiboxFeedProtocol;
pub use gateway::BiboxGateway;
pub use settings::BiboxSettings;

pub(crate) const EXCHANGE: &str = "bibox";
