//! Huobi spot integration: sorted-query HMAC-SHA256 signing, `status`/`data`
//! envelopes and gzip-compressed market streams.

pub mod dto;
pub mod feed;
pub mod gateway;
pub mod settings;
pub mod vocabulary;

pub use feed::HuobiFeedProtocol;
pub use gateway::HuobiGateway;
pub use settings::HuobiSettings;

pub(crate) const EXCHANGE: &str = "huobi";
