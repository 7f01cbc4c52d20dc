//! FCoin integration: base64-then-HMAC-SHA1 signing with `FC-ACCESS-*`
//! headers, numeric `status` envelopes and `type`-keyed stream messages.

pub mod dto;
pub mod feed;
pub mod gateway;
pub mod settings;
pub mod vocabulary;

pub use feed::FcoinFeedProtocol;
pub use gateway::FcoinGateway;
pub use settings::FcoinSettings;

pub(crate) const EXCHANGE: &str = "fcoin";
