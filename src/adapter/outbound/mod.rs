//! Outbound adapters (driven side): exchange gateways and the transports
//! they run over.

pub mod bibox;
pub mod fcoin;
pub mod http;
pub mod huobi;
pub(crate) mod rest;
pub mod websocket;

pub use bibox::{BiboxFeedProtocol, BiboxGateway, BiboxSettings};
pub use fcoin::{FcoinFeedProtocol, FcoinGateway, FcoinSettings};
pub use http::{HttpSettings, ReqwestTransport};
pub use huobi::{HuobiFeedProtocol, HuobiGateway, HuobiSettings};
pub use websocket::TungsteniteConnector;
