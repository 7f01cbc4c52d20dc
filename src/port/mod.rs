//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`ExchangeGateway`] - Canonical trading and market-data interface
//! - [`HttpTransport`], [`StreamConnector`], [`DuplexStream`] - Transport capabilities
//! - [`Clock`] - Timestamp source for request signing

pub mod outbound;

pub use outbound::clock::{Clock, SystemClock};
pub use outbound::exchange::{Exchange, ExchangeGateway};
pub use outbound::transport::{
    DuplexStream, Frame, HttpRequest, HttpResponse, HttpTransport, StreamConnector,
};
