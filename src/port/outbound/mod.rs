//! Outbound ports (driven side).

pub mod clock;
pub mod exchange;
pub mod transport;
