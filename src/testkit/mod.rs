//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`] - `ScriptedTransport`: canned HTTP responses, recorded requests.
//! - [`stream`] - `ScriptedConnector` and `RemoteEnd`: channel-backed duplex
//!   streams driven from the test.
//! - [`clock`] - `FixedClock` for deterministic signatures.

pub mod clock;
pub mod stream;
pub mod transport;

pub use clock::FixedClock;
pub use stream::{RemoteEnd, ScriptedConnector};
pub use transport::ScriptedTransport;
