//! Infrastructure layer.
//!
//! - [`config`] - Configuration loading and validation
//! - [`factory`] - Gateway construction from configuration

pub mod config;
pub mod factory;

pub use factory::{build_default_gateway, build_gateway};
