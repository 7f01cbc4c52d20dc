//! CLI module graph.

pub mod account;
pub mod command;
pub mod dispatch;
pub mod output;
pub mod watch;
