//! Shared building blocks for turning exchange responses into the canonical
//! model.
//!
//! Per-exchange mapping tables live beside each adapter; this module holds
//! the lookup-table type they are built from and the numeric/time parsing
//! every adapter needs.

mod numeric;
mod vocabulary;

pub use numeric::{
    decimal_from_json, millis_to_datetime, optional_decimal, required_decimal, seconds_to_datetime,
};
pub use vocabulary::VocabularyTable;
