//! FCoin wire literals.

use crate::domain::{OrderKind, OrderSide, OrderState};
use crate::normalize::VocabularyTable;

use super::EXCHANGE;

pub static ORDER_SIDES: VocabularyTable<OrderSide, &str> = VocabularyTable::new(
    EXCHANGE,
    "order side",
    &[(OrderSide::Buy, "buy"), (OrderSide::Sell, "sell")],
);

pub static ORDER_KINDS: VocabularyTable<OrderKind, &str> = VocabularyTable::new(
    EXCHANGE,
    "order type",
    &[(OrderKind::Limit, "limit"), (OrderKind::Market, "market")],
);

pub static ORDER_STATES: VocabularyTable<OrderState, &str> = VocabularyTable::new(
    EXCHANGE,
    "order state",
    &[
        (OrderState::Submitted, "submitted"),
        (OrderState::PartiallyFilled, "partial_filled"),
        (OrderState::Filled, "filled"),
        (OrderState::PartiallyCanceled, "partial_canceled"),
        (OrderState::Canceled, "canceled"),
        (OrderState::PendingCancel, "pending_cancel"),
    ],
);

/// Numeric `status` codes meaning the signature or key was refused.
pub const AUTH_ERROR_CODES: &[&str] = &["6003", "6004", "6005"];
