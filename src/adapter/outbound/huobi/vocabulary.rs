//! Huobi wire literals.

use crate::domain::{BalanceRole, OrderKind, OrderSide, OrderState};
use crate::normalize::VocabularyTable;

use super::EXCHANGE;

/// Huobi folds side and kind into one `type` literal.
pub static ORDER_TYPES: VocabularyTable<(OrderSide, OrderKind), &str> = VocabularyTable::new(
    EXCHANGE,
    "order type",
    &[
        ((OrderSide::Buy, OrderKind::Limit), "buy-limit"),
        ((OrderSide::Sell, OrderKind::Limit), "sell-limit"),
        ((OrderSide::Buy, OrderKind::Market), "buy-market"),
        ((OrderSide::Sell, OrderKind::Market), "sell-market"),
    ],
);

pub static ORDER_STATES: VocabularyTable<OrderState, &str> = VocabularyTable::new(
    EXCHANGE,
    "order state",
    &[
        (OrderState::Submitted, "submitted"),
        (OrderState::PartiallyFilled, "partial-filled"),
        (OrderState::Filled, "filled"),
        (OrderState::PartiallyCanceled, "partial-canceled"),
        (OrderState::Canceled, "canceled"),
        (OrderState::PendingCancel, "canceling"),
    ],
)
.with_aliases(&[
    ("pre-submitted", OrderState::Submitted),
    ("submitting", OrderState::Submitted),
    ("created", OrderState::Submitted),
]);

pub static BALANCE_ROLES: VocabularyTable<BalanceRole, &str> = VocabularyTable::new(
    EXCHANGE,
    "balance type",
    &[(BalanceRole::Available, "trade"), (BalanceRole::Frozen, "frozen")],
);

/// Taker direction on trade prints.
pub static TRADE_DIRECTIONS: VocabularyTable<OrderSide, &str> = VocabularyTable::new(
    EXCHANGE,
    "trade direction",
    &[(OrderSide::Buy, "buy"), (OrderSide::Sell, "sell")],
);

/// Error codes meaning the signature or key was refused.
pub const AUTH_ERROR_CODES: &[&str] = &[
    "api-signature-not-valid",
    "api-signature-check-failed",
    "invalid-access-key",
];
