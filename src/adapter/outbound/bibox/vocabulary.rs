//! Bibox-family wire literals. Enumerations are small integers.

use std::fmt::Debug;

use serde_json::Value;

use crate::adapter::outbound::rest::scalar_text;
use crate::domain::{OrderKind, OrderSide, OrderState};
use crate::error::Result;
use crate::normalize::VocabularyTable;

use super::EXCHANGE;

pub static ORDER_SIDES: VocabularyTable<OrderSide, u8> = VocabularyTable::new(
    EXCHANGE,
    "order side",
    &[(OrderSide::Buy, 1), (OrderSide::Sell, 2)],
);

pub static ORDER_KINDS: VocabularyTable<OrderKind, u8> = VocabularyTable::new(
    EXCHANGE,
    "order type",
    &[(OrderKind::Market, 1), (OrderKind::Limit, 2)],
);

pub static ORDER_STATES: VocabularyTable<OrderState, u8> = VocabularyTable::new(
    EXCHANGE,
    "order status",
    &[
        (OrderState::Submitted, 1),
        (OrderState::PartiallyFilled, 2),
        (OrderState::Filled, 3),
        (OrderState::PartiallyCanceled, 4),
        (OrderState::Canceled, 5),
        (OrderState::PendingCancel, 6),
    ],
);

/// Decode an enumeration sent as a number or as numeric text. Anything that
/// is not a known code, including out-of-range numbers, is reported with its
/// raw value.
pub fn decode_code<C>(table: &VocabularyTable<C, u8>, raw: &Value) -> Result<C>
where
    C: Copy + PartialEq + Debug,
{
    let code = match raw {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u8>().ok(),
        _ => None,
    };
    match code {
        Some(code) => table.decode(code),
        None => Err(table.unknown(scalar_text(raw).unwrap_or_else(|| raw.to_string()))),
    }
}

/// Spot account.
pub const ACCOUNT_TYPE_SPOT: u8 = 0;

/// Error codes meaning the signature or key was refused.
pub const AUTH_ERROR_CODES: &[&str] = &["3011", "3012", "3025"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn tables_round_trip() {
        for side in OrderSide::ALL {
            assert_eq!(ORDER_SIDES.decode(ORDER_SIDES.try_encode(side).unwrap()).unwrap(), side);
        }
        for kind in OrderKind::ALL {
            assert_eq!(ORDER_KINDS.decode(ORDER_KINDS.try_encode(kind).unwrap()).unwrap(), kind);
        }
        for state in OrderState::ALL {
            let native = ORDER_STATES.try_encode(state).unwrap();
            assert_eq!(ORDER_STATES.decode(native).unwrap(), state);
        }
    }

    #[test]
    fn codes_decode_from_numbers_and_text() {
        assert_eq!(decode_code(&ORDER_STATES, &json!(3)).unwrap(), OrderState::Filled);
        assert_eq!(decode_code(&ORDER_SIDES, &json!("2")).unwrap(), OrderSide::Sell);
    }

    #[test]
    fn out_of_range_code_keeps_its_raw_value() {
        match decode_code(&ORDER_STATES.named("coinpark"), &json!(300)) {
            Err(Error::UnknownVocabulary {
                exchange,
                field,
                value,
            }) => {
                assert_eq!(exchange, "coinpark");
                assert_eq!(field, "order status");
                assert_eq!(value, "300");
            }
            other => panic!("expected UnknownVocabulary, got {other:?}"),
        }
        assert!(matches!(
            decode_code(&ORDER_KINDS, &json!("limit")),
            Err(Error::UnknownVocabulary { .. })
        ));
    }

    #[test]
    fn unknown_status_names_the_number() {
        let err = ORDER_STATES.decode(9_u8).unwrap_err();
        assert!(err.to_string().contains("'9'"));
    }
}
