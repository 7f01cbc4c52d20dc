use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a balance can be traded or is locked by open orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceRole {
    Available,
    Frozen,
}

impl BalanceRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            BalanceRole::Available => "available",
            BalanceRole::Frozen => "frozen",
        }
    }
}

/// One currency amount in one role. A balance list holds at most one entry
/// per `(currency, role)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    pub amount: Decimal,
    pub role: BalanceRole,
}

impl Balance {
    pub fn new(currency: impl Into<String>, amount: Decimal, role: BalanceRole) -> Self {
        Self {
            currency: currency.into(),
            amount,
            role,
        }
    }
}

/// Collapse entries sharing `(currency, role)` by summing their amounts.
///
/// Keeps first-seen order. Currency comparison is case-insensitive and the
/// first spelling wins.
pub fn merge_balances(entries: impl IntoIterator<Item = Balance>) -> Vec<Balance> {
    let mut merged: Vec<Balance> = Vec::new();
    for entry in entries {
        match merged.iter_mut().find(|b| {
            b.role == entry.role && b.currency.eq_ignore_ascii_case(&entry.currency)
        }) {
            Some(existing) => existing.amount += entry.amount,
            None => merged.push(entry),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn merge_sums_duplicate_currency_role_pairs() {
        let merged = merge_balances(vec![
            Balance::new("usdt", dec!(10), BalanceRole::Available),
            Balance::new("usdt", dec!(1), BalanceRole::Frozen),
            Balance::new("USDT", dec!(2.5), BalanceRole::Available),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].amount, dec!(12.5));
        assert_eq!(merged[0].currency, "usdt");
        assert_eq!(merged[1].role, BalanceRole::Frozen);
    }
}
