//! Per-currency aggregation for dashboards and reports.
//!
//! Amounts of different currencies are never combined into one number; each
//! currency accumulates independently. Any filtering (status, paid flag)
//! happens before rows reach this function.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Currency assumed when a row carries none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Group monetary rows by currency code and sum each group.
pub fn sum_by_currency<I, S>(rows: I) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = (Option<S>, Decimal)>,
    S: AsRef<str>,
{
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for (currency, amount) in rows {
        let code = match &currency {
            Some(c) if !c.as_ref().is_empty() => c.as_ref().to_string(),
            _ => DEFAULT_CURRENCY.to_string(),
        };
        *totals.entry(code).or_insert(Decimal::ZERO) += amount;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sums_within_one_currency() {
        let totals = sum_by_currency(vec![
            (Some("USD"), dec!(100.00)),
            (Some("USD"), dec!(50.50)),
        ]);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals["USD"], dec!(150.50));
    }

    #[test]
    fn never_mixes_currencies() {
        let totals = sum_by_currency(vec![
            (Some("USD"), dec!(100)),
            (Some("EUR"), dec!(200)),
            (Some("USD"), dec!(1)),
        ]);
        assert_eq!(totals["USD"], dec!(101));
        assert_eq!(totals["EUR"], dec!(200));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn missing_currency_defaults_to_usd() {
        let totals = sum_by_currency(vec![
            (None::<&str>, dec!(10)),
            (Some(""), dec!(5)),
            (Some("USD"), dec!(1)),
        ]);
        assert_eq!(totals["USD"], dec!(16));
    }

    #[test]
    fn grand_total_equals_sum_of_groups() {
        let rows = vec![
            (Some("USD"), dec!(10)),
            (Some("EUR"), dec!(20)),
            (Some("BRL"), dec!(30)),
            (Some("EUR"), dec!(40)),
        ];
        let all: Decimal = rows.iter().map(|(_, a)| *a).sum();
        let grouped: Decimal = sum_by_currency(rows).values().copied().sum();
        assert_eq!(all, grouped);
    }

    #[test]
    fn negative_amounts_accumulate() {
        let totals = sum_by_currency(vec![
            (Some("USD"), dec!(100)),
            (Some("USD"), dec!(-140)),
        ]);
        assert_eq!(totals["USD"], dec!(-40));
    }
}
