//! Line-item arithmetic for quotes, invoices, and job pricing.
//!
//! All monetary amounts in the system are fixed at 2 decimal places; there is
//! no currency-specific decimal-place table.

use crate::models::PricingType;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary value to 2 decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount for a single line item: `round2(quantity * rate)`.
pub fn line_amount(quantity: Decimal, rate: Decimal) -> Decimal {
    round2(quantity * rate)
}

/// Sum of already-rounded line amounts.
pub fn subtotal<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().sum()
}

/// Invoice total: subtotal plus a non-negative tax amount.
pub fn invoice_total(subtotal: Decimal, tax_amount: Decimal) -> Decimal {
    subtotal + tax_amount
}

/// Total for a job given its pricing type.
///
/// Flat-fee pricing bypasses quantity multiplication entirely; per-word and
/// per-hour default quantity to 1 and rate to 0 when absent.
pub fn job_total(
    pricing_type: PricingType,
    quantity: Option<Decimal>,
    rate: Option<Decimal>,
) -> Decimal {
    let rate = rate.unwrap_or(Decimal::ZERO);
    match pricing_type {
        PricingType::FlatFee => round2(rate),
        PricingType::PerWord | PricingType::PerHour => {
            line_amount(quantity.unwrap_or(Decimal::ONE), rate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_amount_multiplies_and_rounds() {
        assert_eq!(line_amount(dec!(10), dec!(5)), dec!(50.00));
        assert_eq!(line_amount(dec!(3), dec!(0.333)), dec!(1.00));
        assert_eq!(line_amount(dec!(0.5), dec!(0.05)), dec!(0.03));
    }

    #[test]
    fn subtotal_sums_amounts() {
        let items = [dec!(50.00), dec!(50.00)];
        assert_eq!(subtotal(items), dec!(100.00));
        assert_eq!(subtotal(std::iter::empty()), Decimal::ZERO);
    }

    #[test]
    fn invoice_total_adds_tax() {
        assert_eq!(invoice_total(dec!(100.00), dec!(19.00)), dec!(119.00));
        assert_eq!(invoice_total(dec!(100.00), Decimal::ZERO), dec!(100.00));
    }

    #[test]
    fn flat_fee_ignores_quantity() {
        let total = job_total(PricingType::FlatFee, Some(dec!(9999)), Some(dec!(250.00)));
        assert_eq!(total, dec!(250.00));
    }

    #[test]
    fn per_word_multiplies_quantity_and_rate() {
        let total = job_total(PricingType::PerWord, Some(dec!(1200)), Some(dec!(0.10)));
        assert_eq!(total, dec!(120.00));
    }

    #[test]
    fn per_hour_defaults_quantity_to_one() {
        let total = job_total(PricingType::PerHour, None, Some(dec!(80.00)));
        assert_eq!(total, dec!(80.00));
    }

    #[test]
    fn missing_rate_defaults_to_zero() {
        assert_eq!(job_total(PricingType::PerWord, Some(dec!(500)), None), Decimal::ZERO);
        assert_eq!(job_total(PricingType::FlatFee, None, None), Decimal::ZERO);
    }

    // Worked example: [{qty:10, rate:5}, {qty:2, rate:25}] -> 100.00
    #[test]
    fn two_item_quote_subtotal() {
        let amounts = vec![
            line_amount(dec!(10), dec!(5)),
            line_amount(dec!(2), dec!(25)),
        ];
        assert_eq!(subtotal(amounts), dec!(100.00));
    }
}
