//! Display formatting for monetary amounts.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::line_items::round2;

/// Format an amount with thousands separators and its ISO currency code,
/// e.g. `1,234.50 USD`.
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let rounded = round2(amount);
    let negative = rounded.is_sign_negative();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), format!("{:0<2}", f)),
        None => (text, "00".to_string()),
    };

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (idx, ch) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{} {}", sign, grouped, frac_part, currency)
}

/// Parse an amount out of a formatted string, accepting both the output of
/// [`format_amount`] and bare numerics.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn formats_with_separators_and_code() {
        assert_eq!(format_amount(dec!(1234.5), "USD"), "1,234.50 USD");
        assert_eq!(format_amount(dec!(0), "EUR"), "0.00 EUR");
        assert_eq!(format_amount(dec!(1000000), "BRL"), "1,000,000.00 BRL");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_amount(dec!(-42.1), "USD"), "-42.10 USD");
    }

    #[test]
    fn always_two_decimals() {
        assert_eq!(format_amount(dec!(12.345), "JPY"), "12.35 JPY");
        assert_eq!(format_amount(dec!(7), "JPY"), "7.00 JPY");
    }

    #[test]
    fn parses_formatted_and_bare_values() {
        assert_eq!(parse_amount("1,234.50 USD"), Some(dec!(1234.50)));
        assert_eq!(parse_amount("42"), Some(dec!(42)));
        assert_eq!(parse_amount("-42.10 EUR"), Some(dec!(-42.10)));
        assert_eq!(parse_amount("USD"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn format_parse_round_trip() {
        let amount = dec!(9876.54);
        assert_eq!(parse_amount(&format_amount(amount, "USD")), Some(amount));
    }
}
