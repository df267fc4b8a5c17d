//! Money Helpers
//!
//! Amount parsing for form input and the single currency format used for
//! every total and record (US dollars, two decimals, half-to-even).

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Parse user input such as `"12.5"`, `" 100 "` or `"1e3"`
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .ok()
}

pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// `$1,234.50`; negatives render as `-$1.00`
pub fn format_currency(amount: Decimal) -> String {
    let mut rounded = round_cents(amount);
    rounded.rescale(2);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.5"), Some(dec("12.5")));
        assert_eq!(parse_amount(" 100 "), Some(dec("100")));
        assert_eq!(parse_amount("1e3"), Some(dec("1000")));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("12.5.1"), None);
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_cents(dec("0.125")), dec("0.12"));
        assert_eq!(round_cents(dec("0.135")), dec("0.14"));
        assert_eq!(round_cents(dec("2.5")), dec("2.5"));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
        assert_eq!(format_currency(dec("12.5")), "$12.50");
        assert_eq!(format_currency(dec("360.5")), "$360.50");
        assert_eq!(format_currency(dec("1234.5")), "$1,234.50");
        assert_eq!(format_currency(dec("1234567.891")), "$1,234,567.89");
        assert_eq!(format_currency(dec("999.995")), "$1,000.00");
        assert_eq!(format_currency(dec("-1")), "-$1.00");
    }
}
