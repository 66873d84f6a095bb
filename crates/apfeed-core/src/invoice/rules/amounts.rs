//! Amount checks and normalization.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use super::patterns::{AMOUNT, ZERO_AMOUNT};

lazy_static! {
    static ref DECIMAL_COMMA_AMOUNT: Regex = Regex::new(r"^[+-]?\d+,\d{1,2}$").unwrap();
}

/// Whether an amount field is absent, empty or zero.
///
/// Invoices and lines with such amounts are skipped without an error.
pub fn is_zero_amount(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(value) => ZERO_AMOUNT.is_match(value.trim()),
    }
}

/// Parse an amount such as `1234.56`, `1,234.56` or `12,50`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let normalized = if AMOUNT.is_match(raw) {
        raw.replace(',', "")
    } else if DECIMAL_COMMA_AMOUNT.is_match(raw) {
        raw.replace(',', ".")
    } else {
        return None;
    };
    Decimal::from_str(&normalized).ok()
}

/// Render an amount with exactly two decimals.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Parse and re-render an amount; `None` when it cannot be parsed.
pub fn normalize_amount(raw: &str) -> Option<String> {
    parse_amount(raw).map(format_amount)
}
