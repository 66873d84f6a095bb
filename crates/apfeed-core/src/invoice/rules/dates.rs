//! Invoice date resolution to `YYYYMMDD`.
//!
//! Dates arrive either as `MM/DD/YYYY` or as a bare eight-digit string whose
//! field order depends on who keyed the invoice. Resolution runs an ordered
//! chain of strategies and ends in a fixed sentinel date.

use chrono::NaiveDate;

use super::patterns::{EIGHT_DIGIT_DATE, SLASHED_DATE};

/// Output when no strategy understands the input (14 March 1879).
pub const FALLBACK_DATE: &str = "18790314";

/// One step of the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStrategy {
    /// Strict `MM/DD/YYYY`.
    Slashed,
    /// Eight digits, reordered by the day/month heuristic.
    EightDigit,
}

impl DateStrategy {
    /// Strategies in the order they are tried.
    pub const CHAIN: [DateStrategy; 2] = [DateStrategy::Slashed, DateStrategy::EightDigit];

    /// Apply this strategy alone.
    pub fn apply(self, raw: &str) -> Option<String> {
        match self {
            DateStrategy::Slashed => parse_slashed(raw),
            DateStrategy::EightDigit => parse_eight_digit(raw),
        }
    }
}

/// Result of resolving one raw date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    /// `YYYYMMDD`.
    pub value: String,
    /// Strategy that produced the value; `None` for the fallback.
    pub strategy: Option<DateStrategy>,
}

impl ResolvedDate {
    pub fn is_fallback(&self) -> bool {
        self.strategy.is_none()
    }
}

/// Resolve a raw invoice date, never failing.
pub fn resolve_date(raw: &str) -> ResolvedDate {
    let raw = raw.trim();
    DateStrategy::CHAIN
        .iter()
        .find_map(|strategy| {
            strategy.apply(raw).map(|value| ResolvedDate {
                value,
                strategy: Some(*strategy),
            })
        })
        .unwrap_or_else(|| ResolvedDate {
            value: FALLBACK_DATE.to_string(),
            strategy: None,
        })
}

/// Strict `MM/DD/YYYY`.
pub fn parse_slashed(raw: &str) -> Option<String> {
    if !SLASHED_DATE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y")
        .ok()
        .map(|date| date.format("%Y%m%d").to_string())
}

/// Eight-digit heuristic.
///
/// When the trailing four digits start with 19 or 20 the year sits at the
/// end and the two leading pairs are day and month in unknown order: a valid
/// day followed by a valid month is read as `DDMMYYYY`, otherwise a valid
/// month followed by a valid day as `MMDDYYYY`. Any other eight-digit input
/// is taken to be `YYYYMMDD` already and returned unchanged.
pub fn parse_eight_digit(raw: &str) -> Option<String> {
    let caps = EIGHT_DIGIT_DATE.captures(raw)?;
    let first = &caps[1];
    let second = &caps[2];
    let year = &caps[3];

    if !(year.starts_with("19") || year.starts_with("20")) {
        return Some(raw.to_string());
    }

    let resolved = if is_day(first) && is_month(second) {
        format!("{year}{second}{first}")
    } else if is_month(first) && is_day(second) {
        format!("{year}{first}{second}")
    } else {
        raw.to_string()
    };
    Some(resolved)
}

fn is_day(pair: &str) -> bool {
    matches!(pair.parse::<u32>(), Ok(1..=31))
}

fn is_month(pair: &str) -> bool {
    matches!(pair.parse::<u32>(), Ok(1..=12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slashed_date() {
        let resolved = resolve_date("02/14/2016");
        assert_eq!(resolved.value, "20160214");
        assert_eq!(resolved.strategy, Some(DateStrategy::Slashed));
    }

    #[test]
    fn test_slashed_rejects_day_first() {
        assert_eq!(parse_slashed("14/02/2016"), None);
        assert_eq!(parse_slashed("2016-02-14"), None);
        assert_eq!(parse_slashed("02/14/16"), None);
        assert_eq!(parse_slashed("2/4/2016").as_deref(), Some("20160204"));
    }

    #[test]
    fn test_eight_digit_day_first() {
        let resolved = resolve_date("14022016");
        assert_eq!(resolved.value, "20160214");
        assert_eq!(resolved.strategy, Some(DateStrategy::EightDigit));
    }

    #[test]
    fn test_eight_digit_month_first() {
        assert_eq!(parse_eight_digit("02142016").as_deref(), Some("20160214"));
    }

    #[test]
    fn test_eight_digit_ambiguous_prefers_day_first() {
        assert_eq!(parse_eight_digit("03022016").as_deref(), Some("20160203"));
    }

    #[test]
    fn test_eight_digit_keeps_year_first() {
        assert_eq!(parse_eight_digit("20160214").as_deref(), Some("20160214"));
    }

    #[test]
    fn test_eight_digit_unreadable_pairs_kept() {
        assert_eq!(parse_eight_digit("45672016").as_deref(), Some("45672016"));
    }

    #[test]
    fn test_fallback_date() {
        for raw in ["", "not a date", "2016-02-14", "1402201", "14.02.2016", "02/14/16", "02/14/02016"] {
            let resolved = resolve_date(raw);
            assert_eq!(resolved.value, FALLBACK_DATE, "input {raw:?}");
            assert!(resolved.is_fallback());
        }
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(resolve_date(" 02/14/2016\n").value, "20160214");
    }
}
