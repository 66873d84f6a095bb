//! Cost-center and GL-code allocation policy.
//!
//! Which source fields carry the allocation depends on when the run happens,
//! not on anything in the invoice itself.

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;

lazy_static! {
    /// Processing time from which GL code and cost center come from
    /// separate fields.
    pub static ref COST_CENTER_CUTOVER: NaiveDateTime = NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
}

/// GL account and cost center of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// General ledger account (SAKNR).
    pub gl_code: String,
    /// Cost center (KOSTL).
    pub cost_center: String,
}

/// Allocation field policy in force at a processing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostCenterPolicy {
    /// `external_id` holds `<cost center>-<GL code>`.
    Combined,
    /// `reporting_code` holds the GL code, `external_id` the cost center.
    Separate,
}

impl CostCenterPolicy {
    /// Policy for a run processed at `processed_at`.
    pub fn at(processed_at: NaiveDateTime) -> Self {
        if processed_at < *COST_CENTER_CUTOVER {
            CostCenterPolicy::Combined
        } else {
            CostCenterPolicy::Separate
        }
    }

    /// Allocate a line from its raw fields; `None` when a required field is
    /// missing and the line must be skipped.
    pub fn allocate(self, external_id: Option<&str>, reporting_code: Option<&str>) -> Option<Allocation> {
        match self {
            CostCenterPolicy::Combined => external_id.map(split_combined),
            CostCenterPolicy::Separate => Some(Allocation {
                gl_code: reporting_code?.to_string(),
                cost_center: external_id?.to_string(),
            }),
        }
    }
}

/// Split on the last hyphen; without one the whole value is the GL code.
fn split_combined(value: &str) -> Allocation {
    match value.rsplit_once('-') {
        Some((cost_center, gl_code)) => Allocation {
            gl_code: gl_code.to_string(),
            cost_center: cost_center.to_string(),
        },
        None => Allocation {
            gl_code: value.to_string(),
            cost_center: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_policy_switch() {
        assert_eq!(CostCenterPolicy::at(at(2016, 12, 31)), CostCenterPolicy::Combined);
        assert_eq!(CostCenterPolicy::at(*COST_CENTER_CUTOVER), CostCenterPolicy::Separate);
        assert_eq!(CostCenterPolicy::at(at(2024, 5, 1)), CostCenterPolicy::Separate);
    }

    #[test]
    fn test_combined_split_on_last_hyphen() {
        let allocation = CostCenterPolicy::Combined
            .allocate(Some("CC100-GL200"), Some("ignored"))
            .unwrap();
        assert_eq!(allocation.cost_center, "CC100");
        assert_eq!(allocation.gl_code, "GL200");

        let allocation = CostCenterPolicy::Combined.allocate(Some("A-B-400100"), None).unwrap();
        assert_eq!(allocation.cost_center, "A-B");
        assert_eq!(allocation.gl_code, "400100");
    }

    #[test]
    fn test_combined_without_hyphen() {
        let allocation = CostCenterPolicy::Combined.allocate(Some("400100"), None).unwrap();
        assert_eq!(allocation.gl_code, "400100");
        assert_eq!(allocation.cost_center, "");
    }

    #[test]
    fn test_separate_fields_unmodified() {
        let allocation = CostCenterPolicy::Separate
            .allocate(Some("CC100-GL200"), Some("400100"))
            .unwrap();
        assert_eq!(allocation.gl_code, "400100");
        assert_eq!(allocation.cost_center, "CC100-GL200");
    }

    #[test]
    fn test_missing_fields_skip_line() {
        assert_eq!(CostCenterPolicy::Combined.allocate(None, Some("400100")), None);
        assert_eq!(CostCenterPolicy::Separate.allocate(Some("CC100"), None), None);
        assert_eq!(CostCenterPolicy::Separate.allocate(None, Some("400100")), None);
    }
}
