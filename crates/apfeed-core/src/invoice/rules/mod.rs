//! Business rules deciding what reaches the feed and how fields are derived.
//!
//! Everything here is pure: no I/O, no clock reads, no XML access.

pub mod amounts;
pub mod cost_center;
pub mod dates;
pub mod patterns;
pub mod po_line;
pub mod vendor;

pub use amounts::{format_amount, is_zero_amount, normalize_amount, parse_amount};
pub use cost_center::{Allocation, CostCenterPolicy, COST_CENTER_CUTOVER};
pub use dates::{resolve_date, DateStrategy, ResolvedDate, FALLBACK_DATE};
pub use po_line::{decode_html_entities, po_annotation, PoLineInfo};
pub use vendor::{vendor_exclusion, VendorExclusion};
