//! Common regex patterns for invoice business rules.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Empty or all-zero amounts: "", "0", "0.00", "-0,0"
    pub static ref ZERO_AMOUNT: Regex = Regex::new(
        r"^[+-]?0*(?:[.,]0*)?$"
    ).unwrap();

    // Signed decimal amount with optional thousands grouping
    pub static ref AMOUNT: Regex = Regex::new(
        r"^[+-]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$"
    ).unwrap();

    // Vendors settled by corporate credit card
    pub static ref CREDIT_CARD_VENDOR: Regex = Regex::new(
        r"(?i)credit\s*card"
    ).unwrap();

    // Reversal postings against purchase orders
    pub static ref REVERSE_PO_VENDOR: Regex = Regex::new(
        r"(?i)\breverse\s*po\b"
    ).unwrap();

    // MM/DD/YYYY shape; the year must have four digits
    pub static ref SLASHED_DATE: Regex = Regex::new(
        r"^\d{1,2}/\d{1,2}/\d{4}$"
    ).unwrap();

    // Eight digits, two leading pairs and a trailing four-digit group
    pub static ref EIGHT_DIGIT_DATE: Regex = Regex::new(
        r"^(\d{2})(\d{2})(\d{4})$"
    ).unwrap();
}
