//! Vendor-based invoice exclusion.

use std::fmt;

use super::patterns::{CREDIT_CARD_VENDOR, REVERSE_PO_VENDOR};

/// Reason an invoice is kept out of the feed because of its vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorExclusion {
    /// Paid by credit card, settled outside accounts payable.
    CreditCard,
    /// Reversal of a purchase order.
    ReversePo,
}

impl fmt::Display for VendorExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorExclusion::CreditCard => write!(f, "credit card vendor"),
            VendorExclusion::ReversePo => write!(f, "reverse PO vendor"),
        }
    }
}

/// Check a resolved vendor code against the exclusion patterns.
pub fn vendor_exclusion(vendor_code: &str) -> Option<VendorExclusion> {
    if CREDIT_CARD_VENDOR.is_match(vendor_code) {
        Some(VendorExclusion::CreditCard)
    } else if REVERSE_PO_VENDOR.is_match(vendor_code) {
        Some(VendorExclusion::ReversePo)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_card_vendor() {
        assert_eq!(vendor_exclusion("CREDITCARD-VISA"), Some(VendorExclusion::CreditCard));
        assert_eq!(vendor_exclusion("Amex credit card"), Some(VendorExclusion::CreditCard));
    }

    #[test]
    fn test_reverse_po_vendor() {
        assert_eq!(vendor_exclusion("Reverse PO"), Some(VendorExclusion::ReversePo));
        assert_eq!(vendor_exclusion("REVERSE PO 2016"), Some(VendorExclusion::ReversePo));
        assert_eq!(vendor_exclusion("reversePO"), Some(VendorExclusion::ReversePo));
    }

    #[test]
    fn test_regular_vendor() {
        assert_eq!(vendor_exclusion("100234"), None);
        assert_eq!(vendor_exclusion("POREVERSE"), None);
        assert_eq!(vendor_exclusion("Reverse Polish Supplies"), None);
        assert_eq!(vendor_exclusion("Irreverse PO"), None);
        assert_eq!(vendor_exclusion(""), None);
    }
}
