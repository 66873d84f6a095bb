//! Invoice extraction and business rules.

mod extractor;
pub mod rules;

pub use extractor::{
    Extraction, InvoiceExtractor, InvoiceRejection, RejectionReason, INVOICE_ELEMENT,
    INVOICE_LINE_ELEMENT,
};
