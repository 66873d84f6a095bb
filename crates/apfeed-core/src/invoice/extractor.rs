//! Invoice extraction from an XML batch export.

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{FieldError, FormatError, XmlError};
use crate::format::{render_invoice, Record};
use crate::models::invoice::{Invoice, InvoiceBuilder};
use crate::xml::{XmlDocument, XmlElement};

use super::rules::{
    is_zero_amount, normalize_amount, po_annotation, resolve_date, vendor_exclusion,
    CostCenterPolicy, PoLineInfo, VendorExclusion,
};

/// Element name of one invoice.
pub const INVOICE_ELEMENT: &str = "invoice";

/// Element name of one invoice line.
pub const INVOICE_LINE_ELEMENT: &str = "invoice_line";

/// Why an invoice was kept out of the feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Vendor is excluded from the feed.
    #[error("{kind} ({vendor})")]
    Vendor {
        kind: VendorExclusion,
        vendor: String,
    },

    /// A required field is absent or not unique.
    #[error("{0}")]
    Field(#[from] FieldError),

    /// An amount could not be read as a number.
    #[error("invalid amount in {field}: {value:?}")]
    InvalidAmount { field: &'static str, value: String },

    /// Every line was filtered out.
    #[error("no billable lines")]
    NoBillableLines,

    /// Rendering failed.
    #[error("{0}")]
    Format(#[from] FormatError),
}

/// An invoice excluded from output together with its reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invoice {invoice}: {reason}")]
pub struct InvoiceRejection {
    /// Invoice number, or unique identifier when the number is missing.
    pub invoice: String,
    pub reason: RejectionReason,
}

/// Output of extracting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// One rendered block (header plus lines, CRLF-terminated) per invoice.
    pub records: Vec<String>,
    /// Invoices rejected by validation.
    pub rejections: Vec<InvoiceRejection>,
    /// Invoices skipped silently because of a zero amount.
    pub skipped: usize,
}

impl Extraction {
    /// Number of invoices rendered.
    pub fn invoice_count(&self) -> usize {
        self.records.len()
    }
}

/// Turns invoice nodes into rendered fixed-width records.
#[derive(Debug, Clone)]
pub struct InvoiceExtractor {
    policy: CostCenterPolicy,
}

impl InvoiceExtractor {
    /// Extractor applying the cost-center policy in force at `processed_at`.
    pub fn new(processed_at: NaiveDateTime) -> Self {
        Self {
            policy: CostCenterPolicy::at(processed_at),
        }
    }

    /// Override the cost-center policy.
    pub fn with_policy(mut self, policy: CostCenterPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CostCenterPolicy {
        self.policy
    }

    /// Parse and extract an XML document given as text.
    pub fn extract_str(&self, xml: &str) -> Result<Extraction, XmlError> {
        let document = XmlDocument::parse(xml)?;
        Ok(self.extract(&document))
    }

    /// Extract every invoice of a parsed document.
    pub fn extract(&self, document: &XmlDocument) -> Extraction {
        let mut extraction = Extraction::default();
        let invoices = document.elements_named(INVOICE_ELEMENT);
        info!("Extracting {} invoices ({:?} cost-center policy)", invoices.len(), self.policy);

        for node in invoices {
            let label = invoice_label(node);
            let rendered = self.extract_invoice(node).and_then(|invoice| match invoice {
                Some(invoice) => Ok(Some(render_invoice(&invoice)?)),
                None => Ok(None),
            });

            match rendered {
                Ok(Some(block)) => extraction.records.push(block),
                Ok(None) => {
                    debug!("Skipping zero-amount invoice {}", label);
                    extraction.skipped += 1;
                }
                Err(reason) => {
                    warn!("Rejecting invoice {}: {}", label, reason);
                    extraction.rejections.push(InvoiceRejection {
                        invoice: label,
                        reason,
                    });
                }
            }
        }

        debug!(
            "Extraction finished: {} rendered, {} skipped, {} rejected",
            extraction.records.len(),
            extraction.skipped,
            extraction.rejections.len()
        );
        extraction
    }

    /// Build one invoice; `Ok(None)` when it is skipped without error.
    pub fn extract_invoice(&self, node: &XmlElement) -> Result<Option<Invoice>, RejectionReason> {
        let amount = node.optional_field("invoice_amount/sum")?;
        if is_zero_amount(amount) {
            return Ok(None);
        }
        let amount = amount.unwrap_or_default();
        let amount = normalize_amount(amount).ok_or_else(|| RejectionReason::InvalidAmount {
            field: "invoice_amount/sum",
            value: amount.to_string(),
        })?;

        let vendor = node.unique_field("vendor_FinancialSys_Code")?;
        if let Some(kind) = vendor_exclusion(vendor) {
            return Err(RejectionReason::Vendor {
                kind,
                vendor: vendor.to_string(),
            });
        }

        let invoice_number = node.unique_field("invoice_number")?;
        let unique_identifier = node.unique_field("unique_identifier")?;

        let raw_date = node.optional_field("invoice_date")?.unwrap_or_default();
        let date = resolve_date(raw_date);
        if date.is_fallback() {
            warn!("Invoice {} has unreadable date {:?}", invoice_number, raw_date);
        }

        let mut builder = InvoiceBuilder::new();
        builder.set_header("SGTXT", unique_identifier)?;
        builder.set_header("DOCDATE", date.value.as_str())?;
        builder.set_header("BASELINEDATE", date.value.as_str())?;
        builder.set_header("XBLNR", invoice_number)?;
        builder.set_header("LIFNR", vendor)?;
        builder.set_header("AMOUNT", amount)?;

        for line in node.descendants(INVOICE_LINE_ELEMENT) {
            if let Some(record) = self.extract_line(line)? {
                builder.push_line(record);
            }
        }

        builder.build().map(Some).map_err(|e| match e {
            FormatError::EmptyInvoice => RejectionReason::NoBillableLines,
            other => other.into(),
        })
    }

    /// Build one line record; `Ok(None)` when the line is skipped.
    fn extract_line(&self, line: &XmlElement) -> Result<Option<Record>, RejectionReason> {
        let total = line.optional_field("total_price")?;
        if is_zero_amount(total) {
            debug!("Skipping zero-amount line");
            return Ok(None);
        }
        let total = total.unwrap_or_default();
        let amount = normalize_amount(total).ok_or_else(|| RejectionReason::InvalidAmount {
            field: "total_price",
            value: total.to_string(),
        })?;

        let external_id = line.optional_field("external_id")?;
        let reporting_code = line.optional_field("reporting_code")?;
        let Some(allocation) = self.policy.allocate(external_id, reporting_code) else {
            debug!("Skipping line without cost allocation");
            return Ok(None);
        };

        let annotation = match line.child("po_line_info") {
            Some(info) => po_annotation(&PoLineInfo {
                po_line_number: info.optional_field("po_line_number")?,
                mms_record_id: info.optional_field("mms_record_id")?,
                title: info.optional_field("po_line_title")?,
            }),
            None => String::new(),
        };

        let mut record = InvoiceBuilder::new_line();
        record.set("SAKNR", allocation.gl_code)?;
        record.set("KOSTL", allocation.cost_center)?;
        record.set("AMOUNT", amount)?;
        record.set("SGTXT", annotation)?;
        Ok(Some(record))
    }
}

fn invoice_label(node: &XmlElement) -> String {
    node.unique_field("invoice_number")
        .or_else(|_| node.unique_field("unique_identifier"))
        .map(str::to_string)
        .unwrap_or_else(|_| "<unidentified>".to_string())
}
