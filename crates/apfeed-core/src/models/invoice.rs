//! Invoice model accumulated by the extractor and consumed by the formatter.

use crate::error::FormatError;
use crate::format::{Record, HEADER_LAYOUT, LINE_LAYOUT};

/// A complete invoice ready for rendering.
///
/// Always holds at least one line item; the only way to obtain one is
/// [`InvoiceBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    header: Record,
    lines: Vec<Record>,
}

impl Invoice {
    /// Header record.
    pub fn header(&self) -> &Record {
        &self.header
    }

    /// Line records in invoice order.
    pub fn lines(&self) -> &[Record] {
        &self.lines
    }
}

/// Owned accumulator for one invoice.
///
/// Created fresh for every invoice node, moved through the extraction steps
/// and finally turned into an [`Invoice`]. Line markers are not set here;
/// the formatter decides them from each line's position.
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    header: Record,
    lines: Vec<Record>,
}

impl InvoiceBuilder {
    /// A builder with a defaulted header and no lines.
    pub fn new() -> Self {
        Self {
            header: Record::new(&HEADER_LAYOUT),
            lines: Vec::new(),
        }
    }

    /// A defaulted line record.
    pub fn new_line() -> Record {
        Record::new(&LINE_LAYOUT)
    }

    /// Set a header column.
    pub fn set_header(&mut self, column: &str, value: impl Into<String>) -> Result<(), FormatError> {
        self.header.set(column, value)
    }

    /// Append a line record.
    pub fn push_line(&mut self, line: Record) {
        debug_assert!(std::ptr::eq(line.layout(), &LINE_LAYOUT));
        self.lines.push(line);
    }

    pub fn header(&self) -> &Record {
        &self.header
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Finish the invoice; fails when no line item was added.
    pub fn build(self) -> Result<Invoice, FormatError> {
        if self.lines.is_empty() {
            return Err(FormatError::EmptyInvoice);
        }
        Ok(Invoice {
            header: self.header,
            lines: self.lines,
        })
    }
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
