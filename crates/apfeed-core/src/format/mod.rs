//! Fixed-width interchange format.

mod columns;
mod record;

pub use columns::{
    Alignment, ColumnSpec, RecordLayout, CONTINUATION_LINE_MARKER, FINAL_LINE_MARKER, HEADER_LAYOUT,
    HEADER_TYPE, LINE_LAYOUT, LINE_MARKER_COLUMN,
};
pub use record::{normalize, normalize_column, transliterate, Record, RECORD_TERMINATOR};

use crate::error::FormatError;
use crate::models::invoice::Invoice;

/// Render an invoice as its header record followed by its line records.
///
/// The last line carries [`FINAL_LINE_MARKER`], every other line
/// [`CONTINUATION_LINE_MARKER`], so the consumer can find invoice
/// boundaries without a line count.
pub fn render_invoice(invoice: &Invoice) -> Result<String, FormatError> {
    let lines = invoice.lines();
    let last = lines.len().checked_sub(1).ok_or(FormatError::EmptyInvoice)?;

    let mut output = invoice.header().render();
    for (index, line) in lines.iter().enumerate() {
        let marker = if index == last {
            FINAL_LINE_MARKER
        } else {
            CONTINUATION_LINE_MARKER
        };
        output.push_str(&line.render_with(LINE_MARKER_COLUMN, marker)?);
    }
    Ok(output)
}
