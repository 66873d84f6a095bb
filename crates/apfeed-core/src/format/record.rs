//! Fixed-width rendering of single records.

use super::columns::{Alignment, ColumnSpec, RecordLayout};
use crate::error::FormatError;

/// Line terminator of every rendered record.
pub const RECORD_TERMINATOR: &str = "\r\n";

/// Fold `raw` to plain ASCII and fit it to the column width.
///
/// Values longer than the column are cut to exactly `width` characters;
/// shorter values are padded with spaces on the side opposite the alignment.
pub fn normalize(column: &ColumnSpec, raw: &str) -> String {
    let folded = transliterate(raw);
    let fitted: String = folded.chars().take(column.width).collect();

    match column.alignment {
        Alignment::Left => format!("{:<width$}", fitted, width = column.width),
        Alignment::Right => format!("{:>width$}", fitted, width = column.width),
    }
}

/// Normalize a value addressed by column name.
pub fn normalize_column(layout: &RecordLayout, column: &str, raw: &str) -> Result<String, FormatError> {
    let found = layout.column(column).ok_or_else(|| FormatError::UnknownColumn {
        record: layout.kind,
        column: column.to_string(),
    })?;
    Ok(normalize(found, raw))
}

/// Low double quotation mark, folded to a single `"` rather than `,,`.
const LOW_DOUBLE_QUOTE: char = '\u{201e}';

/// Diacritic and Unicode folding to ASCII.
///
/// Control characters become spaces so a value can never break a record
/// across lines.
pub fn transliterate(raw: &str) -> String {
    let quoted = raw.replace(LOW_DOUBLE_QUOTE, "\"");
    deunicode::deunicode(&quoted)
        .chars()
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect()
}

/// One record: a value for every column of its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    layout: &'static RecordLayout,
    values: Vec<String>,
}

impl Record {
    /// A record holding the default value of every column.
    pub fn new(layout: &'static RecordLayout) -> Self {
        Self {
            layout,
            values: layout.columns.iter().map(|c| c.default.to_string()).collect(),
        }
    }

    pub fn layout(&self) -> &'static RecordLayout {
        self.layout
    }

    /// Set the raw value of a column.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> Result<(), FormatError> {
        let index = self.index_of(column)?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, column: &str, value: impl Into<String>) -> Result<Self, FormatError> {
        self.set(column, value)?;
        Ok(self)
    }

    /// Raw (unnormalized) value of a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.layout.position(column).map(|i| self.values[i].as_str())
    }

    /// Render all columns in layout order followed by CRLF.
    pub fn render(&self) -> String {
        let mut line = String::with_capacity(self.layout.width() + RECORD_TERMINATOR.len());
        for (column, value) in self.layout.columns.iter().zip(&self.values) {
            line.push_str(&normalize(column, value));
        }
        line.push_str(RECORD_TERMINATOR);
        line
    }

    /// Render with one column temporarily replaced.
    pub fn render_with(&self, column: &str, value: &str) -> Result<String, FormatError> {
        let mut record = self.clone();
        record.set(column, value)?;
        Ok(record.render())
    }

    fn index_of(&self, column: &str) -> Result<usize, FormatError> {
        self.layout
            .position(column)
            .ok_or_else(|| FormatError::UnknownColumn {
                record: self.layout.kind,
                column: column.to_string(),
            })
    }
}
