//! Column layouts of the header and line record types.

/// Padding side of a column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Value first, spaces after.
    Left,
    /// Spaces first, value after.
    Right,
}

/// Definition of one fixed-width output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name used to address the value.
    pub name: &'static str,
    /// Exact rendered width in characters.
    pub width: usize,
    /// Padding side.
    pub alignment: Alignment,
    /// Value used when the extractor does not set one.
    pub default: &'static str,
}

impl ColumnSpec {
    const fn left(name: &'static str, width: usize) -> Self {
        Self {
            name,
            width,
            alignment: Alignment::Left,
            default: "",
        }
    }

    const fn right(name: &'static str, width: usize) -> Self {
        Self {
            name,
            width,
            alignment: Alignment::Right,
            default: "",
        }
    }

    const fn with_default(mut self, default: &'static str) -> Self {
        self.default = default;
        self
    }
}

/// Ordered column table of one record type.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordLayout {
    /// Record type label used in diagnostics.
    pub kind: &'static str,
    /// Columns in output order.
    pub columns: &'static [ColumnSpec],
}

impl RecordLayout {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Total rendered width, excluding the line terminator.
    pub fn width(&self) -> usize {
        self.columns.iter().map(|c| c.width).sum()
    }
}

/// Record type marker of header records.
pub const HEADER_TYPE: &str = "H";

/// Record type marker of every line item except the last of its invoice.
pub const CONTINUATION_LINE_MARKER: &str = "P";

/// Record type marker of the last line item of an invoice.
pub const FINAL_LINE_MARKER: &str = "L";

/// Column carrying the line marker.
pub const LINE_MARKER_COLUMN: &str = "TYPE";

/// Invoice header record.
pub static HEADER_LAYOUT: RecordLayout = RecordLayout {
    kind: "header",
    columns: &[
        ColumnSpec::left("TYPE", 1).with_default(HEADER_TYPE),
        ColumnSpec::left("SGTXT", 50),
        ColumnSpec::left("DOCDATE", 8),
        ColumnSpec::left("BASELINEDATE", 8),
        ColumnSpec::left("XBLNR", 16),
        ColumnSpec::left("VENDORTYPE", 4).with_default("KRED"),
        ColumnSpec::left("LIFNR", 10),
        ColumnSpec::right("AMOUNT", 16),
        ColumnSpec::left("BUSCS", 1).with_default("R"),
        ColumnSpec::left("ZLSCH", 1),
        ColumnSpec::left("UZAWE", 2),
        ColumnSpec::left("ZLSPR", 1),
        ColumnSpec::left("REGUL", 1),
    ],
};

/// Invoice line item record.
pub static LINE_LAYOUT: RecordLayout = RecordLayout {
    kind: "line",
    columns: &[
        ColumnSpec::left("TYPE", 1).with_default(CONTINUATION_LINE_MARKER),
        ColumnSpec::left("SAKNR", 10),
        ColumnSpec::left("KOSTL", 10),
        ColumnSpec::right("AMOUNT", 16),
        ColumnSpec::left("SHKZG", 1).with_default("S"),
        ColumnSpec::left("SGTXT", 50),
    ],
};
