//! Categorized error collection and the end-of-run report.

use std::collections::BTreeMap;
use std::fmt;

/// Category under which an error is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Source document not well-formed.
    XmlParse,
    /// Invoice rejected by a business rule.
    InvoiceValidation,
    /// Job file could not be read or moved.
    Workflow,
}

impl ErrorCategory {
    /// Short machine-readable key.
    pub fn key(&self) -> &'static str {
        match self {
            ErrorCategory::XmlParse => "xml-parse",
            ErrorCategory::InvoiceValidation => "invoice-validation",
            ErrorCategory::Workflow => "workflow",
        }
    }

    /// Heading used in the report.
    pub fn heading(&self) -> &'static str {
        match self {
            ErrorCategory::XmlParse => "XML parse errors",
            ErrorCategory::InvoiceValidation => "Invoice validation errors",
            ErrorCategory::Workflow => "File handling errors",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors of one run, grouped by category; messages keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog {
    entries: BTreeMap<ErrorCategory, Vec<String>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one message.
    pub fn record(&mut self, category: ErrorCategory, message: impl Into<String>) {
        self.entries.entry(category).or_default().push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        self.entries.values().any(|messages| !messages.is_empty())
    }

    /// Messages recorded under a category.
    pub fn messages(&self, category: ErrorCategory) -> &[String] {
        self.entries.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of recorded messages.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable report; empty when nothing was recorded.
    pub fn render_report(&self) -> String {
        self.entries
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(category, messages)| {
                let mut section = format!("{} ({})\n", category.heading(), messages.len());
                for message in messages {
                    section.push_str("  * ");
                    section.push_str(message);
                    section.push('\n');
                }
                section
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_log() {
        let log = ErrorLog::new();
        assert!(!log.has_errors());
        assert!(log.is_empty());
        assert_eq!(log.render_report(), "");
        assert!(log.messages(ErrorCategory::Workflow).is_empty());
    }

    #[test]
    fn test_report_groups_by_category() {
        let mut log = ErrorLog::new();
        log.record(ErrorCategory::InvoiceValidation, "invoice A: credit card vendor (CREDITCARD)");
        log.record(ErrorCategory::XmlParse, "bad.xml: document has no root element");
        log.record(ErrorCategory::InvoiceValidation, "invoice B: no billable lines");

        assert!(log.has_errors());
        assert_eq!(log.len(), 3);
        assert_eq!(
            log.render_report(),
            "XML parse errors (1)\n\
             \x20 * bad.xml: document has no root element\n\
             \n\
             Invoice validation errors (2)\n\
             \x20 * invoice A: credit card vendor (CREDITCARD)\n\
             \x20 * invoice B: no billable lines\n"
        );
    }

    #[test]
    fn test_category_keys() {
        assert_eq!(ErrorCategory::XmlParse.to_string(), "xml-parse");
        assert_eq!(ErrorCategory::InvoiceValidation.key(), "invoice-validation");
    }
}
