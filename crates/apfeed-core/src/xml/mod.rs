//! In-memory XML document tree for invoice batch exports.
//!
//! The tree keeps only what the extractor needs: element local names, their
//! concatenated text content and child elements in document order.

mod reader;

pub use reader::parse_document;

use crate::error::{FieldError, XmlError};

/// A parsed, well-formed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Parse a document from its textual form.
    pub fn parse(input: &str) -> Result<Self, XmlError> {
        parse_document(input)
    }

    pub(crate) fn from_root(root: XmlElement) -> Self {
        Self { root }
    }

    /// The document element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// All elements with the given local name, including the root itself.
    pub fn elements_named(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        if self.root.name == name {
            found.push(&self.root);
        }
        found.extend(self.root.descendants(name));
        found
    }
}

/// One element of the document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Append character data.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }

    pub(crate) fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Local name (namespace prefix removed).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first list of descendants with the given name.
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    /// Resolve a slash-separated relative path of child names.
    pub fn find_all(&self, path: &str) -> Vec<&XmlElement> {
        let mut current: Vec<&XmlElement> = vec![self];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|el| el.children.iter().filter(move |c| c.name == step))
                .collect();
        }
        current
    }

    /// Text of the single element at `path`.
    ///
    /// Absence and duplication are reported as distinct [`FieldError`]s so
    /// callers decide explicitly whether to skip or reject.
    pub fn unique_field(&self, path: &str) -> Result<&str, FieldError> {
        let matches = self.find_all(path);
        match matches.as_slice() {
            [] => Err(FieldError::NotFound {
                path: path.to_string(),
            }),
            [single] => Ok(single.text()),
            _ => Err(FieldError::Ambiguous {
                path: path.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Like [`unique_field`](Self::unique_field) but treats absence as `None`.
    pub fn optional_field(&self, path: &str) -> Result<Option<&str>, FieldError> {
        match self.unique_field(path) {
            Ok(value) => Ok(Some(value)),
            Err(FieldError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
