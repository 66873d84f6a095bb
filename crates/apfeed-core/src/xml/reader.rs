//! Builds an [`XmlDocument`] from quick-xml pull events.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::trace;

use super::{XmlDocument, XmlElement};
use crate::error::XmlError;

/// Parse `input` into a document tree, enforcing well-formedness.
pub fn parse_document(input: &str) -> Result<XmlDocument, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Malformed {
            position: reader.error_position(),
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots(name));
                }
                stack.push(XmlElement::new(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                close_element(XmlElement::new(name), &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| XmlError::Malformed {
                    position: reader.buffer_position(),
                    message: "end tag without matching start tag".to_string(),
                })?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|err| XmlError::Malformed {
                    position: reader.buffer_position(),
                    message: err.to_string(),
                })?;
                match stack.last_mut() {
                    Some(current) => current.push_text(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlError::StrayText),
                }
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                match stack.last_mut() {
                    Some(current) => current.push_text(&String::from_utf8_lossy(&raw)),
                    None => return Err(XmlError::StrayText),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry nothing the extractor reads.
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name().to_string()));
    }

    let root = root.ok_or(XmlError::Empty)?;
    trace!(root = root.name(), "parsed XML document");
    Ok(XmlDocument::from_root(root))
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::MultipleRoots(element.name().to_string()));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <payment_data xmlns="http://com/exlibris/repository/acq/invoice/xmlbeans">
              <invoice_list>
                <invoice>
                  <invoice_number>INV&amp;1</invoice_number>
                  <!-- comment -->
                  <invoice_amount><sum>100.00</sum></invoice_amount>
                  <empty/>
                </invoice>
              </invoice_list>
            </payment_data>"#;

        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.root().name(), "payment_data");

        let invoices = doc.elements_named("invoice");
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].unique_field("invoice_number"), Ok("INV&1"));
        assert_eq!(invoices[0].unique_field("invoice_amount/sum"), Ok("100.00"));
        assert_eq!(invoices[0].unique_field("empty"), Ok(""));
    }

    #[test]
    fn test_parse_prefixed_names_use_local_name() {
        let xml = r#"<ns:root xmlns:ns="urn:x"><ns:invoice><ns:a>1</ns:a></ns:invoice></ns:root>"#;
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.elements_named("invoice")[0].unique_field("a"), Ok("1"));
    }

    #[test]
    fn test_parse_cdata() {
        let doc = parse_document("<r><t><![CDATA[a < b]]></t></r>").unwrap();
        assert_eq!(doc.root().unique_field("t"), Ok("a < b"));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let result = parse_document("<invoice><a></b></invoice>");
        assert!(matches!(result, Err(XmlError::Malformed { .. })));
    }

    #[test]
    fn test_unclosed_element() {
        let result = parse_document("<invoice><a>1</a>");
        assert!(matches!(
            result,
            Err(XmlError::Unclosed(_)) | Err(XmlError::Malformed { .. })
        ));
    }

    #[test]
    fn test_not_xml() {
        assert!(matches!(parse_document("this is not xml"), Err(XmlError::StrayText)));
        assert!(matches!(parse_document("   "), Err(XmlError::Empty)));
    }

    #[test]
    fn test_multiple_roots() {
        let result = parse_document("<a/><b/>");
        assert!(matches!(result, Err(XmlError::MultipleRoots(name)) if name == "b"));
    }
}
