//! Free-text annotation derived from purchase-order line info.

use std::borrow::Cow;

use quick_xml::escape::{resolve_html5_entity, unescape_with};

/// Characters of the PO line number kept in the annotation.
pub const PO_LINE_WIDTH: usize = 12;

/// Characters of the bibliographic record id kept in the annotation.
pub const MMS_ID_WIDTH: usize = 18;

/// Title used when the PO line has none.
pub const MISSING_TITLE: &str = "\u{201e}";

/// Raw fields of a `po_line_info` element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoLineInfo<'a> {
    pub po_line_number: Option<&'a str>,
    pub mms_record_id: Option<&'a str>,
    pub title: Option<&'a str>,
}

/// `<po line> <mms id> <title>` with both ids fitted to fixed widths.
pub fn po_annotation(info: &PoLineInfo<'_>) -> String {
    let po_line = fit(info.po_line_number.unwrap_or_default(), PO_LINE_WIDTH);
    let mms_id = fit(info.mms_record_id.unwrap_or_default(), MMS_ID_WIDTH);
    let title = match info.title {
        Some(title) => decode_html_entities(title),
        None => Cow::Borrowed(MISSING_TITLE),
    };
    format!("{po_line} {mms_id} {title}")
}

/// Decode HTML named and numeric entities; text that is not valid entity
/// markup (a bare `&`, for example) is returned unchanged.
pub fn decode_html_entities(raw: &str) -> Cow<'_, str> {
    unescape_with(raw, resolve_html5_entity).unwrap_or(Cow::Borrowed(raw))
}

fn fit(value: &str, width: usize) -> String {
    let cut: String = value.chars().take(width).collect();
    format!("{:<width$}", cut, width = width)
}
