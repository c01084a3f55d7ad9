//! Generators for the three QTI document kinds.
//!
//! Each generator is a pure function from validated data to XML text, built
//! on a structured event writer so element nesting and attribute escaping are
//! handled by construction rather than string interpolation. None of them
//! validate cross-references; the package assembler upholds referential
//! integrity by feeding the same identifiers and hrefs into all three.

mod item;
mod manifest;

pub use item::build_assessment_item;
pub use manifest::build_manifest;
pub use test::build_assessment_test;

use std::fmt::Display;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::ConvertError;

/// QTI 2.1 namespace shared by item and test documents.
pub const QTI_NS: &str = "http://www.imsglobal.org/xsd/imsqti_v2p1";
/// IMS Content Packaging namespace of the manifest document.
pub const IMSCP_NS: &str = "http://www.imsglobal.org/xsd/imscp_v1p1";
/// XML Schema instance namespace used for schema locations.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub(crate) type XmlWriter = Writer<Vec<u8>>;

pub(crate) fn xml_err(err: impl Display) -> ConvertError {
    ConvertError::Xml(err.to_string())
}

/// Fresh two-space-indented writer with the XML declaration already emitted.
pub(crate) fn document_writer() -> Result<XmlWriter, ConvertError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;
    Ok(writer)
}

pub(crate) fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), ConvertError> {
    writer.write_event(event).map_err(xml_err)
}

/// Build a start tag carrying the given attributes in order.
pub(crate) fn element<'a>(
    name: &'static str,
    attributes: &[(&'static str, &'a str)],
) -> BytesStart<'a> {
    let mut elem = BytesStart::new(name);
    for (key, value) in attributes {
        elem.push_attribute((*key, *value));
    }
    elem
}

/// Write `<name>text</name>` with the text content escaped.
pub(crate) fn text_element(
    writer: &mut XmlWriter,
    name: &'static str,
    text: &str,
) -> Result<(), ConvertError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

/// Consume the writer into the finished document text.
pub(crate) fn into_document(writer: XmlWriter) -> Result<String, ConvertError> {
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(xml_err)
}
