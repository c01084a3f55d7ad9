//! Content-manifest document generator.

use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::ConvertError;
use crate::models::ResourceDescriptor;
use crate::qti::{document_writer, element, into_document, write, XmlWriter, IMSCP_NS, QTI_NS, XSI_NS};

const TEST_RESOURCE_TYPE: &str = "imsqti_test_xmlv2p1";
const ITEM_RESOURCE_TYPE: &str = "imsqti_item_xmlv2p1";

/// Emit the manifest declaring the test resource and one resource per item.
///
/// Each resource carries exactly one `file` entry pointing at its own href;
/// resource identifiers are unique because record identifiers already are.
pub fn build_manifest(
    manifest_id: &str,
    test_resource: &ResourceDescriptor,
    item_resources: &[ResourceDescriptor],
) -> Result<String, ConvertError> {
    let mut writer = document_writer()?;

    let schema_location = format!(
        "{IMSCP_NS} http://www.imsglobal.org/xsd/imscp_v1p1.xsd \
         {QTI_NS} http://www.imsglobal.org/xsd/imsqti_v2p1.xsd"
    );

    write(
        &mut writer,
        Event::Start(element(
            "manifest",
            &[
                ("xmlns", IMSCP_NS),
                ("xmlns:imsqti", QTI_NS),
                ("xmlns:xsi", XSI_NS),
                ("identifier", manifest_id),
                ("xsi:schemaLocation", &schema_location),
            ],
        )),
    )?;

    write(&mut writer, Event::Empty(BytesStart::new("organizations")))?;
    write(&mut writer, Event::Start(BytesStart::new("resources")))?;

    write_resource(&mut writer, test_resource, TEST_RESOURCE_TYPE)?;
    for resource in item_resources {
        write_resource(&mut writer, resource, ITEM_RESOURCE_TYPE)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("resources")))?;
    write(&mut writer, Event::End(BytesEnd::new("manifest")))?;
    into_document(writer)
}

fn write_resource(
    writer: &mut XmlWriter,
    resource: &ResourceDescriptor,
    resource_type: &'static str,
) -> Result<(), ConvertError> {
    write(
        writer,
        Event::Start(element(
            "resource",
            &[
                ("identifier", &resource.identifier),
                ("type", resource_type),
                ("href", &resource.href),
            ],
        )),
    )?;
    write(
        writer,
        Event::Empty(element("file", &[("href", &resource.href)])),
    )?;
    write(writer, Event::End(BytesEnd::new("resource")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_resource() -> ResourceDescriptor {
        ResourceDescriptor {
            identifier: "RES-TEST-1".into(),
            href: "assessmentTest.xml".into(),
        }
    }

    fn item_resources() -> Vec<ResourceDescriptor> {
        vec![
            ResourceDescriptor {
                identifier: "RES-Q1".into(),
                href: "Q1.xml".into(),
            },
            ResourceDescriptor {
                identifier: "RES-Q2".into(),
                href: "Q2.xml".into(),
            },
        ]
    }

    #[test]
    fn distinguishes_test_and_item_resource_types() {
        let xml = build_manifest("MANIFEST-abc", &test_resource(), &item_resources())
            .expect("manifest should serialize");

        assert!(xml.contains(
            r#"<resource identifier="RES-TEST-1" type="imsqti_test_xmlv2p1" href="assessmentTest.xml">"#
        ));
        assert!(xml.contains(
            r#"<resource identifier="RES-Q1" type="imsqti_item_xmlv2p1" href="Q1.xml">"#
        ));
        assert_eq!(xml.matches("imsqti_item_xmlv2p1").count(), 2);
    }

    #[test]
    fn pairs_every_resource_with_its_own_file_entry() {
        let xml = build_manifest("MANIFEST-abc", &test_resource(), &item_resources())
            .expect("manifest should serialize");

        for href in ["assessmentTest.xml", "Q1.xml", "Q2.xml"] {
            assert!(xml.contains(&format!(r#"<file href="{href}"/>"#)));
        }
    }

    #[test]
    fn declares_namespaces_and_schema_location() {
        let xml = build_manifest("MANIFEST-abc", &test_resource(), &[])
            .expect("manifest should serialize");

        assert!(xml.contains(r#"identifier="MANIFEST-abc""#));
        assert!(xml.contains(r#"xmlns="http://www.imsglobal.org/xsd/imscp_v1p1""#));
        assert!(xml.contains(r#"xmlns:imsqti="http://www.imsglobal.org/xsd/imsqti_v2p1""#));
        assert!(xml.contains("imscp_v1p1.xsd"));
        assert!(xml.contains("<organizations/>"));
    }
}
