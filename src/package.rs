//! Package assembly: rows in, finished archive bytes out.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use csv::{StringRecord, Trim};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ConvertOptions;
use crate::error::ConvertError;
use crate::media::{localize_prompt, MediaFetcher};
use crate::models::{ItemRef, MediaAsset, ResourceDescriptor};
use crate::naming::{random_suffix, NameRegistry};
use crate::normalize::normalize;
use crate::qti::{build_assessment_item, build_assessment_test, build_manifest};

/// Archive path of the manifest document, fixed by the package layout.
pub const MANIFEST_HREF: &str = "imsmanifest.xml";
/// Archive path of the test document, fixed by the package layout.
pub const TEST_HREF: &str = "assessmentTest.xml";

/// One generated item, pinned to the archive path the other documents use.
struct GeneratedItem {
    identifier: String,
    href: String,
    xml: String,
}

/// Convert a CSV string into a complete package.
///
/// A leading UTF-8 byte-order mark is tolerated. Tokenization is headerless,
/// whitespace-trimmed and tolerant of ragged rows; empty lines produce no
/// rows.
pub fn convert_csv_str(csv: &str, options: &ConvertOptions) -> Result<Vec<u8>, ConvertError> {
    let csv = csv.strip_prefix('\u{feff}').unwrap_or(csv);
    let rows = parse_rows(csv.as_bytes(), options.delimiter_byte())?;
    assemble(&rows, options)
}

/// Read a CSV file and convert it into a complete package.
pub fn convert_csv_file(path: &Path, options: &ConvertOptions) -> Result<Vec<u8>, ConvertError> {
    let content = fs::read_to_string(path)?;
    convert_csv_str(&content, options)
}

fn parse_rows(input: &[u8], delimiter: u8) -> Result<Vec<StringRecord>, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Assemble a package from already-tokenized rows.
///
/// Rows are processed strictly in input order: the 1-based ordinal feeds
/// placeholder-identifier synthesis, and the test and manifest documents
/// enumerate items in the order they were generated. Fails with
/// [`ConvertError::EmptyInput`] when `rows` is empty and with
/// [`ConvertError::NoAcceptedRows`] when every row is skipped; a failed
/// media fetch is row-local and never aborts the run.
pub fn assemble(rows: &[StringRecord], options: &ConvertOptions) -> Result<Vec<u8>, ConvertError> {
    if rows.is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    let test_id = options
        .test_id
        .clone()
        .unwrap_or_else(|| format!("TEST-{}", random_suffix(8).to_uppercase()));

    let fetcher = if options.download_images {
        Some(MediaFetcher::new()?)
    } else {
        None
    };

    let mut identifiers = NameRegistry::default();
    let mut media_names = NameRegistry::default();
    let mut items: Vec<GeneratedItem> = Vec::new();
    let mut item_refs: Vec<ItemRef> = Vec::new();
    let mut assets: Vec<MediaAsset> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let Some(mut record) = normalize(row, index + 1) else {
            continue;
        };
        record.identifier = identifiers.reserve(&record.identifier, "");

        if let Some(fetcher) = &fetcher {
            let localized = localize_prompt(
                &record.prompt_html,
                &record.identifier,
                &mut media_names,
                &options.media_dir,
                fetcher,
            );
            record.prompt_html = localized.markup;
            if let Some(asset) = localized.asset {
                assets.push(asset);
            }
        }

        let xml = build_assessment_item(&record, options.shuffle, options.max_choices)?;
        let href = format!("{}.xml", record.identifier);
        item_refs.push(ItemRef {
            ref_id: format!("REF-{}", record.identifier),
            href: href.clone(),
        });
        items.push(GeneratedItem {
            identifier: record.identifier,
            href,
            xml,
        });
    }

    if items.is_empty() {
        return Err(ConvertError::NoAcceptedRows);
    }

    let test_xml = build_assessment_test(
        &test_id,
        &options.title,
        &item_refs,
        options.navigation_mode,
        options.submission_mode,
    )?;

    let test_resource = ResourceDescriptor {
        identifier: format!("RES-{test_id}"),
        href: TEST_HREF.to_string(),
    };
    let item_resources: Vec<ResourceDescriptor> = items
        .iter()
        .map(|item| ResourceDescriptor {
            identifier: format!("RES-{}", item.identifier),
            href: item.href.clone(),
        })
        .collect();
    let manifest_id = format!("MANIFEST-{}", random_suffix(8).to_lowercase());
    let manifest_xml = build_manifest(&manifest_id, &test_resource, &item_resources)?;

    write_archive(&manifest_xml, &test_xml, &items, &assets)
}

/// Stream every document and asset into the archive.
///
/// Entry paths equal the hrefs used in the manifest and test documents; that
/// equality is the package's core correctness invariant, so both come from
/// the same accumulated values.
fn write_archive(
    manifest_xml: &str,
    test_xml: &str,
    items: &[GeneratedItem],
    assets: &[MediaAsset],
) -> Result<Vec<u8>, ConvertError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let entry_options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_HREF, entry_options)?;
    zip.write_all(manifest_xml.as_bytes())?;
    zip.start_file(TEST_HREF, entry_options)?;
    zip.write_all(test_xml.as_bytes())?;
    for item in items {
        zip.start_file(item.href.as_str(), entry_options)?;
        zip.write_all(item.xml.as_bytes())?;
    }
    for asset in assets {
        zip.start_file(asset.path.as_str(), entry_options)?;
        zip.write_all(&asset.bytes)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_package(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(bytes)).expect("package should be a readable archive")
    }

    fn entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut file = archive
            .by_name(name)
            .unwrap_or_else(|_| panic!("archive should contain {name}"));
        let mut content = String::new();
        file.read_to_string(&mut content)
            .expect("entry should be valid UTF-8");
        content
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            convert_csv_str("", &ConvertOptions::default()),
            Err(ConvertError::EmptyInput)
        ));
    }

    #[test]
    fn rejects_input_where_every_row_is_skipped() {
        let csv = "TF;Q1;1;<p>x</p>;A\nESSAY;Q2;1;<p>y</p>;B\n";
        assert!(matches!(
            convert_csv_str(csv, &ConvertOptions::default()),
            Err(ConvertError::NoAcceptedRows)
        ));
    }

    #[test]
    fn packages_a_single_question_end_to_end() {
        let options = ConvertOptions {
            test_id: Some("TEST-1".into()),
            ..ConvertOptions::default()
        };
        let bytes =
            convert_csv_str("MC;Q1;10;<p>2+2=?</p>;B;;;;;\n", &options).expect("conversion");
        let mut archive = read_package(bytes);

        let item = entry(&mut archive, "Q1.xml");
        assert!(item.contains("<value>B</value>"));
        assert!(item.contains("<value>10</value>"));
        assert!(item.contains("<p>2+2=?</p>"));

        let test = entry(&mut archive, TEST_HREF);
        assert!(test.contains(r#"<assessmentItemRef identifier="REF-Q1" href="Q1.xml"/>"#));
        assert!(test.contains(r#"identifier="TEST-1""#));

        let manifest = entry(&mut archive, MANIFEST_HREF);
        assert!(manifest.contains(r#"identifier="RES-Q1""#));
        assert!(manifest.contains(r#"identifier="RES-TEST-1""#));
        assert!(manifest.contains(r#"<file href="Q1.xml"/>"#));
    }

    #[test]
    fn skipped_rows_do_not_perturb_placeholder_numbering() {
        let csv = "TF;;1;<p>skipped</p>;A\nMC;;5;<p>kept</p>;C\n";
        let bytes = convert_csv_str(csv, &ConvertOptions::default()).expect("conversion");
        let mut archive = read_package(bytes);

        let item = entry(&mut archive, "Q0002.xml");
        assert!(item.contains("<value>C</value>"));
        assert_eq!(
            archive.len(),
            3,
            "exactly one item plus manifest and test expected"
        );
    }

    #[test]
    fn duplicate_identifiers_are_made_unique() {
        let csv = "MC;Q1;1;<p>first</p>;A\nMC;Q1;2;<p>second</p>;B\n";
        let bytes = convert_csv_str(csv, &ConvertOptions::default()).expect("conversion");
        let mut archive = read_package(bytes);

        assert!(entry(&mut archive, "Q1.xml").contains("<p>first</p>"));
        assert!(entry(&mut archive, "Q1_1.xml").contains("<p>second</p>"));

        let manifest = entry(&mut archive, MANIFEST_HREF);
        assert!(manifest.contains(r#"identifier="RES-Q1""#));
        assert!(manifest.contains(r#"identifier="RES-Q1_1""#));
    }

    #[test]
    fn every_referenced_href_is_present_in_the_archive() {
        let csv = "MC;Q1;1;<p>a</p>;A\nMC;;2;<p>b</p>;B\nMC;Alpha;3;<p>c</p>;C\n";
        let bytes = convert_csv_str(csv, &ConvertOptions::default()).expect("conversion");
        let mut archive = read_package(bytes);

        let manifest = entry(&mut archive, MANIFEST_HREF);
        let test = entry(&mut archive, TEST_HREF);

        let href_pattern = regex::Regex::new(r#"href="([^"]+)""#).expect("valid href regex");
        let mut referenced = BTreeSet::new();
        for document in [manifest.as_str(), test.as_str()] {
            for caps in href_pattern.captures_iter(document) {
                referenced.insert(caps[1].to_string());
            }
        }

        assert!(referenced.contains("Q0002.xml"));
        for href in referenced {
            assert!(
                archive.by_name(&href).is_ok(),
                "referenced entry {href} missing from archive"
            );
        }
    }

    #[test]
    fn manifest_lists_exactly_one_resource_per_item_plus_the_test() {
        let csv = "MC;Q1;1;<p>a</p>;A\nMC;Q2;2;<p>b</p>;B\n";
        let bytes = convert_csv_str(csv, &ConvertOptions::default()).expect("conversion");
        let mut archive = read_package(bytes);

        let manifest = entry(&mut archive, MANIFEST_HREF);
        assert_eq!(manifest.matches("<resource ").count(), 3);
        assert_eq!(manifest.matches("imsqti_test_xmlv2p1").count(), 1);
        assert_eq!(manifest.matches("imsqti_item_xmlv2p1").count(), 2);
    }

    #[test]
    fn honours_a_custom_delimiter() {
        let options = ConvertOptions {
            delimiter: ",".into(),
            ..ConvertOptions::default()
        };
        let bytes = convert_csv_str("MC,Q9,4,<p>x</p>,D\n", &options).expect("conversion");
        let mut archive = read_package(bytes);
        assert!(entry(&mut archive, "Q9.xml").contains("<value>D</value>"));
    }

    #[test]
    fn strips_a_leading_byte_order_mark() {
        let csv = "\u{feff}MC;Q1;1;<p>x</p>;A\n";
        let bytes = convert_csv_str(csv, &ConvertOptions::default()).expect("conversion");
        let mut archive = read_package(bytes);
        assert!(archive.by_name("Q1.xml").is_ok());
    }

    #[test]
    fn auto_generates_test_id_with_prefix() {
        let bytes = convert_csv_str("MC;Q1;1;<p>x</p>;A\n", &ConvertOptions::default())
            .expect("conversion");
        let mut archive = read_package(bytes);
        let test = entry(&mut archive, TEST_HREF);
        let manifest = entry(&mut archive, MANIFEST_HREF);
        assert!(test.contains(r#"identifier="TEST-"#));
        assert!(manifest.contains(r#"identifier="MANIFEST-"#));
    }

    #[test]
    fn reads_input_from_a_file() {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let input = temp.path().join("questions.csv");
        fs::write(&input, "MC;Q1;1;<p>x</p>;A\n").expect("failed to write input");

        let bytes = convert_csv_file(&input, &ConvertOptions::default()).expect("conversion");
        let mut archive = read_package(bytes);
        assert!(archive.by_name("Q1.xml").is_ok());
    }

    #[test]
    fn missing_input_file_surfaces_an_io_error() {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let missing = temp.path().join("absent.csv");
        assert!(matches!(
            convert_csv_file(&missing, &ConvertOptions::default()),
            Err(ConvertError::Io(_))
        ));
    }
}
