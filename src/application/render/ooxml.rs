//! Office Open XML packaging shared by the word-processing and slide-deck
//! renderers.

use std::{
    borrow::Cow,
    io::{Cursor, Write},
};

use zip::{CompressionMethod, DateTime, ZipWriter, write::SimpleFileOptions};

use super::types::RenderError;

pub const XML_DECLARATION: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

/// Drop characters XML 1.0 cannot carry.
pub fn legal_xml_chars(text: &str) -> Cow<'_, str> {
    let legal = |ch: char| matches!(ch, '\t' | '\n' | '\r') || ch >= ' ';
    if text.chars().all(legal) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&ch| legal(ch)).collect())
    }
}

/// Escape text for element content and attribute values.
pub fn xml_text(text: &str) -> Cow<'_, str> {
    match legal_xml_chars(text) {
        Cow::Borrowed(text) => quick_xml::escape::escape(text),
        Cow::Owned(text) => Cow::Owned(quick_xml::escape::escape(text.as_str()).into_owned()),
    }
}

/// One relationship entry of a `.rels` part.
pub struct Relationship<'a> {
    pub id: &'a str,
    pub kind: &'a str,
    pub target: &'a str,
}

pub fn relationships(entries: &[Relationship<'_>]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for entry in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            entry.id,
            entry.kind,
            xml_text(entry.target)
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// `[Content_Types].xml` with the package defaults plus one override per
/// `(part, content type)` pair. Part names start with `/`.
pub fn content_types(overrides: &[(&str, &str)]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    ));
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// `_rels/.rels` pointing at the main part and the two property parts.
pub fn package_relationships(main_part: &str) -> String {
    relationships(&[
        Relationship {
            id: "rId1",
            kind: REL_OFFICE_DOCUMENT,
            target: main_part,
        },
        Relationship {
            id: "rId2",
            kind: REL_CORE_PROPERTIES,
            target: "docProps/core.xml",
        },
        Relationship {
            id: "rId3",
            kind: REL_EXTENDED_PROPERTIES,
            target: "docProps/app.xml",
        },
    ])
}

/// `docProps/core.xml`. No timestamps, so identical input yields identical
/// bytes.
pub fn core_properties(title: &str) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title><dc:creator>studydoc</dc:creator>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECLARATION,
        title = xml_text(title)
    )
}

pub fn app_properties(application: &str) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>{application}</Application></Properties>"
        ),
        decl = XML_DECLARATION,
        application = xml_text(application)
    )
}

/// An OOXML package assembled in memory; zipped by [`Package::into_bytes`].
#[derive(Debug, Default)]
pub struct Package {
    parts: Vec<(String, String)>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, xml: impl Into<String>) {
        self.parts.push((name.into(), xml.into()));
    }

    /// Zip every part in insertion order with a fixed timestamp.
    pub fn into_bytes(self) -> Result<Vec<u8>, RenderError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for (name, xml) in self.parts {
            zip.start_file(name, options)?;
            zip.write_all(xml.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

#[cfg(test)]
impl Package {
    pub(crate) fn part(&self, name: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, xml)| xml.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn escapes_markup_and_drops_control_characters() {
        assert_eq!(xml_text("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(xml_text("bell\u{7}tab\t"), "belltab\t");
    }

    #[test]
    fn package_round_trips_through_zip() {
        let mut package = Package::new();
        package.add("[Content_Types].xml", "<Types/>");
        package.add("word/document.xml", "<w:document/>");
        let bytes = package.into_bytes().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut body = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<w:document/>");
    }

    #[test]
    fn identical_packages_produce_identical_bytes() {
        let build = || {
            let mut package = Package::new();
            package.add("a.xml", "<a/>");
            package.into_bytes().unwrap()
        };
        assert_eq!(build(), build());
    }
}
