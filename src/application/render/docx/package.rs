//! WordprocessingML package parts around a composed body.

use crate::application::registry::palette;

use super::super::{
    ooxml::{self, Package, Relationship, XML_DECLARATION, xml_text},
    types::{PageSize, RenderError},
};

pub(crate) const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const MAIN_PART: &str = "word/document.xml";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
const REL_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

/// Page margin on every side, in twips (2 cm).
pub(crate) const MARGIN_TWIPS: u32 = 1134;

/// Text block width for a page size, in twips.
pub(crate) fn content_width(page_size: PageSize) -> u32 {
    page_size.twips().0 - 2 * MARGIN_TWIPS
}

/// A composed word-processing document, ready to be packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxDocument {
    pub title: String,
    /// Block-level content of `w:body`, without the section properties.
    pub body: String,
    pub page_size: PageSize,
}

impl DocxDocument {
    /// Full `word/document.xml`.
    pub fn document_xml(&self) -> String {
        let (width, height) = self.page_size.twips();
        format!(
            concat!(
                "{decl}",
                r#"<w:document xmlns:w="{w}" xmlns:r="{r}"><w:body>{body}"#,
                r#"<w:sectPr><w:footerReference w:type="default" r:id="rId3"/>"#,
                r#"<w:pgSz w:w="{width}" w:h="{height}"/>"#,
                r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="567" w:footer="567" w:gutter="0"/>"#,
                "</w:sectPr></w:body></w:document>"
            ),
            decl = XML_DECLARATION,
            w = NS_W,
            r = NS_R,
            body = self.body,
            width = width,
            height = height,
            m = MARGIN_TWIPS,
        )
    }

    pub fn into_package(self) -> Package {
        let mut package = Package::new();
        package.add(
            "[Content_Types].xml",
            ooxml::content_types(&[
                (
                    "/word/document.xml",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
                ),
                (
                    "/word/styles.xml",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
                ),
                (
                    "/word/settings.xml",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml",
                ),
                (
                    "/word/footer1.xml",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml",
                ),
            ]),
        );
        package.add("_rels/.rels", ooxml::package_relationships(MAIN_PART));
        package.add("docProps/core.xml", ooxml::core_properties(&self.title));
        package.add("docProps/app.xml", ooxml::app_properties("studydoc"));
        package.add(MAIN_PART, self.document_xml());
        package.add(
            "word/_rels/document.xml.rels",
            ooxml::relationships(&[
                Relationship {
                    id: "rId1",
                    kind: REL_STYLES,
                    target: "styles.xml",
                },
                Relationship {
                    id: "rId2",
                    kind: REL_SETTINGS,
                    target: "settings.xml",
                },
                Relationship {
                    id: "rId3",
                    kind: REL_FOOTER,
                    target: "footer1.xml",
                },
            ]),
        );
        package.add("word/styles.xml", styles_xml());
        package.add(
            "word/settings.xml",
            format!(
                r#"{XML_DECLARATION}<w:settings xmlns:w="{NS_W}"><w:defaultTabStop w:val="567"/><w:characterSpacingControl w:val="doNotCompress"/></w:settings>"#
            ),
        );
        package.add("word/footer1.xml", footer_xml(&self.title));
        package
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, RenderError> {
        self.into_package().into_bytes()
    }
}

/// Centered footer: `title · Page n of N`.
fn footer_xml(title: &str) -> String {
    let run_props = format!(
        r#"<w:rPr><w:color w:val="{}"/><w:sz w:val="16"/></w:rPr>"#,
        palette::MUTED.hex()
    );
    let text = |value: &str| {
        format!(r#"<w:r>{run_props}<w:t xml:space="preserve">{value}</w:t></w:r>"#)
    };
    let field = |instruction: &str| {
        format!(
            r#"<w:fldSimple w:instr=" {instruction} "><w:r>{run_props}<w:t>1</w:t></w:r></w:fldSimple>"#
        )
    };

    format!(
        concat!(
            "{decl}",
            r#"<w:ftr xmlns:w="{w}"><w:p><w:pPr><w:jc w:val="center"/></w:pPr>"#,
            "{title}{page}{of}{pages}",
            "</w:p></w:ftr>"
        ),
        decl = XML_DECLARATION,
        w = NS_W,
        title = text(&format!("{} \u{00B7} Page ", xml_text(title))),
        page = field("PAGE"),
        of = text(" of "),
        pages = field("NUMPAGES"),
    )
}

fn styles_xml() -> String {
    let ink = palette::INK.hex();
    let muted = palette::MUTED.hex();
    format!(
        concat!(
            "{decl}",
            r#"<w:styles xmlns:w="{w}">"#,
            r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
            r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/>"#,
            r#"<w:color w:val="{ink}"/><w:sz w:val="21"/><w:szCs w:val="21"/><w:lang w:val="en-US"/>"#,
            r#"</w:rPr></w:rPrDefault><w:pPrDefault><w:pPr>"#,
            r#"<w:spacing w:after="120" w:line="276" w:lineRule="auto"/>"#,
            r#"</w:pPr></w:pPrDefault></w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:spacing w:after="160"/></w:pPr><w:rPr><w:b/><w:color w:val="{ink}"/><w:sz w:val="52"/><w:szCs w:val="52"/></w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Subtitle"><w:name w:val="Subtitle"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:color w:val="{muted}"/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:keepNext/><w:spacing w:before="360" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/><w:szCs w:val="32"/></w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:style>"#,
            r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/>"#,
            r#"<w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="40" w:type="dxa"/><w:left w:w="100" w:type="dxa"/>"#,
            r#"<w:bottom w:w="40" w:type="dxa"/><w:right w:w="100" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>"#,
            "</w:styles>"
        ),
        decl = XML_DECLARATION,
        w = NS_W,
        ink = ink,
        muted = muted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_xml_carries_page_size_and_footer_reference() {
        let document = DocxDocument {
            title: "Plan".to_string(),
            body: "<w:p/>".to_string(),
            page_size: PageSize::Letter,
        };
        let xml = document.document_xml();
        assert!(xml.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
        assert!(xml.contains(r#"<w:footerReference w:type="default" r:id="rId3"/>"#));
        assert!(xml.contains("<w:body><w:p/><w:sectPr>"));
    }

    #[test]
    fn footer_escapes_title_and_counts_pages() {
        let footer = footer_xml("R&D plan");
        assert!(footer.contains("R&amp;D plan \u{00B7} Page "));
        assert!(footer.contains(r#"w:instr=" NUMPAGES ""#));
    }

    #[test]
    fn package_lists_every_part() {
        let package = DocxDocument {
            title: "Plan".to_string(),
            body: String::new(),
            page_size: PageSize::A4,
        }
        .into_package();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/footer1.xml",
        ] {
            assert!(package.part(part).is_some(), "missing {part}");
        }
    }
}
