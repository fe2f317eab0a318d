//! PresentationML parts for a built deck.

use crate::application::registry::{Accent, palette};

use super::{
    super::{
        ooxml::{self, Package, Relationship, XML_DECLARATION, xml_text},
        types::RenderError,
    },
    deck::{Deck, Geometry, Paragraph, SLIDE_HEIGHT, SLIDE_WIDTH, Shape, Slide},
};

const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument.presentationml.";

const NOTES_WIDTH: i64 = 6_858_000;
const NOTES_HEIGHT: i64 = 9_144_000;

const GROUP_PROPERTIES: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

const COLOR_MAP: &str = concat!(
    r#"bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
    r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
    r#"hlink="hlink" folHlink="folHlink""#
);

fn rel_type(kind: &str) -> String {
    format!("{REL_BASE}{kind}")
}

fn solid_fill(color: Accent) -> String {
    format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.hex())
}

fn paragraph_xml(paragraph: &Paragraph) -> String {
    let mut attributes = String::new();
    if let Some((left, hanging)) = paragraph.indent {
        attributes.push_str(&format!(r#" marL="{left}" indent="{}""#, -hanging));
    }
    attributes.push_str(if paragraph.centered {
        r#" algn="ctr""#
    } else {
        r#" algn="l""#
    });

    let mut xml = format!(
        r#"<a:p><a:pPr{attributes}><a:spcAft><a:spcPts val="{}"/></a:spcAft>"#,
        paragraph.space_after
    );
    if paragraph.bullet {
        xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#);
    } else {
        xml.push_str("<a:buNone/>");
    }
    xml.push_str("</a:pPr>");

    for run in &paragraph.runs {
        xml.push_str(&format!(
            r#"<a:r><a:rPr lang="en-US" sz="{}" b="{}" i="{}" dirty="0">{}</a:rPr><a:t>{}</a:t></a:r>"#,
            run.size,
            u8::from(run.bold),
            u8::from(run.italic),
            solid_fill(run.color),
            xml_text(&run.text)
        ));
    }
    xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    xml
}

fn paragraphs_xml(paragraphs: &[Paragraph]) -> String {
    if paragraphs.is_empty() {
        return r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#.to_string();
    }
    paragraphs.iter().map(paragraph_xml).collect()
}

fn shape_xml(shape: &Shape, id: usize) -> String {
    let geometry = match shape.geometry {
        Geometry::Rect => "rect",
        Geometry::RoundRect => "roundRect",
    };
    let fill = shape.fill.map_or_else(|| "<a:noFill/>".to_string(), solid_fill);
    let line = shape.border.map_or_else(
        || "<a:ln><a:noFill/></a:ln>".to_string(),
        |color| format!(r#"<a:ln w="12700">{}</a:ln>"#, solid_fill(color)),
    );
    let anchor = if shape.anchor_middle { "ctr" } else { "t" };

    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name} {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="{geometry}"><a:avLst/></a:prstGeom>{fill}{line}</p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square" lIns="91440" tIns="91440" rIns="91440" bIns="91440" anchor="{anchor}"><a:noAutofit/></a:bodyPr>"#,
            "<a:lstStyle/>{paragraphs}</p:txBody></p:sp>"
        ),
        id = id,
        name = shape.name,
        x = shape.x,
        y = shape.y,
        cx = shape.cx,
        cy = shape.cy,
        geometry = geometry,
        fill = fill,
        line = line,
        anchor = anchor,
        paragraphs = paragraphs_xml(&shape.paragraphs),
    )
}

pub(crate) fn slide_xml(slide: &Slide) -> String {
    let shapes: String = slide
        .shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| shape_xml(shape, index + 2))
        .collect();
    format!(
        concat!(
            "{decl}<p:sld {ns}><p:cSld><p:spTree>{group}{shapes}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        decl = XML_DECLARATION,
        ns = NS,
        group = GROUP_PROPERTIES,
        shapes = shapes,
    )
}

pub(crate) fn notes_xml(notes: &[String]) -> String {
    let paragraphs: String = notes
        .iter()
        .map(|line| {
            format!(
                r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                xml_text(line)
            )
        })
        .collect();
    format!(
        concat!(
            "{decl}<p:notes {ns}><p:cSld><p:spTree>{group}",
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>"#,
            r#"<p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr>"#,
            "<p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>",
            "</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>"
        ),
        decl = XML_DECLARATION,
        ns = NS,
        group = GROUP_PROPERTIES,
        paragraphs = paragraphs,
    )
}

fn presentation_xml(slide_count: usize) -> String {
    let slide_ids: String = (0..slide_count)
        .map(|index| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + index, 10 + index))
        .collect();
    format!(
        concat!(
            r#"{decl}<p:presentation {ns} saveSubsetFonts="1">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            r#"<p:notesMasterIdLst><p:notesMasterId r:id="rId2"/></p:notesMasterIdLst>"#,
            "<p:sldIdLst>{slide_ids}</p:sldIdLst>",
            r#"<p:sldSz cx="{width}" cy="{height}"/><p:notesSz cx="{notes_width}" cy="{notes_height}"/>"#,
            "</p:presentation>"
        ),
        decl = XML_DECLARATION,
        ns = NS,
        slide_ids = slide_ids,
        width = SLIDE_WIDTH,
        height = SLIDE_HEIGHT,
        notes_width = NOTES_WIDTH,
        notes_height = NOTES_HEIGHT,
    )
}

fn slide_master_xml() -> String {
    format!(
        concat!(
            "{decl}<p:sldMaster {ns}><p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>",
            "<p:spTree>{group}</p:spTree></p:cSld><p:clrMap {color_map}/>",
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
        ),
        decl = XML_DECLARATION,
        ns = NS,
        group = GROUP_PROPERTIES,
        color_map = COLOR_MAP,
    )
}

fn slide_layout_xml() -> String {
    format!(
        concat!(
            r#"{decl}<p:sldLayout {ns} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{group}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        decl = XML_DECLARATION,
        ns = NS,
        group = GROUP_PROPERTIES,
    )
}

fn notes_master_xml() -> String {
    format!(
        concat!(
            "{decl}<p:notesMaster {ns}><p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>",
            "<p:spTree>{group}",
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>"#,
            r#"<p:nvPr><p:ph type="sldImg" idx="2"/></p:nvPr></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="685800" y="1143000"/><a:ext cx="5486400" cy="3086100"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr></p:sp>"#,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" sz="quarter" idx="1"/></p:nvPr></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="685800" y="4400550"/><a:ext cx="5486400" cy="3600450"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
            r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
            "</p:spTree></p:cSld><p:clrMap {color_map}/></p:notesMaster>"
        ),
        decl = XML_DECLARATION,
        ns = NS,
        group = GROUP_PROPERTIES,
        color_map = COLOR_MAP,
    )
}

fn theme_xml(name: &str) -> String {
    let fill_styles = concat!(
        r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#
    );
    let line_styles = concat!(
        r#"<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#
    );
    let effect_styles = concat!(
        "<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle>",
        "<a:effectStyle><a:effectLst/></a:effectStyle>",
        "<a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"
    );
    let background_styles = concat!(
        r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#
    );
    let color = |slot: &str, accent: Accent| {
        format!(r#"<a:{slot}><a:srgbClr val="{}"/></a:{slot}>"#, accent.hex())
    };
    let colors = [
        color("dk1", palette::INK),
        color("lt1", palette::WHITE),
        color("dk2", Accent::SLATE),
        color("lt2", palette::DIALOGUE_FILL),
        color("accent1", Accent::INDIGO),
        color("accent2", Accent::TEAL),
        color("accent3", Accent::AMBER),
        color("accent4", Accent::ROSE),
        color("accent5", Accent::SKY),
        color("accent6", Accent::GREEN),
        color("hlink", Accent::BLUE),
        color("folHlink", Accent::PURPLE),
    ]
    .concat();

    format!(
        concat!(
            r#"{decl}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="{name}">"#,
            r#"<a:themeElements><a:clrScheme name="{name}">{colors}</a:clrScheme>"#,
            r#"<a:fontScheme name="{name}"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
            r#"<a:fmtScheme name="{name}">{fills}{lines}{effects}{backgrounds}</a:fmtScheme>"#,
            "</a:themeElements></a:theme>"
        ),
        decl = XML_DECLARATION,
        name = name,
        colors = colors,
        fills = fill_styles,
        lines = line_styles,
        effects = effect_styles,
        backgrounds = background_styles,
    )
}

/// Every part of the deck's package, in a fixed order.
pub(crate) fn package(deck: &Deck) -> Package {
    let count = deck.slides.len();
    let mut package = Package::new();

    let mut overrides: Vec<(String, String)> = vec![
        ("/ppt/presentation.xml".to_string(), format!("{CT_BASE}presentation.main+xml")),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), format!("{CT_BASE}slideMaster+xml")),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), format!("{CT_BASE}slideLayout+xml")),
        ("/ppt/notesMasters/notesMaster1.xml".to_string(), format!("{CT_BASE}notesMaster+xml")),
        (
            "/ppt/theme/theme1.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.theme+xml".to_string(),
        ),
        (
            "/ppt/theme/theme2.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.theme+xml".to_string(),
        ),
        ("/ppt/presProps.xml".to_string(), format!("{CT_BASE}presProps+xml")),
        ("/ppt/viewProps.xml".to_string(), format!("{CT_BASE}viewProps+xml")),
        ("/ppt/tableStyles.xml".to_string(), format!("{CT_BASE}tableStyles+xml")),
    ];
    for number in 1..=count {
        overrides.push((format!("/ppt/slides/slide{number}.xml"), format!("{CT_BASE}slide+xml")));
        overrides.push((
            format!("/ppt/notesSlides/notesSlide{number}.xml"),
            format!("{CT_BASE}notesSlide+xml"),
        ));
    }
    let borrowed: Vec<(&str, &str)> = overrides
        .iter()
        .map(|(part, content_type)| (part.as_str(), content_type.as_str()))
        .collect();
    package.add("[Content_Types].xml", ooxml::content_types(&borrowed));
    package.add("_rels/.rels", ooxml::package_relationships("ppt/presentation.xml"));
    package.add("docProps/core.xml", ooxml::core_properties(&deck.title));
    package.add("docProps/app.xml", ooxml::app_properties("studydoc"));

    package.add("ppt/presentation.xml", presentation_xml(count));
    let fixed = [
        ("rId1", rel_type("slideMaster"), "slideMasters/slideMaster1.xml".to_string()),
        ("rId2", rel_type("notesMaster"), "notesMasters/notesMaster1.xml".to_string()),
        ("rId3", rel_type("theme"), "theme/theme1.xml".to_string()),
        ("rId4", rel_type("presProps"), "presProps.xml".to_string()),
        ("rId5", rel_type("viewProps"), "viewProps.xml".to_string()),
        ("rId6", rel_type("tableStyles"), "tableStyles.xml".to_string()),
    ];
    let slide_rels: Vec<(String, String, String)> = (1..=count)
        .map(|number| {
            (
                format!("rId{}", 9 + number),
                rel_type("slide"),
                format!("slides/slide{number}.xml"),
            )
        })
        .collect();
    let entries: Vec<Relationship<'_>> = fixed
        .iter()
        .map(|(id, kind, target)| Relationship {
            id,
            kind,
            target,
        })
        .chain(slide_rels.iter().map(|(id, kind, target)| Relationship {
            id,
            kind,
            target,
        }))
        .collect();
    package.add("ppt/_rels/presentation.xml.rels", ooxml::relationships(&entries));

    package.add("ppt/slideMasters/slideMaster1.xml", slide_master_xml());
    package.add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        ooxml::relationships(&[
            Relationship {
                id: "rId1",
                kind: &rel_type("slideLayout"),
                target: "../slideLayouts/slideLayout1.xml",
            },
            Relationship {
                id: "rId2",
                kind: &rel_type("theme"),
                target: "../theme/theme1.xml",
            },
        ]),
    );
    package.add("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml());
    package.add(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        ooxml::relationships(&[Relationship {
            id: "rId1",
            kind: &rel_type("slideMaster"),
            target: "../slideMasters/slideMaster1.xml",
        }]),
    );
    package.add("ppt/notesMasters/notesMaster1.xml", notes_master_xml());
    package.add(
        "ppt/notesMasters/_rels/notesMaster1.xml.rels",
        ooxml::relationships(&[Relationship {
            id: "rId1",
            kind: &rel_type("theme"),
            target: "../theme/theme2.xml",
        }]),
    );
    package.add("ppt/theme/theme1.xml", theme_xml("studydoc"));
    package.add("ppt/theme/theme2.xml", theme_xml("studydoc notes"));
    package.add(
        "ppt/presProps.xml",
        format!("{XML_DECLARATION}<p:presentationPr {NS}/>"),
    );
    package.add("ppt/viewProps.xml", format!("{XML_DECLARATION}<p:viewPr {NS}/>"));
    package.add(
        "ppt/tableStyles.xml",
        format!(
            r#"{XML_DECLARATION}<a:tblStyleLst xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#
        ),
    );

    for (index, slide) in deck.slides.iter().enumerate() {
        let number = index + 1;
        package.add(format!("ppt/slides/slide{number}.xml"), slide_xml(slide));
        let notes_target = format!("../notesSlides/notesSlide{number}.xml");
        package.add(
            format!("ppt/slides/_rels/slide{number}.xml.rels"),
            ooxml::relationships(&[
                Relationship {
                    id: "rId1",
                    kind: &rel_type("slideLayout"),
                    target: "../slideLayouts/slideLayout1.xml",
                },
                Relationship {
                    id: "rId2",
                    kind: &rel_type("notesSlide"),
                    target: &notes_target,
                },
            ]),
        );
        package.add(
            format!("ppt/notesSlides/notesSlide{number}.xml"),
            notes_xml(&slide.notes),
        );
        let slide_target = format!("../slides/slide{number}.xml");
        package.add(
            format!("ppt/notesSlides/_rels/notesSlide{number}.xml.rels"),
            ooxml::relationships(&[
                Relationship {
                    id: "rId1",
                    kind: &rel_type("notesMaster"),
                    target: "../notesMasters/notesMaster1.xml",
                },
                Relationship {
                    id: "rId2",
                    kind: &rel_type("slide"),
                    target: &slide_target,
                },
            ]),
        );
    }
    package
}

pub(crate) fn into_bytes(deck: &Deck) -> Result<Vec<u8>, RenderError> {
    package(deck).into_bytes()
}
