//! WordprocessingML rendering of the paged layout primitives.

use crate::application::registry::{Accent, palette};

use super::{
    super::{
        layout::{Anchors, CoverPage, OptionStyle, PageComposer, PartHeader, ScaleVisual, TextStyle},
        ooxml::xml_text,
        types::RenderOptions,
    },
    package::{DocxDocument, content_width},
};

/// Character formatting of one run.
#[derive(Debug, Clone, Copy, Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    color: Option<Accent>,
    /// Half-points.
    size: Option<u32>,
}

impl RunStyle {
    fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    fn colored(mut self, color: Accent) -> Self {
        self.color = Some(color);
        self
    }

    fn sized(mut self, half_points: u32) -> Self {
        self.size = Some(half_points);
        self
    }

    fn muted() -> Self {
        Self::default().colored(palette::MUTED).sized(18)
    }
}

/// Paragraph formatting; fields map onto `w:pPr` children in schema order.
#[derive(Debug, Clone, Copy, Default)]
struct ParagraphStyle {
    style_id: Option<&'static str>,
    keep_next: bool,
    left_border: Option<Accent>,
    bottom_border: Option<Accent>,
    fill: Option<Accent>,
    space_before: Option<u32>,
    space_after: Option<u32>,
    indent: Option<(u32, u32)>,
    center: bool,
}

impl ParagraphStyle {
    fn properties(&self) -> String {
        let mut xml = String::new();
        if let Some(style_id) = self.style_id {
            xml.push_str(&format!(r#"<w:pStyle w:val="{style_id}"/>"#));
        }
        if self.keep_next {
            xml.push_str("<w:keepNext/>");
        }
        if self.left_border.is_some() || self.bottom_border.is_some() {
            xml.push_str("<w:pBdr>");
            if let Some(color) = self.left_border {
                xml.push_str(&format!(
                    r#"<w:left w:val="single" w:sz="24" w:space="8" w:color="{}"/>"#,
                    color.hex()
                ));
            }
            if let Some(color) = self.bottom_border {
                xml.push_str(&format!(
                    r#"<w:bottom w:val="single" w:sz="12" w:space="4" w:color="{}"/>"#,
                    color.hex()
                ));
            }
            xml.push_str("</w:pBdr>");
        }
        if let Some(fill) = self.fill {
            xml.push_str(&format!(
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                fill.hex()
            ));
        }
        if self.space_before.is_some() || self.space_after.is_some() {
            xml.push_str("<w:spacing");
            if let Some(before) = self.space_before {
                xml.push_str(&format!(r#" w:before="{before}""#));
            }
            if let Some(after) = self.space_after {
                xml.push_str(&format!(r#" w:after="{after}""#));
            }
            xml.push_str("/>");
        }
        if let Some((left, hanging)) = self.indent {
            xml.push_str(&format!(r#"<w:ind w:left="{left}" w:hanging="{hanging}"/>"#));
        }
        if self.center {
            xml.push_str(r#"<w:jc w:val="center"/>"#);
        }
        if xml.is_empty() {
            xml
        } else {
            format!("<w:pPr>{xml}</w:pPr>")
        }
    }
}

/// One run; line breaks in `text` become `w:br`.
fn run(text: &str, style: RunStyle) -> String {
    let mut properties = String::new();
    if style.bold {
        properties.push_str("<w:b/>");
    }
    if style.italic {
        properties.push_str("<w:i/>");
    }
    if let Some(color) = style.color {
        properties.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.hex()));
    }
    if let Some(size) = style.size {
        properties.push_str(&format!(r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#));
    }

    let mut xml = String::from("<w:r>");
    if !properties.is_empty() {
        xml.push_str(&format!("<w:rPr>{properties}</w:rPr>"));
    }
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            xml_text(line)
        ));
    }
    xml.push_str("</w:r>");
    xml
}

fn tab() -> &'static str {
    "<w:r><w:tab/></w:r>"
}

#[derive(Debug, Clone, Default)]
struct Cell {
    text: String,
    style: RunStyle,
    fill: Option<Accent>,
    center: bool,
}

impl Cell {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn styled(mut self, style: RunStyle) -> Self {
        self.style = style;
        self
    }

    fn centered(mut self) -> Self {
        self.center = true;
        self
    }

    fn filled(mut self, fill: Accent) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// Composes a word-processing body from layout primitives.
#[derive(Debug)]
pub struct DocxComposer {
    title: String,
    options: RenderOptions,
    width: u32,
    body: String,
}

impl DocxComposer {
    pub fn new(title: impl Into<String>, options: &RenderOptions) -> Self {
        Self {
            title: title.into(),
            options: options.clone(),
            width: content_width(options.page_size),
            body: String::new(),
        }
    }

    pub fn finish(self) -> DocxDocument {
        DocxDocument {
            title: self.title,
            body: self.body,
            page_size: self.options.page_size,
        }
    }

    fn push_paragraph(&mut self, style: ParagraphStyle, runs: &str) {
        self.body.push_str("<w:p>");
        self.body.push_str(&style.properties());
        self.body.push_str(runs);
        self.body.push_str("</w:p>");
    }

    /// Table followed by a spacer paragraph. `widths` are relative weights.
    fn push_table(&mut self, widths: &[u32], rows: &[Vec<Cell>], border: Accent) {
        let total: u32 = widths.iter().sum::<u32>().max(1);
        let columns: Vec<u32> = widths
            .iter()
            .map(|weight| self.width * weight / total)
            .collect();

        let edge = |side: &str| {
            format!(
                r#"<w:{side} w:val="single" w:sz="4" w:space="0" w:color="{}"/>"#,
                border.hex()
            )
        };
        self.body.push_str("<w:tbl><w:tblPr>");
        self.body
            .push_str(&format!(r#"<w:tblW w:w="{}" w:type="dxa"/>"#, self.width));
        self.body.push_str("<w:tblBorders>");
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            self.body.push_str(&edge(side));
        }
        self.body
            .push_str(r#"</w:tblBorders><w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid>"#);
        for width in &columns {
            self.body.push_str(&format!(r#"<w:gridCol w:w="{width}"/>"#));
        }
        self.body.push_str("</w:tblGrid>");

        for row in rows {
            self.body.push_str("<w:tr>");
            for (cell, width) in row.iter().zip(&columns) {
                self.body.push_str(&format!(
                    r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/>"#
                ));
                if let Some(fill) = cell.fill {
                    self.body.push_str(&format!(
                        r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                        fill.hex()
                    ));
                }
                self.body.push_str("</w:tcPr><w:p>");
                self.body.push_str(
                    &ParagraphStyle {
                        space_after: Some(0),
                        center: cell.center,
                        ..ParagraphStyle::default()
                    }
                    .properties(),
                );
                if !cell.text.is_empty() {
                    self.body.push_str(&run(&cell.text, cell.style));
                }
                self.body.push_str("</w:p></w:tc>");
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
        self.push_paragraph(
            ParagraphStyle {
                space_after: Some(60),
                ..ParagraphStyle::default()
            },
            "",
        );
    }

    /// Evenly spaced cells with an optional anchor row underneath.
    fn push_strip(&mut self, cells: Vec<Cell>, anchors: &Anchors) {
        let count = cells.len();
        let mut rows = vec![cells];
        if !anchors.is_empty() && count > 0 {
            rows.push(anchor_row(count, anchors));
        }
        self.push_table(&vec![1; count], &rows, palette::RULE);
    }
}

fn anchor_row(count: usize, anchors: &Anchors) -> Vec<Cell> {
    let mut row: Vec<Cell> = (0..count).map(|_| Cell::new("")).collect();
    let style = RunStyle::muted().sized(16);
    if let Some(mid) = anchors.mid.as_ref() {
        row[count / 2] = Cell::new(mid.as_str()).styled(style).centered();
    }
    if let Some(min) = anchors.min.as_ref() {
        row[0] = Cell::new(min.as_str()).styled(style);
    }
    if let Some(max) = anchors.max.as_ref() {
        row[count - 1] = Cell::new(max.as_str()).styled(style);
    }
    row
}

impl PageComposer for DocxComposer {
    fn cover(&mut self, cover: &CoverPage) {
        self.push_paragraph(
            ParagraphStyle {
                space_before: Some(2400),
                ..ParagraphStyle::default()
            },
            &run(
                &cover.eyebrow.to_uppercase(),
                RunStyle::bold().colored(cover.accent).sized(20),
            ),
        );
        self.push_paragraph(
            ParagraphStyle {
                style_id: Some("Title"),
                ..ParagraphStyle::default()
            },
            &run(&cover.title, RunStyle::default()),
        );
        if let Some(subtitle) = cover.subtitle.as_ref() {
            self.push_paragraph(
                ParagraphStyle {
                    style_id: Some("Subtitle"),
                    ..ParagraphStyle::default()
                },
                &run(subtitle, RunStyle::default()),
            );
        }
        self.push_paragraph(
            ParagraphStyle {
                bottom_border: Some(cover.accent),
                space_after: Some(240),
                ..ParagraphStyle::default()
            },
            "",
        );
        if !cover.metadata.is_empty() {
            self.key_values(&cover.metadata);
        }
        self.push_paragraph(
            ParagraphStyle::default(),
            &run(
                &format!("Generated on {}", cover.generated_on),
                RunStyle {
                    italic: true,
                    ..RunStyle::muted()
                },
            ),
        );
    }

    fn part_header(&mut self, header: &PartHeader) {
        let banner = ParagraphStyle {
            keep_next: true,
            fill: Some(header.accent),
            space_after: Some(0),
            ..ParagraphStyle::default()
        };
        self.push_paragraph(
            ParagraphStyle {
                space_before: Some(360),
                ..banner
            },
            &run(
                &header.caption(),
                RunStyle::bold().colored(palette::WHITE).sized(16),
            ),
        );
        self.push_paragraph(
            ParagraphStyle {
                space_after: Some(160),
                ..banner
            },
            &run(
                &header.title,
                RunStyle::bold().colored(palette::WHITE).sized(30),
            ),
        );
    }

    fn heading(&mut self, text: &str) {
        self.push_paragraph(
            ParagraphStyle {
                style_id: Some("Heading2"),
                ..ParagraphStyle::default()
            },
            &run(text, RunStyle::default()),
        );
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let run_style = match style {
            TextStyle::Body => RunStyle::default(),
            TextStyle::Muted => RunStyle {
                italic: true,
                ..RunStyle::muted()
            },
            TextStyle::Emphasis => RunStyle::bold(),
        };
        self.push_paragraph(ParagraphStyle::default(), &run(text, run_style));
    }

    fn dialogue(&mut self, text: &str) {
        self.push_paragraph(
            ParagraphStyle {
                left_border: Some(Accent::SLATE),
                fill: Some(palette::DIALOGUE_FILL),
                space_before: Some(60),
                space_after: Some(160),
                ..ParagraphStyle::default()
            },
            &run(
                text,
                RunStyle {
                    italic: true,
                    ..RunStyle::default()
                },
            ),
        );
    }

    fn callout(&mut self, title: &str, lines: &[String]) {
        let boxed = ParagraphStyle {
            left_border: Some(palette::CALLOUT_BORDER),
            fill: Some(palette::CALLOUT_FILL),
            space_after: Some(0),
            keep_next: true,
            ..ParagraphStyle::default()
        };
        self.push_paragraph(
            ParagraphStyle {
                space_before: Some(120),
                keep_next: !lines.is_empty(),
                ..boxed
            },
            &run(title, RunStyle::bold().colored(palette::CALLOUT_INK)),
        );
        for (index, line) in lines.iter().enumerate() {
            let last = index + 1 == lines.len();
            self.push_paragraph(
                ParagraphStyle {
                    keep_next: !last,
                    space_after: Some(if last { 160 } else { 0 }),
                    ..boxed
                },
                &run(
                    &format!("\u{2022} {line}"),
                    RunStyle::default().colored(palette::CALLOUT_INK),
                ),
            );
        }
    }

    fn bullets(&mut self, items: &[String]) {
        for item in items {
            let runs = format!(
                "{}{}{}",
                run("\u{2022}", RunStyle::default()),
                tab(),
                run(item, RunStyle::default())
            );
            self.push_paragraph(
                ParagraphStyle {
                    indent: Some((360, 360)),
                    space_after: Some(60),
                    ..ParagraphStyle::default()
                },
                &runs,
            );
        }
    }

    fn numbered(&mut self, label: &str, text: &str) {
        let runs = format!(
            "{}{}{}",
            run(label, RunStyle::bold().colored(Accent::BLUE)),
            tab(),
            run(text, RunStyle::default())
        );
        self.push_paragraph(
            ParagraphStyle {
                indent: Some((567, 567)),
                space_after: Some(80),
                ..ParagraphStyle::default()
            },
            &runs,
        );
    }

    fn options(&mut self, options: &[String], style: OptionStyle) {
        let marker = match style {
            OptionStyle::Single => "\u{25CB}",
            OptionStyle::Multiple => "\u{2610}",
            OptionStyle::Ranking => "____",
        };
        for option in options {
            let runs = format!(
                "{}{}{}",
                run(marker, RunStyle::default().colored(palette::MUTED)),
                tab(),
                run(option, RunStyle::default())
            );
            self.push_paragraph(
                ParagraphStyle {
                    indent: Some((1134, 567)),
                    space_after: Some(40),
                    ..ParagraphStyle::default()
                },
                &runs,
            );
        }
    }

    fn scale(&mut self, scale: &ScaleVisual) {
        let point = |value: String| Cell::new(value).centered();
        match scale {
            ScaleVisual::Likert { points, anchors } => {
                let cells = points.iter().map(|value| point(value.to_string())).collect();
                self.push_strip(cells, anchors);
            }
            ScaleVisual::Nps { anchors } => {
                let cells = (0..=10).map(|value| point(value.to_string())).collect();
                self.push_strip(cells, anchors);
            }
            ScaleVisual::Stars { count, anchors } => {
                let cells = (0..*count)
                    .map(|_| {
                        point("\u{2606}".to_string())
                            .styled(RunStyle::default().colored(Accent::AMBER).sized(28))
                    })
                    .collect();
                self.push_strip(cells, anchors);
            }
            ScaleVisual::Slider { min, max, anchors } => {
                let track = format!("{min}  \u{251C}{}\u{2524}  {max}", "\u{2500}".repeat(40));
                self.push_paragraph(
                    ParagraphStyle {
                        indent: Some((567, 0)),
                        space_after: Some(0),
                        ..ParagraphStyle::default()
                    },
                    &run(&track, RunStyle::default().colored(palette::MUTED)),
                );
                if !anchors.is_empty() {
                    let labels = [anchors.min.as_deref(), anchors.mid.as_deref(), anchors.max.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join("  \u{00B7}  ");
                    self.push_paragraph(
                        ParagraphStyle {
                            indent: Some((567, 0)),
                            ..ParagraphStyle::default()
                        },
                        &run(&labels, RunStyle::muted()),
                    );
                }
            }
            ScaleVisual::Matrix { columns, rows } => {
                let header_style = RunStyle::bold().sized(18);
                let mut header = vec![Cell::new("").filled(palette::DIALOGUE_FILL)];
                header.extend(columns.iter().map(|column| {
                    Cell::new(column.as_str())
                        .styled(header_style)
                        .centered()
                        .filled(palette::DIALOGUE_FILL)
                }));
                let mut table = vec![header];
                for row in rows {
                    let mut cells = vec![Cell::new(row.as_str())];
                    cells.extend(columns.iter().map(|_| point("\u{25CB}".to_string())));
                    table.push(cells);
                }
                let mut widths = vec![3];
                widths.extend(columns.iter().map(|_| 1));
                self.push_table(&widths, &table, palette::RULE);
            }
        }
    }

    fn key_values(&mut self, rows: &[(String, String)]) {
        let table: Vec<Vec<Cell>> = rows
            .iter()
            .map(|(key, value)| {
                vec![
                    Cell::new(key.as_str()).styled(RunStyle::bold().colored(palette::MUTED)),
                    Cell::new(value.as_str()),
                ]
            })
            .collect();
        self.push_table(&[3, 7], &table, palette::RULE);
    }

    fn page_break(&mut self) {
        self.body.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> DocxComposer {
        DocxComposer::new("Plan", &RenderOptions::default())
    }

    #[test]
    fn numbered_item_keeps_label_and_escapes_text() {
        let mut composer = composer();
        composer.numbered("Q3", "Price < value?");
        let body = composer.finish().body;
        assert!(body.contains(">Q3</w:t>"));
        assert!(body.contains("Price &lt; value?"));
    }

    #[test]
    fn dialogue_line_breaks_become_breaks() {
        let mut composer = composer();
        composer.dialogue("Hello.\nThanks for joining.");
        let body = composer.finish().body;
        assert!(body.contains("Hello.</w:t><w:br/><w:t"));
        assert!(body.contains(&format!(r#"w:fill="{}""#, palette::DIALOGUE_FILL.hex())));
    }

    #[test]
    fn likert_strip_has_one_cell_per_point_plus_anchor_row() {
        let mut composer = composer();
        composer.scale(&ScaleVisual::Likert {
            points: vec![1, 2, 3, 4, 5],
            anchors: Anchors {
                min: Some("Disagree".to_string()),
                mid: None,
                max: Some("Agree".to_string()),
            },
        });
        let body = composer.finish().body;
        assert_eq!(body.matches("<w:gridCol").count(), 5);
        assert_eq!(body.matches("<w:tr>").count(), 2);
        assert!(body.contains(">Disagree</w:t>"));
    }

    #[test]
    fn matrix_grid_has_header_and_row_per_statement() {
        let mut composer = composer();
        composer.scale(&ScaleVisual::Matrix {
            columns: vec!["Never".to_string(), "Often".to_string()],
            rows: vec!["Email".to_string(), "Chat".to_string(), "Phone".to_string()],
        });
        let body = composer.finish().body;
        assert_eq!(body.matches("<w:tr>").count(), 4);
        assert_eq!(body.matches("<w:gridCol").count(), 3);
    }
}
