//! Page layout engine for the PDF renderer.
//!
//! Content flows top to bottom; every primitive reserves the space it needs
//! and starts a new page when the remaining space is too small. Footers are
//! added at serialization, once the page count is known.

use lopdf::{Object, StringFormat, content::Operation};

use crate::application::registry::{Accent, palette};

use super::{
    super::{
        layout::{Anchors, CoverPage, OptionStyle, PageComposer, PartHeader, ScaleVisual, TextStyle},
        types::RenderOptions,
    },
    PdfDocument,
    text::{Font, encode, width, wrap},
};

pub(crate) const MARGIN: f32 = 56.0;
/// Space kept free above the bottom margin for the footer.
const FOOTER_RESERVE: f32 = 16.0;

const BODY_SIZE: f32 = 10.5;
const BODY_LEADING: f32 = 14.5;
const SMALL_SIZE: f32 = 8.5;

/// Collects drawing operations page by page.
#[derive(Debug)]
pub struct PdfComposer {
    title: String,
    options: RenderOptions,
    page_width: f32,
    page_height: f32,
    pages: Vec<Vec<Operation>>,
    /// Top of the free area on the current page.
    cursor: f32,
}

impl PdfComposer {
    pub fn new(title: impl Into<String>, options: &RenderOptions) -> Self {
        let (page_width, page_height) = options.page_size.points();
        Self {
            title: title.into(),
            options: options.clone(),
            page_width,
            page_height,
            pages: vec![Vec::new()],
            cursor: page_height - MARGIN,
        }
    }

    pub fn finish(self) -> PdfDocument {
        PdfDocument {
            title: self.title,
            page_size: self.options.page_size,
            pages: self.pages,
        }
    }

    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * MARGIN
    }

    fn bottom(&self) -> f32 {
        MARGIN + FOOTER_RESERVE
    }

    fn page_is_empty(&self) -> bool {
        self.pages.last().is_none_or(Vec::is_empty)
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = self.page_height - MARGIN;
    }

    /// Start a new page unless `height` still fits on this one.
    fn ensure(&mut self, height: f32) {
        if self.cursor - height < self.bottom() && !self.page_is_empty() {
            self.new_page();
        }
    }

    fn skip(&mut self, height: f32) {
        self.cursor -= height;
    }

    fn push(&mut self, operations: impl IntoIterator<Item = Operation>) {
        if let Some(page) = self.pages.last_mut() {
            page.extend(operations);
        }
    }

    fn draw_text(&mut self, x: f32, baseline: f32, font: Font, size: f32, color: Accent, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let (r, g, b) = color.rgb();
        self.push([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource().into(), size.into()]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(bytes.to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Accent) {
        let (r, g, b) = color.rgb();
        self.push([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn stroke_path(&mut self, path: Vec<Operation>, color: Accent, line_width: f32) {
        let (r, g, b) = color.rgb();
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new("RG", vec![r.into(), g.into(), b.into()]),
            Operation::new("w", vec![line_width.into()]),
        ];
        operations.extend(path);
        operations.push(Operation::new("S", vec![]));
        operations.push(Operation::new("Q", vec![]));
        self.push(operations);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Accent, line_width: f32) {
        self.stroke_path(
            vec![
                Operation::new("m", vec![from.0.into(), from.1.into()]),
                Operation::new("l", vec![to.0.into(), to.1.into()]),
            ],
            color,
            line_width,
        );
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Accent) {
        self.stroke_path(
            vec![Operation::new(
                "re",
                vec![x.into(), y.into(), width.into(), height.into()],
            )],
            color,
            0.75,
        );
    }

    fn circle(&mut self, cx: f32, cy: f32, radius: f32, color: Accent) {
        const KAPPA: f32 = 0.552_284_8;
        let k = radius * KAPPA;
        let curve = |points: [f32; 6]| Operation::new("c", points.map(Object::from).to_vec());
        self.stroke_path(
            vec![
                Operation::new("m", vec![(cx + radius).into(), cy.into()]),
                curve([cx + radius, cy + k, cx + k, cy + radius, cx, cy + radius]),
                curve([cx - k, cy + radius, cx - radius, cy + k, cx - radius, cy]),
                curve([cx - radius, cy - k, cx - k, cy - radius, cx, cy - radius]),
                curve([cx + k, cy - radius, cx + radius, cy - k, cx + radius, cy]),
                Operation::new("h", vec![]),
            ],
            color,
            0.75,
        );
    }

    fn star(&mut self, cx: f32, cy: f32, radius: f32, color: Accent) {
        let mut path = Vec::with_capacity(11);
        for point in 0..10 {
            let r = if point % 2 == 0 { radius } else { radius * 0.45 };
            let angle = std::f32::consts::FRAC_PI_2 + point as f32 * std::f32::consts::PI / 5.0;
            let (x, y) = (cx + r * angle.cos(), cy + r * angle.sin());
            let operator = if point == 0 { "m" } else { "l" };
            path.push(Operation::new(operator, vec![x.into(), y.into()]));
        }
        path.push(Operation::new("h", vec![]));
        self.stroke_path(path, color, 1.0);
    }

    /// Wrapped text block at `x`, flowing across pages line by line.
    fn text_block(&mut self, x: f32, max_width: f32, text: &str, font: Font, size: f32, color: Accent, leading: f32) {
        for line in wrap(text, font, size, max_width) {
            self.ensure(leading);
            let baseline = self.cursor - size;
            self.draw_text(x, baseline, font, size, color, &line);
            self.skip(leading);
        }
    }

    /// Lines inside a tinted box with a colored bar on the left. Each line
    /// paints its own slice of the box so the box splits across pages.
    fn boxed_lines(&mut self, lines: &[(Vec<u8>, Font)], fill: Accent, bar: Accent, ink: Accent) {
        let x = MARGIN;
        let box_width = self.content_width();
        let padding = 6.0;
        let count = lines.len();
        for (index, (line, font)) in lines.iter().enumerate() {
            let top_pad = if index == 0 { padding } else { 0.0 };
            let bottom_pad = if index + 1 == count { padding } else { 0.0 };
            let height = BODY_LEADING + top_pad + bottom_pad;
            self.ensure(height);
            let bottom = self.cursor - height;
            self.fill_rect(x, bottom, box_width, height, fill);
            self.fill_rect(x, bottom, 3.0, height, bar);
            let baseline = self.cursor - top_pad - BODY_SIZE;
            self.draw_text(x + 14.0, baseline, *font, BODY_SIZE, ink, line);
            self.skip(height);
        }
        self.skip(8.0);
    }

    /// Row of equal cells with centered labels and an anchor line below.
    fn strip(&mut self, labels: &[String], anchors: &Anchors) {
        let count = labels.len().max(1);
        let cell = (self.content_width() / count as f32).min(40.0);
        let height = 20.0;
        let anchor_height = if anchors.is_empty() { 0.0 } else { 12.0 };
        self.ensure(height + anchor_height + 8.0);

        let top = self.cursor;
        for (index, label) in labels.iter().enumerate() {
            let x = MARGIN + index as f32 * cell;
            self.stroke_rect(x, top - height, cell, height, palette::RULE);
            let bytes = encode(label);
            let label_width = width(&bytes, Font::Regular, 9.0);
            self.draw_text(
                x + (cell - label_width) / 2.0,
                top - 13.5,
                Font::Regular,
                9.0,
                palette::INK,
                &bytes,
            );
        }
        self.skip(height);
        self.anchor_line(MARGIN, cell * count as f32, anchors);
        self.skip(8.0);
    }

    fn anchor_line(&mut self, x: f32, span: f32, anchors: &Anchors) {
        if anchors.is_empty() {
            return;
        }
        let baseline = self.cursor - 10.0;
        if let Some(min) = anchors.min.as_deref() {
            self.draw_text(x, baseline, Font::Italic, SMALL_SIZE - 1.0, palette::MUTED, &encode(min));
        }
        if let Some(mid) = anchors.mid.as_deref() {
            let bytes = encode(mid);
            let offset = (span - width(&bytes, Font::Italic, SMALL_SIZE - 1.0)) / 2.0;
            self.draw_text(x + offset, baseline, Font::Italic, SMALL_SIZE - 1.0, palette::MUTED, &bytes);
        }
        if let Some(max) = anchors.max.as_deref() {
            let bytes = encode(max);
            let offset = span - width(&bytes, Font::Italic, SMALL_SIZE - 1.0);
            self.draw_text(x + offset, baseline, Font::Italic, SMALL_SIZE - 1.0, palette::MUTED, &bytes);
        }
        self.skip(12.0);
    }

    fn matrix(&mut self, columns: &[String], rows: &[String]) {
        let total = self.content_width();
        let label_width = total * 0.4;
        let column_width = (total - label_width) / columns.len().max(1) as f32;
        let leading = 10.5;

        let header: Vec<Vec<Vec<u8>>> = columns
            .iter()
            .map(|column| wrap(column, Font::Bold, SMALL_SIZE, column_width - 4.0))
            .collect();
        let header_lines = header.iter().map(Vec::len).max().unwrap_or(1);
        let header_height = header_lines as f32 * leading + 8.0;
        self.ensure(header_height + 24.0);

        let top = self.cursor;
        self.fill_rect(MARGIN, top - header_height, total, header_height, palette::DIALOGUE_FILL);
        for (index, lines) in header.iter().enumerate() {
            let x = MARGIN + label_width + index as f32 * column_width;
            for (line_index, line) in lines.iter().enumerate() {
                let offset = (column_width - width(line, Font::Bold, SMALL_SIZE)) / 2.0;
                let baseline = top - 4.0 - SMALL_SIZE - line_index as f32 * leading;
                self.draw_text(x + offset, baseline, Font::Bold, SMALL_SIZE, palette::INK, line);
            }
        }
        self.skip(header_height);

        for row in rows {
            let lines = wrap(row, Font::Regular, 9.0, label_width - 8.0);
            let height = lines.len().max(1) as f32 * 12.0 + 8.0;
            self.ensure(height);
            let top = self.cursor;
            for (line_index, line) in lines.iter().enumerate() {
                let baseline = top - 4.0 - 9.0 - line_index as f32 * 12.0;
                self.draw_text(MARGIN + 4.0, baseline, Font::Regular, 9.0, palette::INK, line);
            }
            for index in 0..columns.len() {
                let cx = MARGIN + label_width + (index as f32 + 0.5) * column_width;
                self.circle(cx, top - height / 2.0, 4.0, palette::MUTED);
            }
            self.line((MARGIN, top - height), (MARGIN + total, top - height), palette::RULE, 0.5);
            self.skip(height);
        }
        self.skip(8.0);
    }
}

impl PageComposer for PdfComposer {
    fn cover(&mut self, cover: &CoverPage) {
        let width = self.content_width();
        self.skip(120.0);
        self.text_block(MARGIN, width, &cover.eyebrow.to_uppercase(), Font::Bold, 10.0, cover.accent, 16.0);
        self.skip(6.0);
        self.text_block(MARGIN, width, &cover.title, Font::Bold, 26.0, palette::INK, 31.0);
        if let Some(subtitle) = cover.subtitle.as_deref() {
            self.skip(4.0);
            self.text_block(MARGIN, width, subtitle, Font::Regular, 14.0, palette::MUTED, 19.0);
        }
        self.skip(10.0);
        let y = self.cursor;
        self.line((MARGIN, y), (MARGIN + width, y), cover.accent, 2.0);
        self.skip(18.0);
        if !cover.metadata.is_empty() {
            self.key_values(&cover.metadata);
        }
        self.skip(6.0);
        self.text_block(
            MARGIN,
            width,
            &format!("Generated on {}", cover.generated_on),
            Font::Italic,
            9.0,
            palette::MUTED,
            12.0,
        );
    }

    fn part_header(&mut self, header: &PartHeader) {
        let inner = self.content_width() - 24.0;
        let title_lines = wrap(&header.title, Font::Bold, 15.0, inner);
        let height = 12.0 + 10.0 + 6.0 + title_lines.len() as f32 * 19.0 + 8.0;

        self.skip(10.0);
        // Banner plus room for the first line under it.
        self.ensure(height + 2.0 * BODY_LEADING);
        let top = self.cursor;
        self.fill_rect(MARGIN, top - height, self.content_width(), height, header.accent);
        self.draw_text(
            MARGIN + 12.0,
            top - 12.0 - 8.0,
            Font::Bold,
            8.0,
            palette::WHITE,
            &encode(&header.caption()),
        );
        for (index, line) in title_lines.iter().enumerate() {
            let baseline = top - 12.0 - 10.0 - 6.0 - 15.0 - index as f32 * 19.0;
            self.draw_text(MARGIN + 12.0, baseline, Font::Bold, 15.0, palette::WHITE, line);
        }
        self.skip(height + 10.0);
    }

    fn heading(&mut self, text: &str) {
        self.skip(8.0);
        self.ensure(18.0 + BODY_LEADING);
        let width = self.content_width();
        self.text_block(MARGIN, width, text, Font::Bold, 12.0, palette::INK, 17.0);
        self.skip(2.0);
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let width = self.content_width();
        match style {
            TextStyle::Body => {
                self.text_block(MARGIN, width, text, Font::Regular, BODY_SIZE, palette::INK, BODY_LEADING)
            }
            TextStyle::Muted => {
                self.text_block(MARGIN, width, text, Font::Italic, 9.0, palette::MUTED, 12.5)
            }
            TextStyle::Emphasis => {
                self.text_block(MARGIN, width, text, Font::Bold, BODY_SIZE, palette::INK, BODY_LEADING)
            }
        }
        self.skip(4.0);
    }

    fn dialogue(&mut self, text: &str) {
        let lines: Vec<(Vec<u8>, Font)> = wrap(text, Font::Italic, BODY_SIZE, self.content_width() - 24.0)
            .into_iter()
            .map(|line| (line, Font::Italic))
            .collect();
        self.boxed_lines(&lines, palette::DIALOGUE_FILL, Accent::SLATE, palette::INK);
    }

    fn callout(&mut self, title: &str, lines: &[String]) {
        let inner = self.content_width() - 24.0;
        let mut boxed: Vec<(Vec<u8>, Font)> = wrap(title, Font::Bold, BODY_SIZE, inner)
            .into_iter()
            .map(|line| (line, Font::Bold))
            .collect();
        for line in lines {
            boxed.extend(
                wrap(&format!("\u{2022} {line}"), Font::Regular, BODY_SIZE, inner)
                    .into_iter()
                    .map(|line| (line, Font::Regular)),
            );
        }
        self.skip(4.0);
        self.boxed_lines(&boxed, palette::CALLOUT_FILL, palette::CALLOUT_BORDER, palette::CALLOUT_INK);
    }

    fn bullets(&mut self, items: &[String]) {
        let width = self.content_width() - 16.0;
        for item in items {
            self.ensure(BODY_LEADING);
            let baseline = self.cursor - BODY_SIZE;
            self.draw_text(MARGIN + 4.0, baseline, Font::Regular, BODY_SIZE, palette::MUTED, &[0x95]);
            self.text_block(MARGIN + 16.0, width, item, Font::Regular, BODY_SIZE, palette::INK, BODY_LEADING);
            self.skip(2.0);
        }
        self.skip(4.0);
    }

    fn numbered(&mut self, label: &str, text: &str) {
        let indent = 34.0;
        self.ensure(BODY_LEADING);
        let baseline = self.cursor - BODY_SIZE;
        self.draw_text(MARGIN, baseline, Font::Bold, BODY_SIZE, Accent::BLUE, &encode(label));
        let width = self.content_width() - indent;
        self.text_block(MARGIN + indent, width, text, Font::Regular, BODY_SIZE, palette::INK, BODY_LEADING);
        self.skip(4.0);
    }

    fn options(&mut self, options: &[String], style: OptionStyle) {
        let indent = 34.0;
        let text_x = MARGIN + indent + 18.0;
        let width = self.content_width() - indent - 18.0;
        for option in options {
            self.ensure(BODY_LEADING);
            let middle = self.cursor - BODY_SIZE / 2.0 - 1.0;
            let marker_x = MARGIN + indent;
            match style {
                OptionStyle::Single => self.circle(marker_x + 4.0, middle, 4.0, palette::MUTED),
                OptionStyle::Multiple => self.stroke_rect(marker_x, middle - 4.0, 8.0, 8.0, palette::MUTED),
                OptionStyle::Ranking => self.line(
                    (marker_x - 4.0, middle - 4.0),
                    (marker_x + 12.0, middle - 4.0),
                    palette::MUTED,
                    0.75,
                ),
            }
            self.text_block(text_x, width, option, Font::Regular, BODY_SIZE, palette::INK, BODY_LEADING);
        }
        self.skip(4.0);
    }

    fn scale(&mut self, scale: &ScaleVisual) {
        match scale {
            ScaleVisual::Likert { points, anchors } => {
                let labels: Vec<String> = points.iter().map(i32::to_string).collect();
                self.strip(&labels, anchors);
            }
            ScaleVisual::Nps { anchors } => {
                let labels: Vec<String> = (0..=10).map(|value: i32| value.to_string()).collect();
                self.strip(&labels, anchors);
            }
            ScaleVisual::Stars { count, anchors } => {
                let spacing = 26.0;
                self.ensure(24.0 + 20.0);
                let middle = self.cursor - 11.0;
                for index in 0..*count {
                    let cx = MARGIN + 11.0 + index as f32 * spacing;
                    self.star(cx, middle, 9.0, Accent::AMBER);
                }
                self.skip(24.0);
                let span = spacing * (*count).max(1) as f32 - (spacing - 22.0);
                self.anchor_line(MARGIN, span, anchors);
                self.skip(8.0);
            }
            ScaleVisual::Slider { min, max, anchors } => {
                self.ensure(40.0);
                let min_label = encode(&min.to_string());
                let max_label = encode(&max.to_string());
                let track_start = MARGIN + width(&min_label, Font::Regular, 9.0) + 8.0;
                let track_end = MARGIN + self.content_width() * 0.7;
                let middle = self.cursor - 8.0;
                self.draw_text(MARGIN, middle - 3.0, Font::Regular, 9.0, palette::INK, &min_label);
                self.line((track_start, middle), (track_end, middle), palette::MUTED, 1.5);
                self.line((track_start, middle - 4.0), (track_start, middle + 4.0), palette::MUTED, 1.0);
                self.line((track_end, middle - 4.0), (track_end, middle + 4.0), palette::MUTED, 1.0);
                self.draw_text(track_end + 8.0, middle - 3.0, Font::Regular, 9.0, palette::INK, &max_label);
                self.skip(18.0);
                self.anchor_line(track_start, track_end - track_start, anchors);
                self.skip(8.0);
            }
            ScaleVisual::Matrix { columns, rows } => self.matrix(columns, rows),
        }
    }

    fn key_values(&mut self, rows: &[(String, String)]) {
        let key_width = 130.0;
        let value_width = self.content_width() - key_width;
        for (key, value) in rows {
            let lines = wrap(value, Font::Regular, 10.0, value_width - 4.0);
            let height = lines.len().max(1) as f32 * 13.5 + 6.0;
            self.ensure(height);
            let top = self.cursor;
            let key_bytes = encode(key);
            self.draw_text(MARGIN, top - 13.0, Font::Bold, 9.0, palette::MUTED, &key_bytes);
            for (index, line) in lines.iter().enumerate() {
                let baseline = top - 13.0 - index as f32 * 13.5;
                self.draw_text(MARGIN + key_width, baseline, Font::Regular, 10.0, palette::INK, line);
            }
            let rule = top - height;
            self.line((MARGIN, rule), (MARGIN + key_width + value_width, rule), palette::RULE, 0.5);
            self.skip(height);
        }
        self.skip(8.0);
    }

    fn page_break(&mut self) {
        if !self.page_is_empty() {
            self.new_page();
        }
    }
}
