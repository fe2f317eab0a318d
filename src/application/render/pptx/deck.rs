//! Slide builder: banner slides with a flowing body.
//!
//! Body items are stacked under the banner. Heights are estimated from the
//! text length, and an item that would cross the bottom edge opens a
//! continuation slide carrying the same banner.

use crate::application::registry::{Accent, palette};

use super::super::layout::{CoverPage, non_blank};

pub const SLIDE_WIDTH: i64 = 12_192_000;
pub const SLIDE_HEIGHT: i64 = 6_858_000;
pub const EMU_PER_POINT: i64 = 12_700;

const MARGIN_X: i64 = 457_200;
const BODY_WIDTH: i64 = SLIDE_WIDTH - 2 * MARGIN_X;
const BANNER_HEIGHT: i64 = 1_143_000;
const BODY_TOP: i64 = BANNER_HEIGHT + 228_600;
const BODY_BOTTOM: i64 = SLIDE_HEIGHT - 365_760;
const INSET: i64 = 91_440;
const BULLET_INDENT: i64 = 342_900;
const LABEL_INDENT: i64 = 640_080;

/// A run of uniformly formatted text.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    /// Hundredths of a point.
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub color: Accent,
}

impl Run {
    pub fn new(text: impl Into<String>, points: u32) -> Self {
        Self {
            text: text.into(),
            size: points * 100,
            bold: false,
            italic: false,
            color: palette::INK,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn colored(mut self, color: Accent) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub bullet: bool,
    /// Left margin and hanging indent in EMU.
    pub indent: Option<(i64, i64)>,
    pub centered: bool,
    /// Hundredths of a point.
    pub space_after: u32,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            bullet: false,
            indent: None,
            centered: false,
            space_after: 600,
        }
    }

    fn text_len(&self) -> usize {
        self.runs.iter().map(|run| run.text.chars().count()).sum()
    }

    fn largest_size(&self) -> u32 {
        self.runs.iter().map(|run| run.size).max().unwrap_or(1600)
    }

    /// Estimated height in EMU when set `width` EMU wide.
    fn height(&self, width: i64) -> i64 {
        let points = i64::from(self.largest_size()) / 100;
        let margin = self.indent.map_or(0, |(left, _)| left);
        // Average glyph advance of about half an em.
        let per_line = ((width - margin - 2 * INSET) / (points * EMU_PER_POINT / 2)).max(1);
        let chars = i64::try_from(self.text_len()).unwrap_or(i64::MAX);
        let lines = ((chars + per_line - 1) / per_line).max(1);
        let leading = points * EMU_PER_POINT * 6 / 5;
        lines * leading + i64::from(self.space_after) * EMU_PER_POINT / 100
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rect,
    RoundRect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: &'static str,
    pub geometry: Geometry,
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    pub fill: Option<Accent>,
    pub border: Option<Accent>,
    pub paragraphs: Vec<Paragraph>,
    pub anchor_middle: bool,
}

impl Shape {
    fn text_box(y: i64, cy: i64) -> Self {
        Self {
            name: "TextBox",
            geometry: Geometry::Rect,
            x: MARGIN_X,
            y,
            cx: BODY_WIDTH,
            cy,
            fill: None,
            border: None,
            paragraphs: Vec::new(),
            anchor_middle: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub shapes: Vec<Shape>,
    /// Presenter notes, one paragraph per entry.
    pub notes: Vec<String>,
}

impl Slide {
    /// Every run of text on the slide, in shape order.
    pub fn texts(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .flat_map(|shape| &shape.paragraphs)
            .flat_map(|paragraph| &paragraph.runs)
            .map(|run| run.text.as_str())
            .collect()
    }
}

/// A finished deck, ready to be packaged.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub title: String,
    pub slides: Vec<Slide>,
}

/// Title bar at the top of content slides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub caption: String,
    pub title: String,
    pub accent: Accent,
}

#[derive(Debug)]
struct OpenSlide {
    slide: Slide,
    /// Banner repeated on continuation slides.
    banner: Banner,
    cursor: i64,
    /// Index of a text box that can still take paragraphs.
    open_text: Option<usize>,
}

/// Builds a deck slide by slide.
#[derive(Debug)]
pub struct DeckBuilder {
    title: String,
    slides: Vec<Slide>,
    current: Option<OpenSlide>,
}

impl DeckBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slides: Vec::new(),
            current: None,
        }
    }

    pub fn finish(mut self) -> Deck {
        self.close();
        Deck {
            title: self.title,
            slides: self.slides,
        }
    }

    fn close(&mut self) {
        if let Some(open) = self.current.take() {
            self.slides.push(open.slide);
        }
    }

    /// Title slide. Body items added afterwards flow under the metadata.
    pub fn cover(&mut self, cover: &CoverPage) {
        self.close();
        let mut slide = Slide::default();
        slide.shapes.push(Shape {
            name: "Accent",
            x: 0,
            cx: 182_880,
            fill: Some(cover.accent),
            ..Shape::text_box(0, SLIDE_HEIGHT)
        });

        let mut paragraphs = vec![
            Paragraph::new(vec![
                Run::new(cover.eyebrow.to_uppercase(), 14).bold().colored(cover.accent),
            ]),
            Paragraph::new(vec![Run::new(cover.title.as_str(), 40).bold()]),
        ];
        if let Some(subtitle) = cover.subtitle.as_ref() {
            paragraphs.push(Paragraph::new(vec![
                Run::new(subtitle.as_str(), 20).colored(palette::MUTED),
            ]));
        }
        for (key, value) in &cover.metadata {
            let mut paragraph = Paragraph::new(vec![
                Run::new(format!("{key}: "), 14).bold().colored(palette::MUTED),
                Run::new(value.as_str(), 14),
            ]);
            paragraph.space_after = 200;
            paragraphs.push(paragraph);
        }
        paragraphs.push(Paragraph::new(vec![
            Run::new(format!("Generated on {}", cover.generated_on), 12)
                .italic()
                .colored(palette::MUTED),
        ]));

        let top = 1_005_840;
        let height: i64 = paragraphs.iter().map(|paragraph| paragraph.height(BODY_WIDTH)).sum();
        let mut text = Shape::text_box(top, height);
        text.name = "Title";
        text.paragraphs = paragraphs;
        slide.shapes.push(text);

        self.current = Some(OpenSlide {
            slide,
            banner: Banner {
                caption: cover.eyebrow.clone(),
                title: cover.title.clone(),
                accent: cover.accent,
            },
            cursor: top + height + 182_880,
            open_text: None,
        });
    }

    /// Content slide opened by a banner.
    pub fn content(&mut self, banner: Banner) {
        self.close();
        self.current = Some(banner_slide(banner, false));
    }

    fn open_slide(&mut self) -> &mut OpenSlide {
        let title = &self.title;
        self.current.get_or_insert_with(|| {
            banner_slide(
                Banner {
                    caption: String::new(),
                    title: title.clone(),
                    accent: Accent::SLATE,
                },
                false,
            )
        })
    }

    /// Reserve `height` EMU, moving to a continuation slide when needed.
    /// Returns the top of the reserved area.
    fn reserve(&mut self, height: i64) -> i64 {
        let open = self.open_slide();
        let fresh = open.cursor == BODY_TOP;
        if open.cursor + height > BODY_BOTTOM && !fresh {
            let banner = open.banner.clone();
            self.close();
            self.current = Some(banner_slide(banner, true));
        }
        let open = self.open_slide();
        let top = open.cursor;
        open.cursor += height;
        top
    }

    fn push_text(&mut self, paragraph: Paragraph) {
        let height = paragraph.height(BODY_WIDTH);
        let top = self.reserve(height);
        let open = self.open_slide();
        match open.open_text {
            Some(index) if open.slide.shapes[index].y + open.slide.shapes[index].cy == top => {
                let shape = &mut open.slide.shapes[index];
                shape.cy += height;
                shape.paragraphs.push(paragraph);
            }
            _ => {
                let mut shape = Shape::text_box(top, height);
                shape.paragraphs.push(paragraph);
                open.slide.shapes.push(shape);
                open.open_text = Some(open.slide.shapes.len() - 1);
            }
        }
    }

    fn push_shape(&mut self, mut shape: Shape) {
        let top = self.reserve(shape.cy + 91_440);
        let open = self.open_slide();
        shape.y = top;
        open.slide.shapes.push(shape);
        open.open_text = None;
    }

    pub fn notes(&mut self, lines: impl IntoIterator<Item = String>) {
        let open = self.open_slide();
        open.slide
            .notes
            .extend(lines.into_iter().filter_map(|line| non_blank(&line)));
    }

    pub fn heading(&mut self, text: &str) {
        let mut paragraph = Paragraph::new(vec![Run::new(text, 20).bold()]);
        paragraph.space_after = 400;
        self.push_text(paragraph);
    }

    pub fn paragraph(&mut self, text: &str) {
        for line in text.lines().filter_map(non_blank) {
            self.push_text(Paragraph::new(vec![Run::new(line, 16)]));
        }
    }

    pub fn muted(&mut self, text: &str) {
        let mut paragraph = Paragraph::new(vec![Run::new(text, 14).italic().colored(palette::MUTED)]);
        paragraph.space_after = 200;
        self.push_text(paragraph);
    }

    pub fn bullets(&mut self, items: &[String]) {
        for item in items {
            let mut paragraph = Paragraph::new(vec![Run::new(item.as_str(), 16)]);
            paragraph.bullet = true;
            paragraph.indent = Some((BULLET_INDENT, BULLET_INDENT));
            paragraph.space_after = 300;
            self.push_text(paragraph);
        }
    }

    /// `label` is a global identifier such as `Q4` or an ordinal like `2.`.
    pub fn numbered(&mut self, label: &str, text: &str) {
        let mut paragraph = Paragraph::new(vec![
            Run::new(format!("{label}  "), 16).bold().colored(Accent::BLUE),
            Run::new(text, 16),
        ]);
        paragraph.indent = Some((LABEL_INDENT, LABEL_INDENT));
        paragraph.space_after = 400;
        self.push_text(paragraph);
    }

    /// Verbatim script in a tinted box.
    pub fn dialogue(&mut self, text: &str) {
        let paragraphs: Vec<Paragraph> = text
            .lines()
            .filter_map(non_blank)
            .map(|line| {
                let mut paragraph = Paragraph::new(vec![Run::new(line, 16).italic()]);
                paragraph.space_after = 200;
                paragraph
            })
            .collect();
        if paragraphs.is_empty() {
            return;
        }
        self.boxed(paragraphs, palette::DIALOGUE_FILL, Accent::SLATE, "Script");
    }

    /// Amber tip box with a bold title line.
    pub fn callout(&mut self, title: &str, lines: &[String]) {
        let mut paragraphs = vec![Paragraph::new(vec![
            Run::new(title, 14).bold().colored(palette::CALLOUT_INK),
        ])];
        for line in lines {
            let mut paragraph = Paragraph::new(vec![
                Run::new(line.as_str(), 14).colored(palette::CALLOUT_INK),
            ]);
            paragraph.bullet = true;
            paragraph.indent = Some((BULLET_INDENT, BULLET_INDENT));
            paragraph.space_after = 200;
            paragraphs.push(paragraph);
        }
        self.boxed(paragraphs, palette::CALLOUT_FILL, palette::CALLOUT_BORDER, "Callout");
    }

    fn boxed(&mut self, paragraphs: Vec<Paragraph>, fill: Accent, border: Accent, name: &'static str) {
        let height: i64 = paragraphs
            .iter()
            .map(|paragraph| paragraph.height(BODY_WIDTH))
            .sum::<i64>()
            + 2 * INSET;
        let shape = Shape {
            name,
            geometry: Geometry::RoundRect,
            fill: Some(fill),
            border: Some(border),
            paragraphs,
            ..Shape::text_box(0, height.min(BODY_BOTTOM - BODY_TOP))
        };
        self.push_shape(shape);
    }
}

fn banner_slide(banner: Banner, continued: bool) -> OpenSlide {
    let title = if continued {
        format!("{} (continued)", banner.title)
    } else {
        banner.title.clone()
    };
    let mut caption = Paragraph::new(vec![
        Run::new(banner.caption.to_uppercase(), 12).bold().colored(palette::WHITE),
    ]);
    caption.space_after = 0;
    caption.indent = Some((MARGIN_X, 0));
    let mut heading = Paragraph::new(vec![Run::new(title, 28).bold().colored(palette::WHITE)]);
    heading.space_after = 0;
    heading.indent = Some((MARGIN_X, 0));

    let mut slide = Slide::default();
    slide.shapes.push(Shape {
        name: "Banner",
        x: 0,
        cx: SLIDE_WIDTH,
        fill: Some(banner.accent),
        paragraphs: vec![caption, heading],
        anchor_middle: true,
        ..Shape::text_box(0, BANNER_HEIGHT)
    });

    OpenSlide {
        slide,
        banner,
        cursor: BODY_TOP,
        open_text: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(title: &str) -> Banner {
        Banner {
            caption: "Core".to_string(),
            title: title.to_string(),
            accent: Accent::INDIGO,
        }
    }

    #[test]
    fn consecutive_text_items_share_one_text_box() {
        let mut builder = DeckBuilder::new("Deck");
        builder.content(banner("Questions"));
        builder.numbered("Q1", "First?");
        builder.numbered("Q2", "Second?");
        let deck = builder.finish();

        let slide = &deck.slides[0];
        assert_eq!(slide.shapes.len(), 2);
        assert_eq!(slide.shapes[1].paragraphs.len(), 2);
    }

    #[test]
    fn overflowing_body_opens_continuation_slide_with_same_banner() {
        let mut builder = DeckBuilder::new("Deck");
        builder.content(banner("Questions"));
        for index in 0..40 {
            builder.numbered(&format!("Q{}", index + 1), "How do you usually decide what to cook?");
        }
        let deck = builder.finish();

        assert!(deck.slides.len() > 1);
        assert!(deck.slides[1].texts().contains(&"Questions (continued)"));
        let labels: Vec<&str> = deck
            .slides
            .iter()
            .flat_map(Slide::texts)
            .filter(|text| text.starts_with('Q') && text.ends_with("  "))
            .collect();
        assert_eq!(labels.len(), 40);
        assert_eq!(labels[39], "Q40  ");
    }

    #[test]
    fn boxes_close_the_running_text_box() {
        let mut builder = DeckBuilder::new("Deck");
        builder.content(banner("Intro"));
        builder.paragraph("Before");
        builder.dialogue("Read this aloud.");
        builder.paragraph("After");
        let deck = builder.finish();
        let names: Vec<&str> = deck.slides[0].shapes.iter().map(|shape| shape.name).collect();
        assert_eq!(names, vec!["Banner", "TextBox", "Script", "TextBox"]);
    }

    #[test]
    fn notes_skip_blank_lines() {
        let mut builder = DeckBuilder::new("Deck");
        builder.content(banner("Intro"));
        builder.notes(["Say hello".to_string(), "   ".to_string()]);
        assert_eq!(builder.finish().slides[0].notes, vec!["Say hello".to_string()]);
    }
}
