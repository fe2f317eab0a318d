//! Type-label registry.
//!
//! Every discriminant and descriptive tag resolves to a human-readable label
//! and an accent color here, and nowhere else. The word-processing, PDF and
//! slide-deck renderers as well as the browser preview all go through
//! [`lookup`], so a tag looks the same in every surface.

use std::{borrow::Cow, collections::HashMap};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::domain::{
    AbAssignment, BlockType, Fidelity, Platform, QuestionType, Role, SectionType, SlideType,
    StudyType, TestDesign,
};

/// An RGB accent color stored as six uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Accent(&'static str);

impl Accent {
    pub const INDIGO: Accent = Accent("4F46E5");
    pub const BLUE: Accent = Accent("2563EB");
    pub const SKY: Accent = Accent("0284C7");
    pub const TEAL: Accent = Accent("0D9488");
    pub const GREEN: Accent = Accent("16A34A");
    pub const LIME: Accent = Accent("65A30D");
    pub const AMBER: Accent = Accent("D97706");
    pub const ORANGE: Accent = Accent("EA580C");
    pub const RED: Accent = Accent("DC2626");
    pub const ROSE: Accent = Accent("E11D48");
    pub const PINK: Accent = Accent("DB2777");
    pub const PURPLE: Accent = Accent("9333EA");
    pub const VIOLET: Accent = Accent("7C3AED");
    pub const SLATE: Accent = Accent("475569");
    /// Fallback for tags without a registry entry.
    pub const NEUTRAL: Accent = Accent("64748B");

    /// Hex digits without a leading `#`, as OOXML expects them.
    pub const fn hex(self) -> &'static str {
        self.0
    }

    /// `#RRGGBB` form for CSS.
    pub fn css(self) -> String {
        format!("#{}", self.0)
    }

    /// Components in `0.0..=1.0`, as PDF color operators expect them.
    pub fn rgb(self) -> (f32, f32, f32) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).map_or(0.0, |value| f32::from(value) / 255.0)
        };
        (channel(0..2), channel(2..4), channel(4..6))
    }
}

impl From<Accent> for String {
    fn from(accent: Accent) -> Self {
        accent.css()
    }
}

/// Fixed colors of the shared visual primitives.
pub mod palette {
    use super::Accent;

    pub const INK: Accent = Accent("0F172A");
    pub const MUTED: Accent = Accent("64748B");
    pub const RULE: Accent = Accent("CBD5E1");
    pub const DIALOGUE_FILL: Accent = Accent("F1F5F9");
    pub const CALLOUT_FILL: Accent = Accent("FEF3C7");
    pub const CALLOUT_BORDER: Accent = Accent("F59E0B");
    pub const CALLOUT_INK: Accent = Accent("92400E");
    pub const WHITE: Accent = Accent("FFFFFF");
}

/// Families of tags the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    StudyType,
    TestDesign,
    AbAssignment,
    SectionType,
    QuestionType,
    BlockType,
    Platform,
    Fidelity,
    Role,
    SlideType,
}

impl TagKind {
    pub const ALL: [TagKind; 10] = [
        TagKind::StudyType,
        TagKind::TestDesign,
        TagKind::AbAssignment,
        TagKind::SectionType,
        TagKind::QuestionType,
        TagKind::BlockType,
        TagKind::Platform,
        TagKind::Fidelity,
        TagKind::Role,
        TagKind::SlideType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagKind::StudyType => "study_type",
            TagKind::TestDesign => "test_design",
            TagKind::AbAssignment => "ab_assignment",
            TagKind::SectionType => "section_type",
            TagKind::QuestionType => "question_type",
            TagKind::BlockType => "block_type",
            TagKind::Platform => "platform",
            TagKind::Fidelity => "fidelity",
            TagKind::Role => "role",
            TagKind::SlideType => "slide_type",
        }
    }

    fn entries(self) -> &'static [(&'static str, &'static str, Accent)] {
        match self {
            TagKind::StudyType => STUDY_TYPES,
            TagKind::TestDesign => TEST_DESIGNS,
            TagKind::AbAssignment => AB_ASSIGNMENTS,
            TagKind::SectionType => SECTION_TYPES,
            TagKind::QuestionType => QUESTION_TYPES,
            TagKind::BlockType => BLOCK_TYPES,
            TagKind::Platform => PLATFORMS,
            TagKind::Fidelity => FIDELITIES,
            TagKind::Role => ROLES,
            TagKind::SlideType => SLIDE_TYPES,
        }
    }
}

const STUDY_TYPES: &[(&str, &str, Accent)] = &[
    ("exploratory_interview", "Exploratory Interview", Accent::INDIGO),
    ("moderated_usability", "Moderated Usability Test", Accent::BLUE),
    ("unmoderated_usability", "Unmoderated Usability Test", Accent::TEAL),
    ("survey", "Survey", Accent::PURPLE),
    ("diary_study", "Diary Study", Accent::ORANGE),
];

const TEST_DESIGNS: &[(&str, &str, Accent)] = &[
    ("monadic", "Monadic", Accent::TEAL),
    ("ab", "A/B Comparison", Accent::VIOLET),
    ("benchmark", "Benchmark", Accent::ORANGE),
];

const AB_ASSIGNMENTS: &[(&str, &str, Accent)] = &[
    ("within", "Within-subjects", Accent::VIOLET),
    ("between", "Between-subjects", Accent::PINK),
];

const SECTION_TYPES: &[(&str, &str, Accent)] = &[
    ("introduction", "Introduction", Accent::BLUE),
    ("warm_up", "Warm-up", Accent::SKY),
    ("context", "Context", Accent::TEAL),
    ("core", "Core Discussion", Accent::INDIGO),
    ("tasks", "Tasks", Accent::GREEN),
    ("reflection", "Reflection", Accent::VIOLET),
    ("debrief", "Debrief", Accent::PURPLE),
    ("wrap_up", "Wrap-up", Accent::SLATE),
];

const QUESTION_TYPES: &[(&str, &str, Accent)] = &[
    ("likert", "Likert Scale", Accent::BLUE),
    ("nps", "Net Promoter Score", Accent::GREEN),
    ("csat", "Customer Satisfaction", Accent::AMBER),
    ("single_choice", "Single Choice", Accent::INDIGO),
    ("multiple_choice", "Multiple Choice", Accent::VIOLET),
    ("ranking", "Ranking", Accent::ORANGE),
    ("open_short", "Short Answer", Accent::SLATE),
    ("open_long", "Long Answer", Accent::SLATE),
    ("matrix", "Matrix", Accent::TEAL),
    ("slider", "Slider", Accent::SKY),
    ("demographic", "Demographic", Accent::PINK),
];

const BLOCK_TYPES: &[(&str, &str, Accent)] = &[
    ("screener", "Screener", Accent::RED),
    ("demographics", "Demographics", Accent::PINK),
    ("behavior", "Behavior", Accent::BLUE),
    ("attitudes", "Attitudes", Accent::VIOLET),
    ("satisfaction", "Satisfaction", Accent::AMBER),
    ("feature_feedback", "Feature Feedback", Accent::TEAL),
    ("open_feedback", "Open Feedback", Accent::SLATE),
    ("closing", "Closing", Accent::GREEN),
];

const PLATFORMS: &[(&str, &str, Accent)] = &[
    ("zoom", "Zoom", Accent::BLUE),
    ("teams", "Microsoft Teams", Accent::INDIGO),
    ("google_meet", "Google Meet", Accent::GREEN),
    ("in_person", "In person", Accent::ORANGE),
    ("phone", "Phone", Accent::SLATE),
    ("lookback", "Lookback", Accent::VIOLET),
    ("usertesting", "UserTesting", Accent::SKY),
    ("maze", "Maze", Accent::PURPLE),
    ("userzoom", "UserZoom", Accent::TEAL),
    ("lyssna", "Lyssna", Accent::ROSE),
    ("qualtrics", "Qualtrics", Accent::BLUE),
    ("typeform", "Typeform", Accent::SLATE),
    ("google_forms", "Google Forms", Accent::PURPLE),
    ("surveymonkey", "SurveyMonkey", Accent::GREEN),
    ("dscout", "dscout", Accent::ORANGE),
];

const FIDELITIES: &[(&str, &str, Accent)] = &[
    ("wireframe", "Wireframe", Accent::SLATE),
    ("low", "Low fidelity", Accent::SKY),
    ("mid", "Mid fidelity", Accent::BLUE),
    ("high", "High fidelity", Accent::INDIGO),
    ("live_product", "Live product", Accent::GREEN),
];

const ROLES: &[(&str, &str, Accent)] = &[
    ("moderator", "Moderator", Accent::BLUE),
    ("note_taker", "Note-taker", Accent::TEAL),
    ("observer", "Observer", Accent::SLATE),
    ("stakeholder", "Stakeholder", Accent::PURPLE),
    ("technical_support", "Technical support", Accent::ORANGE),
];

const SLIDE_TYPES: &[(&str, &str, Accent)] = &[
    ("cover", "Cover", Accent::INDIGO),
    ("context", "Context", Accent::BLUE),
    ("objectives", "Objectives", Accent::VIOLET),
    ("methodology", "Methodology", Accent::TEAL),
    ("participants", "Participants", Accent::PINK),
    ("timeline", "Timeline", Accent::ORANGE),
    ("deliverables", "Deliverables", Accent::GREEN),
    ("insights", "Key Insights", Accent::AMBER),
    ("next_steps", "Next Steps", Accent::SLATE),
];

#[derive(Debug, Clone, Copy)]
struct TagEntry {
    label: &'static str,
    color: Accent,
}

static TABLES: Lazy<HashMap<TagKind, HashMap<&'static str, TagEntry>>> = Lazy::new(|| {
    TagKind::ALL
        .into_iter()
        .map(|kind| {
            let table = kind
                .entries()
                .iter()
                .map(|&(tag, label, color)| (tag, TagEntry { label, color }))
                .collect();
            (kind, table)
        })
        .collect()
});

/// Resolved presentation of one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStyle<'a> {
    pub label: Cow<'a, str>,
    pub color: Accent,
}

/// Resolve a tag. Unknown tags resolve to their raw value and the neutral
/// accent instead of failing.
pub fn lookup(kind: TagKind, tag: &str) -> TagStyle<'_> {
    match TABLES.get(&kind).and_then(|table| table.get(tag)) {
        Some(entry) => TagStyle {
            label: Cow::Borrowed(entry.label),
            color: entry.color,
        },
        None => TagStyle {
            label: Cow::Borrowed(tag),
            color: Accent::NEUTRAL,
        },
    }
}

pub fn label(kind: TagKind, tag: &str) -> Cow<'_, str> {
    lookup(kind, tag).label
}

pub fn color(kind: TagKind, tag: &str) -> Accent {
    lookup(kind, tag).color
}

/// Registry access for typed tags. Implementations only name the tag; the
/// label and color always come from [`lookup`].
pub trait RegistryTag {
    const KIND: TagKind;

    fn tag(&self) -> &str;

    fn label(&self) -> Cow<'_, str> {
        label(Self::KIND, self.tag())
    }

    fn color(&self) -> Accent {
        color(Self::KIND, self.tag())
    }
}

macro_rules! registry_tag {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl RegistryTag for $ty {
                const KIND: TagKind = TagKind::$kind;

                fn tag(&self) -> &str {
                    self.as_str()
                }
            }
        )+
    };
}

registry_tag! {
    StudyType => StudyType,
    TestDesign => TestDesign,
    AbAssignment => AbAssignment,
    SectionType => SectionType,
    QuestionType => QuestionType,
    BlockType => BlockType,
    Platform => Platform,
    Fidelity => Fidelity,
    Role => Role,
    SlideType => SlideType,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry {
    pub tag: &'static str,
    pub label: &'static str,
    pub color: Accent,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub neutral: Accent,
    pub kinds: Vec<(TagKind, Vec<SnapshotEntry>)>,
}

/// Every table in declaration order, for surfaces that cannot link this
/// crate (the browser preview reads it as JSON).
pub fn snapshot() -> RegistrySnapshot {
    let kinds = TagKind::ALL
        .into_iter()
        .map(|kind| {
            let entries = kind
                .entries()
                .iter()
                .map(|&(tag, label, color)| SnapshotEntry { tag, label, color })
                .collect();
            (kind, entries)
        })
        .collect();

    RegistrySnapshot {
        neutral: Accent::NEUTRAL,
        kinds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_complete(kind: TagKind, known: &[&str]) {
        for tag in known {
            assert!(
                kind.entries().iter().any(|(name, _, _)| name == tag),
                "{} `{tag}` has no registry entry",
                kind.as_str()
            );
        }
        assert_eq!(kind.entries().len(), known.len(), "{}", kind.as_str());
    }

    #[test]
    fn every_known_tag_is_registered() {
        assert_complete(TagKind::SectionType, SectionType::KNOWN);
        assert_complete(TagKind::QuestionType, QuestionType::KNOWN);
        assert_complete(TagKind::BlockType, BlockType::KNOWN);
        assert_complete(TagKind::Platform, Platform::KNOWN);
        assert_complete(TagKind::Fidelity, Fidelity::KNOWN);
        assert_complete(TagKind::Role, Role::KNOWN);

        let study_types: Vec<_> = StudyType::ALL.iter().map(|kind| kind.as_str()).collect();
        assert_complete(TagKind::StudyType, &study_types);
        let designs: Vec<_> = TestDesign::ALL.iter().map(|kind| kind.as_str()).collect();
        assert_complete(TagKind::TestDesign, &designs);
        let slides: Vec<_> = SlideType::CANONICAL_ORDER
            .iter()
            .map(|kind| kind.as_str())
            .collect();
        assert_complete(TagKind::SlideType, &slides);
    }

    #[test]
    fn typed_and_string_lookups_agree() {
        for tag in QuestionType::KNOWN {
            let typed = QuestionType::from(*tag);
            assert_eq!(typed.label(), label(TagKind::QuestionType, tag));
            assert_eq!(typed.color(), color(TagKind::QuestionType, tag));
        }
        for slide in SlideType::CANONICAL_ORDER {
            assert_eq!(slide.label(), label(TagKind::SlideType, slide.as_str()));
        }
    }

    #[test]
    fn unknown_tags_fall_back_to_raw_value_and_neutral_color() {
        let style = lookup(TagKind::SectionType, "icebreaker");
        assert_eq!(style.label, "icebreaker");
        assert_eq!(style.color, Accent::NEUTRAL);

        let typed = SectionType::from("icebreaker");
        assert_eq!(typed.label(), "icebreaker");
        assert_eq!(typed.color(), Accent::NEUTRAL);
    }

    #[test]
    fn accent_converts_to_pdf_components() {
        let (r, g, b) = palette::WHITE.rgb();
        assert_eq!((r, g, b), (1.0, 1.0, 1.0));
        assert_eq!(Accent::BLUE.css(), "#2563EB");
    }

    #[test]
    fn snapshot_serializes_every_kind() {
        let value = serde_json::to_value(snapshot()).unwrap();
        let kinds = value["kinds"].as_array().unwrap();
        assert_eq!(kinds.len(), TagKind::ALL.len());
        assert_eq!(kinds[0][0], "study_type");
        assert_eq!(kinds[0][1][0]["color"], "#4F46E5");
        assert_eq!(value["neutral"], "#64748B");
    }
}
