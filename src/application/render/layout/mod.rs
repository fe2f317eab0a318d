//! Paged layouts shared by the word-processing and PDF renderers.
//!
//! A layout walks one record shape and drives a [`PageComposer`]; the
//! composer decides what each primitive looks like in its format. Layouts
//! never count questions themselves: every label comes from the
//! [`NumberingPlan`](crate::application::numbering::NumberingPlan) computed
//! before composition starts.

pub mod brief;
pub mod exploratory;
pub mod generic;
pub mod moderated;
pub mod survey;
pub mod unmoderated;

use crate::{
    application::{
        numbering::question_label,
        registry::{Accent, RegistryTag},
    },
    domain::{
        Fidelity, ProtocolOverview, QuestionType, ScaleLabels, Section, StudyType, SurveyQuestion,
    },
};

use super::types::RenderOptions;

/// Title page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverPage {
    /// Short kind label printed above the title, e.g. the study type.
    pub eyebrow: String,
    pub accent: Accent,
    pub title: String,
    pub subtitle: Option<String>,
    pub metadata: Vec<(String, String)>,
    pub generated_on: String,
}

/// Colored banner opening a section, task or slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartHeader {
    pub label: String,
    pub title: String,
    pub duration_minutes: Option<u32>,
    pub accent: Accent,
}

impl PartHeader {
    pub fn new(label: impl Into<String>, title: impl Into<String>, accent: Accent) -> Self {
        Self {
            label: label.into(),
            title: title.into(),
            duration_minutes: None,
            accent,
        }
    }

    pub fn with_duration(mut self, minutes: Option<u32>) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Small line above the title: `LABEL · 10 min`.
    pub fn caption(&self) -> String {
        let label = self.label.to_uppercase();
        match self.duration_minutes {
            Some(minutes) => format!("{label} \u{00B7} {minutes} min"),
            None => label,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Body,
    Muted,
    Emphasis,
}

/// Marker drawn in front of answer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStyle {
    /// Round marker, one answer.
    Single,
    /// Square marker, any number of answers.
    Multiple,
    /// Blank for a rank number.
    Ranking,
}

/// Static picture of an unanswered scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleVisual {
    Likert {
        points: Vec<i32>,
        anchors: Anchors,
    },
    Nps {
        anchors: Anchors,
    },
    Stars {
        count: u32,
        anchors: Anchors,
    },
    Slider {
        min: i32,
        max: i32,
        anchors: Anchors,
    },
    Matrix {
        columns: Vec<String>,
        rows: Vec<String>,
    },
}

/// Text printed under the ends (and optionally the middle) of a scale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchors {
    pub min: Option<String>,
    pub mid: Option<String>,
    pub max: Option<String>,
}

impl Anchors {
    fn from_labels(labels: Option<&ScaleLabels>) -> Self {
        labels
            .map(|labels| Anchors {
                min: non_blank(&labels.min),
                mid: labels.mid.as_deref().and_then(non_blank),
                max: non_blank(&labels.max),
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.mid.is_none() && self.max.is_none()
    }
}

impl ScaleVisual {
    /// Scale for a survey question, or `None` when its type has no scale.
    /// Validation guarantees the bounds a scale type needs.
    pub fn for_question(question: &SurveyQuestion) -> Option<Self> {
        let anchors = Anchors::from_labels(question.scale_labels.as_ref());
        let bounds = question.scale_min.zip(question.scale_max);
        match &question.question_type {
            QuestionType::Likert => bounds.map(|(min, max)| ScaleVisual::Likert {
                points: (min..=max).collect(),
                anchors,
            }),
            QuestionType::Nps => Some(ScaleVisual::Nps { anchors }),
            QuestionType::Csat => bounds.map(|(min, max)| ScaleVisual::Stars {
                count: u32::try_from(max - min + 1).unwrap_or(5),
                anchors,
            }),
            QuestionType::Slider => {
                bounds.map(|(min, max)| ScaleVisual::Slider { min, max, anchors })
            }
            QuestionType::Matrix => Some(ScaleVisual::Matrix {
                columns: question.options.clone().unwrap_or_default(),
                rows: question.matrix_rows.clone().unwrap_or_default(),
            }),
            _ => None,
        }
    }

    pub fn likert(min: i32, max: i32, labels: Option<&ScaleLabels>) -> Self {
        ScaleVisual::Likert {
            points: (min..=max).collect(),
            anchors: Anchors::from_labels(labels),
        }
    }
}

/// Visual vocabulary of a paged format.
pub trait PageComposer {
    fn cover(&mut self, cover: &CoverPage);
    fn part_header(&mut self, header: &PartHeader);
    fn heading(&mut self, text: &str);
    fn paragraph(&mut self, text: &str, style: TextStyle);
    /// Verbatim text read aloud.
    fn dialogue(&mut self, text: &str);
    /// Amber box for moderator guidance and sensitive-topic flags.
    fn callout(&mut self, title: &str, lines: &[String]);
    fn bullets(&mut self, items: &[String]);
    /// One numbered item; `label` is the global identifier such as `Q7`.
    fn numbered(&mut self, label: &str, text: &str);
    fn options(&mut self, options: &[String], style: OptionStyle);
    fn scale(&mut self, scale: &ScaleVisual);
    fn key_values(&mut self, rows: &[(String, String)]);
    fn page_break(&mut self);
}

pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Cover for any protocol shape. `rows` carries shape-specific metadata
/// inserted after the study type.
pub(crate) fn protocol_cover(
    overview: &ProtocolOverview,
    study_type: StudyType,
    rows: Vec<(String, String)>,
    options: &RenderOptions,
) -> CoverPage {
    let mut metadata = vec![("Study type".to_string(), study_type.label().into_owned())];
    metadata.extend(rows);
    if let Some(platform) = overview.platform.as_ref() {
        metadata.push(("Platform".to_string(), platform.label().into_owned()));
    }
    if let Some(count) = overview.participant_count {
        metadata.push(("Participants".to_string(), count.to_string()));
    }
    if let Some(minutes) = overview.session_minutes {
        metadata.push(("Session length".to_string(), format!("{minutes} minutes")));
    }
    if let Some(organization) = options.organization.as_ref() {
        metadata.push(("Prepared by".to_string(), organization.clone()));
    }

    CoverPage {
        eyebrow: study_type.label().into_owned(),
        accent: study_type.color(),
        title: overview.title.clone(),
        subtitle: overview.subtitle.as_deref().and_then(non_blank),
        metadata,
        generated_on: options.generated_on_label(),
    }
}

pub(crate) fn fidelity_row(fidelity: Option<&Fidelity>) -> Option<(String, String)> {
    fidelity.map(|fidelity| ("Fidelity".to_string(), fidelity.label().into_owned()))
}

/// Objective, research questions and the optional planning blocks. Blocks
/// without content are left out entirely.
pub(crate) fn overview<C: PageComposer>(composer: &mut C, overview: &ProtocolOverview) {
    composer.heading("Objective");
    composer.paragraph(&overview.objective, TextStyle::Body);

    if !overview.research_questions.is_empty() {
        composer.heading("Research questions");
        composer.bullets(&overview.research_questions);
    }
    if let Some(profile) = overview.participant_profile.as_deref().and_then(non_blank) {
        composer.heading("Participants");
        composer.paragraph(&profile, TextStyle::Body);
    }
    if !overview.materials_needed.is_empty() {
        composer.heading("Materials needed");
        composer.bullets(&overview.materials_needed);
    }
    if !overview.observer_guide.is_empty() {
        composer.heading("Observer guide");
        composer.bullets(&overview.observer_guide);
    }
    if let Some(consent) = non_blank(&overview.consent_note) {
        composer.heading("Consent");
        composer.dialogue(&consent);
    }
}

/// A session section: banner, script, numbered questions, tips.
pub(crate) fn section<C: PageComposer>(composer: &mut C, section: &Section, offset: usize) {
    composer.part_header(
        &PartHeader::new(
            section.section_type.label(),
            section.title.as_str(),
            section.section_type.color(),
        )
        .with_duration(section.duration_minutes),
    );
    if let Some(script) = section.script.as_deref().and_then(non_blank) {
        composer.dialogue(&script);
    }
    questions(composer, &section.questions, offset);
    if !section.tips.is_empty() {
        composer.callout("Moderator tips", &section.tips);
    }
}

pub(crate) fn questions<C: PageComposer>(composer: &mut C, items: &[String], offset: usize) {
    for (index, item) in items.iter().enumerate() {
        composer.numbered(&question_label(offset, index), item);
    }
}

/// Sections in rendering order: non-debrief first, debrief last, each group
/// in document order. Yields `(index, section)`.
pub(crate) fn split_sections(sections: &[Section]) -> (Vec<(usize, &Section)>, Vec<(usize, &Section)>) {
    sections
        .iter()
        .enumerate()
        .partition(|(_, section)| !section.section_type.is_debrief())
}

/// In-memory composer used by layout tests.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Default)]
    pub struct Recorder {
        pub events: Vec<String>,
    }

    impl Recorder {
        pub fn numbered_labels(&self) -> Vec<String> {
            self.events
                .iter()
                .filter_map(|event| event.strip_prefix("numbered:"))
                .map(|rest| rest.split(' ').next().unwrap_or_default().to_string())
                .collect()
        }

        pub fn headings(&self) -> Vec<String> {
            self.events
                .iter()
                .filter_map(|event| event.strip_prefix("heading:"))
                .map(str::to_string)
                .collect()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.events.iter().any(|event| event.contains(needle))
        }
    }

    impl PageComposer for Recorder {
        fn cover(&mut self, cover: &CoverPage) {
            self.events.push(format!("cover:{}", cover.title));
        }
        fn part_header(&mut self, header: &PartHeader) {
            self.events
                .push(format!("part:{}|{}", header.caption(), header.title));
        }
        fn heading(&mut self, text: &str) {
            self.events.push(format!("heading:{text}"));
        }
        fn paragraph(&mut self, text: &str, _style: TextStyle) {
            self.events.push(format!("paragraph:{text}"));
        }
        fn dialogue(&mut self, text: &str) {
            self.events.push(format!("dialogue:{text}"));
        }
        fn callout(&mut self, title: &str, lines: &[String]) {
            self.events.push(format!("callout:{title}|{}", lines.join("|")));
        }
        fn bullets(&mut self, items: &[String]) {
            self.events.push(format!("bullets:{}", items.join("|")));
        }
        fn numbered(&mut self, label: &str, text: &str) {
            self.events.push(format!("numbered:{label} {text}"));
        }
        fn options(&mut self, options: &[String], style: OptionStyle) {
            self.events
                .push(format!("options:{style:?}:{}", options.join("|")));
        }
        fn scale(&mut self, scale: &ScaleVisual) {
            self.events.push(format!("scale:{scale:?}"));
        }
        fn key_values(&mut self, rows: &[(String, String)]) {
            let rendered: Vec<String> = rows.iter().map(|(k, v)| format!("{k}={v}")).collect();
            self.events.push(format!("kv:{}", rendered.join("|")));
        }
        fn page_break(&mut self) {
            self.events.push("page_break".to_string());
        }
    }
}
