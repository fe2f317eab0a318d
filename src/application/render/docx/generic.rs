//! Word-processing rendering of the base shape through a compiled template.

use askama::Template;

use crate::{
    application::{
        numbering::{NumberingPlan, question_label},
        registry::{Accent, RegistryTag, palette},
    },
    domain::{BaseProtocol, Section, SectionType, StudyType},
};

use super::{
    super::{
        layout::{PartHeader, non_blank, protocol_cover, split_sections},
        ooxml::legal_xml_chars,
        types::{RenderError, RenderOptions},
    },
    package::DocxDocument,
};

struct Colors {
    muted: &'static str,
    white: &'static str,
    label: &'static str,
    script_border: &'static str,
    dialogue_fill: &'static str,
    callout_fill: &'static str,
    callout_border: &'static str,
    callout_ink: &'static str,
}

const COLORS: Colors = Colors {
    muted: palette::MUTED.hex(),
    white: palette::WHITE.hex(),
    label: Accent::BLUE.hex(),
    script_border: Accent::SLATE.hex(),
    dialogue_fill: palette::DIALOGUE_FILL.hex(),
    callout_fill: palette::CALLOUT_FILL.hex(),
    callout_border: palette::CALLOUT_BORDER.hex(),
    callout_ink: palette::CALLOUT_INK.hex(),
};

struct QuestionView {
    label: String,
    text: String,
}

struct PartView {
    caption: String,
    title: String,
    accent: &'static str,
    script: Vec<String>,
    instructions: Vec<String>,
    questions: Vec<QuestionView>,
    tips: Vec<String>,
}

#[derive(Template)]
#[template(path = "docx/generic_document.xml", escape = "html")]
struct GenericDocumentTemplate {
    colors: Colors,
    eyebrow: String,
    accent: &'static str,
    title: String,
    subtitle: Option<String>,
    metadata: Vec<(String, String)>,
    generated_on: String,
    objective: String,
    research_questions: Vec<String>,
    participant_profile: Option<String>,
    materials_needed: Vec<String>,
    observer_guide: Vec<String>,
    consent: Option<String>,
    entry_schedule: Option<String>,
    parts: Vec<PartView>,
}

fn clean(text: &str) -> String {
    legal_xml_chars(text).into_owned()
}

fn clean_all(items: &[String]) -> Vec<String> {
    items.iter().map(|item| clean(item)).collect()
}

fn lines(text: Option<&str>) -> Vec<String> {
    text.map(|text| text.lines().filter_map(non_blank).map(|line| clean(&line)).collect())
        .unwrap_or_default()
}

fn question_views(items: &[String], offset: usize) -> Vec<QuestionView> {
    items
        .iter()
        .enumerate()
        .map(|(index, text)| QuestionView {
            label: question_label(offset, index),
            text: clean(text),
        })
        .collect()
}

fn section_view(section: &Section, offset: usize) -> PartView {
    let header = PartHeader::new(
        section.section_type.label(),
        section.title.as_str(),
        section.section_type.color(),
    )
    .with_duration(section.duration_minutes);
    PartView {
        caption: clean(&header.caption()),
        title: clean(&header.title),
        accent: header.accent.hex(),
        script: lines(section.script.as_deref()),
        instructions: Vec::new(),
        questions: question_views(&section.questions, offset),
        tips: clean_all(&section.tips),
    }
}

/// Document for a base-shape record. Part order and numbering match the
/// paged layouts: leading sections, tasks, debrief sections.
pub fn compose(
    base: &BaseProtocol,
    study_type: StudyType,
    plan: &NumberingPlan,
    options: &RenderOptions,
) -> Result<DocxDocument, RenderError> {
    let overview = &base.overview;
    let cover = protocol_cover(overview, study_type, Vec::new(), options);

    let (leading, debrief) = split_sections(&base.sections);
    let mut parts: Vec<PartView> = leading
        .into_iter()
        .map(|(index, section)| section_view(section, plan.section(index)))
        .collect();
    let task_accent = SectionType::Tasks.color();
    parts.extend(base.tasks.iter().enumerate().map(|(index, task)| {
        let header = PartHeader::new(format!("Task {}", index + 1), task.title.as_str(), task_accent);
        PartView {
            caption: header.caption(),
            title: clean(&header.title),
            accent: task_accent.hex(),
            script: Vec::new(),
            instructions: lines(Some(task.instructions.as_str())),
            questions: question_views(&task.questions, plan.task(index)),
            tips: Vec::new(),
        }
    }));
    parts.extend(
        debrief
            .into_iter()
            .map(|(index, section)| section_view(section, plan.section(index))),
    );

    let template = GenericDocumentTemplate {
        colors: COLORS,
        eyebrow: clean(&cover.eyebrow.to_uppercase()),
        accent: cover.accent.hex(),
        title: clean(&cover.title),
        subtitle: cover.subtitle.as_deref().map(clean),
        metadata: cover
            .metadata
            .iter()
            .map(|(key, value)| (clean(key), clean(value)))
            .collect(),
        generated_on: cover.generated_on.clone(),
        objective: clean(&overview.objective),
        research_questions: clean_all(&overview.research_questions),
        participant_profile: overview.participant_profile.as_deref().and_then(non_blank).map(|text| clean(&text)),
        materials_needed: clean_all(&overview.materials_needed),
        observer_guide: clean_all(&overview.observer_guide),
        consent: non_blank(&overview.consent_note).map(|text| clean(&text)),
        entry_schedule: base.entry_schedule.as_deref().and_then(non_blank).map(|text| clean(&text)),
        parts,
    };

    let body = template
        .render()
        .map_err(|error| RenderError::serialization(format!("template: {error}")))?;

    Ok(DocxDocument {
        title: overview.title.clone(),
        body,
        page_size: options.page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Protocol;
    use serde_json::json;

    fn diary() -> BaseProtocol {
        let protocol: Protocol = serde_json::from_value(json!({
            "study_type": "diary_study",
            "title": "Meal <planning> diary",
            "objective": "Understand weekly planning",
            "entry_schedule": "Every evening",
            "sections": [
                {"section_type": "debrief", "title": "Wrap-up", "questions": ["What surprised you?"]},
                {"section_type": "introduction", "title": "Kickoff", "script": "Welcome!\nThanks for joining.",
                 "questions": ["How do you plan meals today?"], "tips": ["Keep it short"]}
            ],
            "tasks": [{"title": "Evening entry", "instructions": "Photograph dinner\nNote who cooked",
                       "questions": ["What did you eat?", "Who cooked?"]}]
        }))
        .unwrap();
        match protocol {
            Protocol::DiaryStudy(base) => base,
            _ => unreachable!(),
        }
    }

    #[test]
    fn template_numbers_parts_in_reading_order() {
        let base = diary();
        let plan = NumberingPlan::for_base(&base);
        let document = compose(&base, StudyType::DiaryStudy, &plan, &RenderOptions::default()).unwrap();
        let body = &document.body;

        let q1 = body.find(">Q1<").unwrap();
        let q3 = body.find(">Q3<").unwrap();
        let q4 = body.find(">Q4<").unwrap();
        assert!(q1 < q3 && q3 < q4);
        assert!(body[q4..].contains("What surprised you?"));
        assert!(body.contains("Every evening"));
        assert!(body.contains("Keep it short"));
    }

    #[test]
    fn template_escapes_record_text() {
        let base = diary();
        let plan = NumberingPlan::for_base(&base);
        let document = compose(&base, StudyType::DiaryStudy, &plan, &RenderOptions::default()).unwrap();
        assert!(
            document.body.contains("Meal &lt;planning&gt; diary")
                || document.body.contains("Meal &#60;planning&#62; diary")
        );
        assert!(!document.body.contains("<planning>"));
    }

    #[test]
    fn empty_planning_blocks_are_left_out() {
        let base = diary();
        let plan = NumberingPlan::for_base(&base);
        let document = compose(&base, StudyType::DiaryStudy, &plan, &RenderOptions::default()).unwrap();
        assert!(!document.body.contains("Materials needed"));
        assert!(!document.body.contains("Observer guide"));
        assert!(!document.body.contains("Consent"));
    }

    #[test]
    fn listed_planning_blocks_render_every_item() {
        let mut base = diary();
        base.overview.research_questions = vec!["Who plans?".into(), "When?".into()];
        base.overview.materials_needed = vec!["Phone".into()];
        let plan = NumberingPlan::for_base(&base);
        let document = compose(&base, StudyType::DiaryStudy, &plan, &RenderOptions::default()).unwrap();
        let body = &document.body;

        let heading = body.find("Research questions").unwrap();
        assert!(body[heading..].contains("Who plans?"));
        assert!(body[heading..].contains("When?"));
        assert!(body.contains("Materials needed"));
        assert!(body.contains("Phone"));
        assert!(body.contains("Photograph dinner"));
    }
}
