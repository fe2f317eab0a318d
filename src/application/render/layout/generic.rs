use crate::{
    application::{
        numbering::NumberingPlan,
        registry::RegistryTag,
        render::types::RenderOptions,
    },
    domain::{BaseProtocol, SectionType, StudyType},
};

use super::{
    PageComposer, PartHeader, TextStyle, non_blank, overview, protocol_cover, questions, section,
    split_sections,
};

/// Layout for any record reduced to the base shape.
pub fn compose<C: PageComposer>(
    composer: &mut C,
    base: &BaseProtocol,
    study_type: StudyType,
    plan: &NumberingPlan,
    options: &RenderOptions,
) {
    composer.cover(&protocol_cover(&base.overview, study_type, Vec::new(), options));
    composer.page_break();
    overview(composer, &base.overview);

    if let Some(schedule) = base.entry_schedule.as_deref().and_then(non_blank) {
        composer.key_values(&[("Entry schedule".to_string(), schedule)]);
    }

    let (leading, debrief) = split_sections(&base.sections);
    for (index, entry) in leading {
        section(composer, entry, plan.section(index));
    }

    let task_accent = SectionType::Tasks.color();
    for (index, task) in base.tasks.iter().enumerate() {
        composer.part_header(&PartHeader::new(
            format!("Task {}", index + 1),
            task.title.as_str(),
            task_accent,
        ));
        for line in task.instructions.lines().filter_map(non_blank) {
            composer.paragraph(&line, TextStyle::Body);
        }
        questions(composer, &task.questions, plan.task(index));
    }

    for (index, entry) in debrief {
        section(composer, entry, plan.section(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::{projection::ProjectToBase, render::layout::recording::Recorder},
        domain::Protocol,
    };
    use serde_json::json;

    #[test]
    fn diary_tasks_sit_between_section_groups() {
        let protocol: Protocol = serde_json::from_value(json!({
            "study_type": "diary_study",
            "title": "Commute diary",
            "objective": "Capture commutes",
            "entry_schedule": "Twice daily",
            "sections": [
                {"section_type": "debrief", "title": "Exit interview", "questions": ["Overall?"]},
                {"section_type": "introduction", "title": "Kickoff", "questions": ["Usual route?"]}
            ],
            "tasks": [{"title": "Morning entry", "instructions": "Log your commute", "questions": ["How long?", "Mood?"]}]
        }))
        .unwrap();
        let base = protocol.to_base();

        let mut recorder = Recorder::default();
        compose(
            &mut recorder,
            &base,
            StudyType::DiaryStudy,
            &NumberingPlan::for_base(&base),
            &RenderOptions::default(),
        );

        assert_eq!(recorder.numbered_labels(), vec!["Q1", "Q2", "Q3", "Q4"]);
        assert!(recorder.contains("numbered:Q4 Overall?"));
        assert!(recorder.contains("kv:Entry schedule=Twice daily"));
    }
}
